

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};


pub const DEFAULT_DELETED_FIELD: &str = "deleted";

pub const DEFAULT_DELETED_AT_FIELD: &str = "deletedAt";

pub const DEFAULT_DELETED_BY_FIELD: &str = "deletedBy";


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FieldRole {
    DeletionFlag,
    DeletionTimestamp,
    DeletionActor,
}


/// Storage keys for each deletion role, resolved once per entity type.
///
/// The flag key is always present; timestamp and actor keys exist only when
/// the matching feature is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    flag: String,
    timestamp: Option<String>,
    actor: Option<String>,
}

impl FieldMap {
    pub(crate) fn new(flag: String, timestamp: Option<String>, actor: Option<String>) -> Self {
        Self {
            flag,
            timestamp,
            actor,
        }
    }

    #[must_use]
    pub fn flag(&self) -> &str {
        &self.flag
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    #[must_use]
    pub fn key(&self, role: FieldRole) -> Option<&str> {
        match role {
            FieldRole::DeletionFlag => Some(self.flag()),
            FieldRole::DeletionTimestamp => self.timestamp(),
            FieldRole::DeletionActor => self.actor(),
        }
    }


    pub fn enabled(&self) -> impl Iterator<Item = (FieldRole, &str)> + '_ {
        FieldRole::iter().filter_map(move |role| self.key(role).map(|key| (role, key)))
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::new(
            DEFAULT_DELETED_FIELD.to_string(),
            Some(DEFAULT_DELETED_AT_FIELD.to_string()),
            None,
        )
    }
}
