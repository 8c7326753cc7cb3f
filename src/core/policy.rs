

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::schema::FieldType;


/// Read-visibility policy for deleted records.
///
/// Only `Default` hides deleted records implicitly. `Scope` and `All` leave
/// reads open and rely on the `active()` / `deleted()` modifiers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ArchivePolicy {
    #[default]
    #[serde(alias = "default")]
    Default,
    #[serde(alias = "scope")]
    Scope,
    #[serde(alias = "all")]
    All,
}

impl ArchivePolicy {
    #[must_use]
    pub fn injects_implicit_filter(&self) -> bool {
        matches!(self, Self::Default)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ActorType {
    #[default]
    #[serde(alias = "objectid", alias = "object_id")]
    ObjectId,
    #[serde(alias = "string")]
    String,
}

impl ActorType {
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::ObjectId => FieldType::ObjectId,
            Self::String => FieldType::String,
        }
    }
}
