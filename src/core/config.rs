

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{Result, SoftDeleteError};
use super::fields::{
    DEFAULT_DELETED_AT_FIELD, DEFAULT_DELETED_BY_FIELD, DEFAULT_DELETED_FIELD, FieldMap, FieldRole,
};
use super::policy::{ActorType, ArchivePolicy};


pub const ENV_PREFIX: &str = "SOFTDEL";


/// Caller-supplied options. Every field is optional; `resolve` fills the gaps.
///
/// Both snake_case keys and the camelCase option names (`deletedAt`,
/// `activeArchive`, ...) are accepted when deserializing. The `config` loader
/// lowercases keys, so each camelCase name also has a lowercase alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftDeleteOptions {
    #[serde(alias = "deletedAt", alias = "deletedat")]
    pub deleted_at: Option<bool>,

    #[serde(alias = "deletedBy", alias = "deletedby")]
    pub deleted_by: Option<bool>,

    #[serde(alias = "deletedByType", alias = "deletedbytype")]
    pub deleted_by_type: Option<ActorType>,

    #[serde(alias = "activeArchive", alias = "activearchive")]
    pub active_archive: Option<ArchivePolicy>,

    #[serde(alias = "deletedField", alias = "deletedfield")]
    pub deleted_field: Option<String>,

    #[serde(alias = "deletedAtField", alias = "deletedatfield")]
    pub deleted_at_field: Option<String>,

    #[serde(alias = "deletedByField", alias = "deletedbyfield")]
    pub deleted_by_field: Option<String>,
}

impl SoftDeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }


    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("Loading soft delete options from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let options = builder
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize::<Self>()?;
        Ok(options)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ArchivePolicy) -> Self {
        self.active_archive = Some(policy);
        self
    }

    #[must_use]
    pub fn with_deleted_at(mut self, enabled: bool) -> Self {
        self.deleted_at = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_deleted_by(mut self, enabled: bool) -> Self {
        self.deleted_by = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_deleted_by_type(mut self, actor_type: ActorType) -> Self {
        self.deleted_by_type = Some(actor_type);
        self
    }

    #[must_use]
    pub fn with_field_names(
        mut self,
        deleted: impl Into<String>,
        deleted_at: impl Into<String>,
        deleted_by: impl Into<String>,
    ) -> Self {
        self.deleted_field = Some(deleted.into());
        self.deleted_at_field = Some(deleted_at.into());
        self.deleted_by_field = Some(deleted_by.into());
        self
    }


    pub fn resolve(self) -> Result<SoftDeleteConfig> {
        let timestamps = self.deleted_at.unwrap_or(true);
        let actors = self.deleted_by.unwrap_or(false);

        let flag = self
            .deleted_field
            .unwrap_or_else(|| DEFAULT_DELETED_FIELD.to_string());
        check_field_name(FieldRole::DeletionFlag, &flag)?;

        let timestamp = if timestamps {
            let name = self
                .deleted_at_field
                .unwrap_or_else(|| DEFAULT_DELETED_AT_FIELD.to_string());
            check_field_name(FieldRole::DeletionTimestamp, &name)?;
            Some(name)
        } else {
            None
        };

        let actor = if actors {
            let name = self
                .deleted_by_field
                .unwrap_or_else(|| DEFAULT_DELETED_BY_FIELD.to_string());
            check_field_name(FieldRole::DeletionActor, &name)?;
            Some(name)
        } else {
            None
        };

        let fields = FieldMap::new(flag, timestamp, actor);

        let mut seen = HashSet::new();
        for (role, key) in fields.enabled() {
            if !seen.insert(key) {
                let role: &'static str = role.into();
                return Err(SoftDeleteError::config(format!(
                    "field name '{}' for {} is already used by another deletion field",
                    key, role
                )));
            }
        }

        Ok(SoftDeleteConfig {
            policy: self.active_archive.unwrap_or_default(),
            actor_type: self.deleted_by_type.unwrap_or_default(),
            fields,
        })
    }
}

fn check_field_name(role: FieldRole, name: &str) -> Result<()> {
    let role: &'static str = role.into();
    if name.trim().is_empty() {
        return Err(SoftDeleteError::config(format!(
            "field name for {} must not be empty",
            role
        )));
    }
    if name.starts_with('$') {
        return Err(SoftDeleteError::config(format!(
            "field name '{}' for {} must not start with '$'",
            name, role
        )));
    }
    if name == "_id" {
        return Err(SoftDeleteError::config(format!(
            "field name for {} must not be '_id'",
            role
        )));
    }
    Ok(())
}


/// Fully resolved, immutable configuration for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftDeleteConfig {
    policy: ArchivePolicy,
    actor_type: ActorType,
    fields: FieldMap,
}

impl SoftDeleteConfig {
    #[must_use]
    pub fn policy(&self) -> ArchivePolicy {
        self.policy
    }

    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    #[must_use]
    pub fn timestamps_enabled(&self) -> bool {
        self.fields.timestamp().is_some()
    }

    #[must_use]
    pub fn actors_enabled(&self) -> bool {
        self.fields.actor().is_some()
    }

    #[must_use]
    pub fn actor_type(&self) -> ActorType {
        self.actor_type
    }
}

impl Default for SoftDeleteConfig {
    fn default() -> Self {
        Self {
            policy: ArchivePolicy::Default,
            actor_type: ActorType::ObjectId,
            fields: FieldMap::default(),
        }
    }
}
