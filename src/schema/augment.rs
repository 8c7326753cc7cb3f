

use tracing::debug;

use super::types::{FieldDef, FieldType, Schema};
use crate::core::config::SoftDeleteConfig;
use crate::core::error::{Result, SoftDeleteError};
use crate::core::fields::FieldRole;


/// Declares the deletion fields enabled by `config` on `schema`.
///
/// Fails without touching the schema if any deletion field name is already
/// declared.
pub fn augment(schema: &mut Schema, config: &SoftDeleteConfig) -> Result<()> {
    let mut defs = Vec::new();
    for (role, key) in config.fields().enabled() {
        if schema.contains(key) {
            let role: &'static str = role.into();
            return Err(SoftDeleteError::FieldCollision(format!(
                "{} field '{}' is already declared on {}",
                role,
                key,
                schema.collection()
            )));
        }
        defs.push(deletion_field(role, key, config));
    }

    for def in defs {
        debug!(
            "Declaring {} ({}) on {}",
            def.name,
            def.field_type.type_name(),
            schema.collection()
        );
        schema.add_field(def)?;
    }
    Ok(())
}

fn deletion_field(role: FieldRole, key: &str, config: &SoftDeleteConfig) -> FieldDef {
    match role {
        FieldRole::DeletionFlag => FieldDef::new(key, FieldType::Boolean)
            .with_default(false)
            .indexed(),
        FieldRole::DeletionTimestamp => FieldDef::new(key, FieldType::Timestamp),
        FieldRole::DeletionActor => FieldDef::new(key, config.actor_type().field_type()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SoftDeleteOptions;
    use crate::core::policy::ActorType;
    use serde_json::Value;

    #[test]
    fn test_default_augmentation() {
        let config = SoftDeleteOptions::new().resolve().unwrap();
        let mut schema = Schema::new("posts");
        augment(&mut schema, &config).unwrap();

        let flag = schema.get("deleted").unwrap();
        assert_eq!(flag.field_type, FieldType::Boolean);
        assert_eq!(flag.default, Value::Bool(false));
        assert!(flag.indexed);

        let at = schema.get("deletedAt").unwrap();
        assert_eq!(at.field_type, FieldType::Timestamp);
        assert!(at.nullable);
        assert_eq!(at.default, Value::Null);

        assert!(!schema.contains("deletedBy"));
        assert_eq!(schema.indexes(), vec!["deleted"]);
    }

    #[test]
    fn test_actor_field_typed_per_option() {
        let config = SoftDeleteOptions::new()
            .with_deleted_at(false)
            .with_deleted_by(true)
            .with_deleted_by_type(ActorType::String)
            .resolve()
            .unwrap();
        let mut schema = Schema::new("posts");
        augment(&mut schema, &config).unwrap();

        assert!(!schema.contains("deletedAt"));
        assert_eq!(schema.get("deletedBy").unwrap().field_type, FieldType::String);
    }

    #[test]
    fn test_collision_rejected_without_partial_changes() {
        let config = SoftDeleteOptions::new().resolve().unwrap();
        let mut schema = Schema::new("posts")
            .field(FieldDef::new("deletedAt", FieldType::String))
            .unwrap();

        let err = augment(&mut schema, &config).unwrap_err();
        assert!(matches!(err, SoftDeleteError::FieldCollision(_)));
        assert!(!schema.contains("deleted"));
        assert_eq!(schema.fields().len(), 1);
    }
}
