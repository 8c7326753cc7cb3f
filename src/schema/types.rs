//! Entity shape: named, typed fields with defaults.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{Result, SoftDeleteError};
use crate::db::{Document, ObjectId};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Boolean,
    /// RFC 3339 string
    Timestamp,
    /// 24 hex character reference
    ObjectId,
    String,
    Number,
    Any,
}

impl FieldType {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::ObjectId => "objectid",
            Self::String => "string",
            Self::Number => "number",
            Self::Any => "any",
        }
    }

    /// Whether a non-null value has this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::Timestamp => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            Self::ObjectId => value.as_str().is_some_and(ObjectId::is_valid),
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Any => true,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub default: Value,
    pub nullable: bool,
    pub indexed: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: Value::Null,
            nullable: true,
            indexed: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    collection: String,
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            fields: Vec::new(),
        }
    }

    /// Builder form of [`Schema::add_field`] for declaring application fields.
    pub fn field(mut self, def: FieldDef) -> Result<Self> {
        self.add_field(def)?;
        Ok(self)
    }

    pub fn add_field(&mut self, def: FieldDef) -> Result<()> {
        if def.name == "_id" || self.contains(&def.name) {
            return Err(SoftDeleteError::FieldCollision(format!(
                "field '{}' is already declared on {}",
                def.name, self.collection
            )));
        }
        self.fields.push(def);
        Ok(())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn indexes(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.indexed)
            .map(|f| f.name.as_str())
            .collect()
    }


    pub fn apply_defaults(&self, doc: &mut Document) {
        for field in &self.fields {
            if !doc.contains_key(&field.name) {
                doc.insert(field.name.clone(), field.default.clone());
            }
        }
    }

    /// Checks declared fields present in `doc`; undeclared keys pass through.
    pub fn validate(&self, doc: &Document) -> Result<()> {
        for field in &self.fields {
            match doc.get(&field.name) {
                None | Some(Value::Null) if field.nullable => {}
                None | Some(Value::Null) => {
                    return Err(SoftDeleteError::validation(format!(
                        "field '{}' on {} must not be null",
                        field.name, self.collection
                    )));
                }
                Some(value) if !field.field_type.accepts(value) => {
                    return Err(SoftDeleteError::validation(format!(
                        "field '{}' on {} expects {}, got {}",
                        field.name,
                        self.collection,
                        field.field_type.type_name(),
                        value
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_field_types() {
        assert!(FieldType::Timestamp.accepts(&json!("2024-05-01T10:00:00Z")));
        assert!(!FieldType::Timestamp.accepts(&json!("yesterday")));
        assert!(FieldType::ObjectId.accepts(&json!("507f1f77bcf86cd799439011")));
        assert!(!FieldType::ObjectId.accepts(&json!("alice")));
        assert!(FieldType::String.accepts(&json!("alice")));
        assert!(!FieldType::Boolean.accepts(&json!("true")));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let schema = Schema::new("posts")
            .field(FieldDef::new("title", FieldType::String))
            .unwrap();
        let err = schema
            .field(FieldDef::new("title", FieldType::Number))
            .unwrap_err();
        assert!(matches!(err, SoftDeleteError::FieldCollision(_)));
    }

    #[test]
    fn test_defaults_fill_missing_fields_only() {
        let schema = Schema::new("posts")
            .field(FieldDef::new("views", FieldType::Number).with_default(0))
            .unwrap()
            .field(FieldDef::new("title", FieldType::String))
            .unwrap();

        let mut d = doc(json!({"views": 7}));
        schema.apply_defaults(&mut d);
        assert_eq!(d, doc(json!({"views": 7, "title": null})));
    }

    #[test]
    fn test_validate() {
        let schema = Schema::new("posts")
            .field(FieldDef::new("title", FieldType::String).required())
            .unwrap();
        assert!(schema.validate(&doc(json!({"title": "a", "other": 1}))).is_ok());
        assert!(schema.validate(&doc(json!({"title": null}))).is_err());
        assert!(schema.validate(&doc(json!({"title": 3}))).is_err());
    }
}
