

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::client::StoreError;


pub type Document = Map<String, Value>;


/// Query filter document, `{field: condition, ...}` with implicit AND.
///
/// Conditions follow the usual document-store operator shapes (`{"$ne": true}`,
/// `{"$in": [...]}`) or a bare value for equality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Document);

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self(Document::new())
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().with(field, value)
    }

    #[must_use]
    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::eq("_id", id)
    }

    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(StoreError::Query(format!(
                "filter must be an object, got {}",
                other
            ))),
        }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, condition: impl Into<Value>) -> Self {
        self.set(field, condition);
        self
    }

    /// Sets the condition for `field`, replacing any previous one.
    pub fn set(&mut self, field: impl Into<String>, condition: impl Into<Value>) {
        self.0.insert(field.into(), condition.into());
    }

    #[must_use]
    pub fn condition(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }


    #[must_use]
    pub fn and(mut self, other: Filter) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        let overlaps = other.0.keys().any(|key| self.0.contains_key(key));
        if overlaps {
            return Self::new().with("$and", json!([Value::Object(self.0), Value::Object(other.0)]));
        }
        self.0.extend(other.0);
        self
    }

    /// True when `field` is constrained by any operator, either at the top level
    /// or inside a top-level `$and` clause.
    #[must_use]
    pub fn constrains(&self, field: &str) -> bool {
        if self.0.contains_key(field) {
            return true;
        }
        match self.0.get("$and") {
            Some(Value::Array(clauses)) => clauses.iter().any(|clause| match clause {
                Value::Object(map) => Filter(map.clone()).constrains(field),
                _ => false,
            }),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_document(&self) -> &Document {
        &self.0
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Document> for Filter {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

impl TryFrom<Value> for Filter {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}


/// Update document limited to `$set` and `$unset`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Update(Document);

impl Update {
    #[must_use]
    pub fn new() -> Self {
        Self(Document::new())
    }

    /// Bare top-level fields are treated as `$set` entries.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        let Value::Object(map) = value else {
            return Err(StoreError::Query("update must be an object".to_string()));
        };

        let mut update = Self::new();
        for (key, value) in map {
            match key.as_str() {
                "$set" | "$unset" => {
                    let Value::Object(fields) = value else {
                        return Err(StoreError::Query(format!("{} expects an object", key)));
                    };
                    let section = update.section_mut(&key);
                    section.extend(fields);
                }
                op if op.starts_with('$') => {
                    return Err(StoreError::Query(format!(
                        "unsupported update operator {}",
                        op
                    )));
                }
                _ => {
                    update.section_mut("$set").insert(key, value);
                }
            }
        }
        Ok(update)
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.section_mut("$set").insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.section_mut("$unset").insert(field.into(), json!(""));
        self
    }

    fn section_mut(&mut self, op: &str) -> &mut Document {
        let entry = self
            .0
            .entry(op.to_string())
            .or_insert_with(|| Value::Object(Document::new()));
        if !entry.is_object() {
            *entry = Value::Object(Document::new());
        }
        match entry {
            Value::Object(map) => map,
            _ => unreachable!("section was just normalised to an object"),
        }
    }

    pub fn set_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0
            .get("$set")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|m| m.iter())
    }

    pub fn unset_fields(&self) -> impl Iterator<Item = &String> {
        self.0
            .get("$unset")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|m| m.keys())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_fields().next().is_none() && self.unset_fields().next().is_none()
    }

    #[must_use]
    pub fn as_document(&self) -> &Document {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constrains_top_level_any_operator() {
        let filter = Filter::eq("deleted", json!({"$exists": false}));
        assert!(filter.constrains("deleted"));
        assert!(!filter.constrains("deletedAt"));
    }

    #[test]
    fn test_constrains_inside_and() {
        let filter = Filter::from_value(json!({
            "$and": [{"name": "a"}, {"deleted": true}]
        }))
        .unwrap();
        assert!(filter.constrains("deleted"));
    }

    #[test]
    fn test_or_clause_is_not_a_constraint() {
        let filter = Filter::from_value(json!({
            "$or": [{"deleted": true}, {"name": "a"}]
        }))
        .unwrap();
        assert!(!filter.constrains("deleted"));
    }

    #[test]
    fn test_and_merges_disjoint_filters() {
        let merged = Filter::eq("name", "a").and(Filter::eq("deleted", true));
        assert_eq!(
            Value::Object(merged.into_document()),
            json!({"name": "a", "deleted": true})
        );
    }

    #[test]
    fn test_and_wraps_overlapping_filters() {
        let merged = Filter::eq("deleted", false).and(Filter::eq("deleted", true));
        assert_eq!(
            Value::Object(merged.into_document()),
            json!({"$and": [{"deleted": false}, {"deleted": true}]})
        );
    }

    #[test]
    fn test_non_object_filter_rejected() {
        assert!(Filter::from_value(json!([1, 2])).is_err());
        assert!(Filter::from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_update_wraps_bare_fields_in_set() {
        let update = Update::from_value(json!({"name": "b", "$unset": {"tmp": ""}})).unwrap();
        let set: Vec<_> = update.set_fields().collect();
        assert_eq!(set, vec![(&"name".to_string(), &json!("b"))]);
        assert_eq!(update.unset_fields().collect::<Vec<_>>(), vec!["tmp"]);
    }

    #[test]
    fn test_update_rejects_unknown_operator() {
        assert!(Update::from_value(json!({"$inc": {"n": 1}})).is_err());
        assert!(Update::new().is_empty());
    }
}
