

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::StoreError;
use super::filter::{Document, Filter};


pub const MATCH_STAGE: &str = "$match";


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline(Vec<Document>);

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        let Value::Array(stages) = value else {
            return Err(StoreError::Query("pipeline must be an array of stages".to_string()));
        };
        stages
            .into_iter()
            .map(|stage| match stage {
                Value::Object(map) if map.len() == 1 => Ok(map),
                other => Err(StoreError::Query(format!(
                    "pipeline stage must be an object with exactly one operator, got {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    #[must_use]
    pub fn match_stage(filter: Filter) -> Document {
        let mut stage = Document::new();
        stage.insert(MATCH_STAGE.to_string(), Value::Object(filter.into_document()));
        stage
    }

    #[must_use]
    pub fn with_stage(mut self, stage: Document) -> Self {
        self.push(stage);
        self
    }

    pub fn push(&mut self, stage: Document) {
        self.0.push(stage);
    }

    pub fn prepend(&mut self, stage: Document) {
        self.0.insert(0, stage);
    }

    #[must_use]
    pub fn first(&self) -> Option<&Document> {
        self.0.first()
    }


    #[must_use]
    pub fn first_match_constrains(&self, field: &str) -> bool {
        self.first()
            .and_then(|stage| stage.get(MATCH_STAGE))
            .and_then(Value::as_object)
            .is_some_and(|filter| Filter::from(filter.clone()).constrains(field))
    }

    #[must_use]
    pub fn stages(&self) -> &[Document] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_match_constrains() {
        let pipeline = Pipeline::from_value(json!([
            {"$match": {"deleted": true}},
            {"$count": "n"}
        ]))
        .unwrap();
        assert!(pipeline.first_match_constrains("deleted"));
        assert!(!pipeline.first_match_constrains("name"));
    }

    #[test]
    fn test_later_match_is_not_inspected() {
        let pipeline = Pipeline::from_value(json!([
            {"$sort": {"name": 1}},
            {"$match": {"deleted": true}}
        ]))
        .unwrap();
        assert!(!pipeline.first_match_constrains("deleted"));
    }

    #[test]
    fn test_prepend() {
        let mut pipeline = Pipeline::new().with_stage(Pipeline::match_stage(Filter::eq("a", 1)));
        pipeline.prepend(Pipeline::match_stage(Filter::eq("deleted", json!({"$ne": true}))));
        assert_eq!(pipeline.len(), 2);
        assert!(pipeline.first_match_constrains("deleted"));
    }

    #[test]
    fn test_rejects_malformed_stages() {
        assert!(Pipeline::from_value(json!({"$match": {}})).is_err());
        assert!(Pipeline::from_value(json!([{"$match": {}, "$limit": 1}])).is_err());
        assert!(Pipeline::from_value(json!([]))
            .unwrap()
            .is_empty());
    }
}
