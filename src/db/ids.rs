

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

lazy_static! {
    static ref OBJECT_ID_RE: Regex = Regex::new(r"^[0-9a-fA-F]{24}$").unwrap();
}


/// 24 hex character document key, the store's native reference type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    #[must_use]
    pub fn new() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..24].to_string())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::is_valid(s).then(|| Self(s.to_lowercase()))
    }

    #[must_use]
    pub fn is_valid(s: &str) -> bool {
        OBJECT_ID_RE.is_match(s)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::String(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_valid_and_unique() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert!(ObjectId::is_valid(a.as_str()));
        assert_eq!(a.as_str().len(), 24);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse() {
        assert!(ObjectId::parse("507f1f77bcf86cd799439011").is_some());
        assert!(ObjectId::parse("507F1F77BCF86CD799439011").is_some());
        assert!(ObjectId::parse("not-an-id").is_none());
        assert!(ObjectId::parse("507f1f77bcf86cd79943901").is_none());
    }
}
