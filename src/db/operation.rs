

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use super::client::{FindOptions, ReturnDocument};
use super::filter::{Filter, Update};
use super::pipeline::Pipeline;


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum QueryKind {
    Find,
    FindOne,
    FindById,
    Count,
    FindOneAndUpdate,
}

impl QueryKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}


/// One in-flight filter-based operation.
///
/// Built fresh for every call, so the include-deleted flag never outlives
/// or leaks out of the call that set it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub kind: QueryKind,
    pub filter: Filter,
    pub update: Option<Update>,
    pub options: FindOptions,
    pub return_document: ReturnDocument,
    include_deleted: bool,
}

impl QueryState {
    pub fn new(kind: QueryKind, filter: Filter) -> Self {
        Self {
            kind,
            filter,
            update: None,
            options: FindOptions::default(),
            return_document: ReturnDocument::default(),
            include_deleted: false,
        }
    }

    #[must_use]
    pub fn with_update(mut self, update: Update) -> Self {
        self.update = Some(update);
        self
    }

    #[must_use]
    pub fn include_deleted(&self) -> bool {
        self.include_deleted
    }

    pub fn set_include_deleted(&mut self) {
        self.include_deleted = true;
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct AggregateState {
    pub pipeline: Pipeline,
    include_deleted: bool,
}

impl AggregateState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            include_deleted: false,
        }
    }

    #[must_use]
    pub fn include_deleted(&self) -> bool {
        self.include_deleted
    }

    pub fn set_include_deleted(&mut self) {
        self.include_deleted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_fresh_state_excludes_deleted() {
        let mut state = QueryState::new(QueryKind::Find, Filter::new());
        assert!(!state.include_deleted());
        state.set_include_deleted();
        assert!(state.include_deleted());

        let next = QueryState::new(QueryKind::Find, Filter::new());
        assert!(!next.include_deleted());
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = QueryKind::iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["find", "findOne", "findById", "count", "findOneAndUpdate"]
        );
    }
}
