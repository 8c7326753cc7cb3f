

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::db::{AggregateState, QueryKind, QueryState};


pub type QueryHook = Arc<dyn Fn(&mut QueryState) + Send + Sync>;

pub type AggregateHook = Arc<dyn Fn(&mut AggregateState) + Send + Sync>;


/// Pre-execution middleware, registered per operation kind when a model is
/// set up and run by the model right before it hands an operation to the store.
#[derive(Clone, Default)]
pub struct HookRegistry {
    query: HashMap<QueryKind, Vec<QueryHook>>,
    aggregate: Vec<AggregateHook>,
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_query(&mut self, kind: QueryKind, hook: QueryHook) {
        self.query.entry(kind).or_default().push(hook);
        trace!("Registered pre hook for {}", kind.as_str());
    }

    pub fn register_aggregate(&mut self, hook: AggregateHook) {
        self.aggregate.push(hook);
        trace!("Registered pre hook for aggregate");
    }


    pub fn run_query(&self, query: &mut QueryState) -> usize {
        let Some(hooks) = self.query.get(&query.kind) else {
            return 0;
        };
        for hook in hooks {
            hook(query);
        }
        hooks.len()
    }

    pub fn run_aggregate(&self, aggregate: &mut AggregateState) -> usize {
        for hook in &self.aggregate {
            hook(aggregate);
        }
        self.aggregate.len()
    }

    #[must_use]
    pub fn query_hook_count(&self, kind: QueryKind) -> usize {
        self.query.get(&kind).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn aggregate_hook_count(&self) -> usize {
        self.aggregate.len()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&'static str, usize> = self
            .query
            .iter()
            .map(|(kind, hooks)| (kind.as_str(), hooks.len()))
            .collect();
        f.debug_struct("HookRegistry")
            .field("query", &counts)
            .field("aggregate", &self.aggregate.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Filter, Pipeline};
    use serde_json::json;

    #[test]
    fn test_hooks_run_in_registration_order_for_their_kind() {
        let mut hooks = HookRegistry::new();
        hooks.register_query(
            QueryKind::Find,
            Arc::new(|q: &mut QueryState| q.filter.set("step", 1)),
        );
        hooks.register_query(
            QueryKind::Find,
            Arc::new(|q: &mut QueryState| {
                let seen = q.filter.condition("step").cloned();
                q.filter.set("seen", seen.unwrap_or_default());
            }),
        );

        let mut find = QueryState::new(QueryKind::Find, Filter::new());
        assert_eq!(hooks.run_query(&mut find), 2);
        assert_eq!(find.filter.condition("seen"), Some(&json!(1)));

        let mut count = QueryState::new(QueryKind::Count, Filter::new());
        assert_eq!(hooks.run_query(&mut count), 0);
        assert!(count.filter.is_empty());
    }

    #[test]
    fn test_aggregate_hooks() {
        let mut hooks = HookRegistry::new();
        hooks.register_aggregate(Arc::new(|a: &mut AggregateState| {
            a.pipeline.push(Pipeline::match_stage(Filter::eq("x", 1)));
        }));

        let mut aggregate = AggregateState::new(Pipeline::new());
        assert_eq!(hooks.run_aggregate(&mut aggregate), 1);
        assert_eq!(aggregate.pipeline.len(), 1);
        assert_eq!(hooks.aggregate_hook_count(), 1);
    }
}
