//! Read-visibility and delete-rewrite rules for one entity type.
//!
//! Every qualifying read gets the implicit deletion filter at most once: the
//! interceptor only injects when the policy asks for it, the operation has not
//! opted out, and the caller's filter does not already mention the flag. A
//! second pass over the same operation therefore sees the injected condition
//! and leaves it alone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use strum::IntoEnumIterator;
use tracing::debug;

use super::hooks::HookRegistry;
use super::models::Injection;
use crate::core::config::SoftDeleteConfig;
use crate::core::error::{Result, SoftDeleteError};
use crate::db::{AggregateState, Document, Filter, Pipeline, QueryKind, QueryState, Update};
use crate::utils::timestamp;


/// `$ne: true` rather than `false` so documents without the flag stay visible.
#[must_use]
pub fn active_condition() -> Value {
    json!({"$ne": true})
}


#[derive(Debug, Clone)]
pub struct SoftDeleteInterceptor {
    config: Arc<SoftDeleteConfig>,
}

impl SoftDeleteInterceptor {
    pub fn new(config: Arc<SoftDeleteConfig>) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SoftDeleteConfig {
        &self.config
    }

    fn flag(&self) -> &str {
        self.config.fields().flag()
    }


    pub fn install(&self, hooks: &mut HookRegistry) {
        for kind in QueryKind::iter() {
            let interceptor = self.clone();
            hooks.register_query(
                kind,
                Arc::new(move |query: &mut QueryState| {
                    interceptor.intercept_query(query);
                }),
            );
        }

        let interceptor = self.clone();
        hooks.register_aggregate(Arc::new(move |aggregate: &mut AggregateState| {
            interceptor.intercept_pipeline(aggregate);
        }));
    }

    fn decide(&self, include_deleted: bool, constrained: bool) -> Injection {
        if !self.config.policy().injects_implicit_filter() {
            Injection::PolicyOpen
        } else if include_deleted {
            Injection::IncludeDeleted
        } else if constrained {
            Injection::ExplicitFilter
        } else {
            Injection::Injected
        }
    }

    pub fn intercept_query(&self, query: &mut QueryState) -> Injection {
        let flag = self.flag();
        let decision = self.decide(query.include_deleted(), query.filter.constrains(flag));
        if decision.injected() {
            query.filter.set(flag, active_condition());
        }
        debug!(
            "{} on '{}': {:?} (policy {})",
            query.kind.as_str(),
            flag,
            decision,
            self.config.policy().as_str()
        );
        decision
    }

    /// Only the first stage is inspected for an existing deletion filter.
    pub fn intercept_pipeline(&self, aggregate: &mut AggregateState) -> Injection {
        let flag = self.flag();
        let decision = self.decide(
            aggregate.include_deleted(),
            aggregate.pipeline.first_match_constrains(flag),
        );
        if decision.injected() {
            aggregate
                .pipeline
                .prepend(Pipeline::match_stage(self.active_filter()));
        }
        debug!(
            "aggregate on '{}': {:?} (policy {})",
            flag,
            decision,
            self.config.policy().as_str()
        );
        decision
    }


    #[must_use]
    pub fn active_filter(&self) -> Filter {
        Filter::eq(self.flag(), active_condition())
    }

    #[must_use]
    pub fn deleted_filter(&self) -> Filter {
        Filter::eq(self.flag(), true)
    }

    pub fn mark_active(&self, query: &mut QueryState) {
        query.filter.set(self.flag(), active_condition());
    }

    pub fn mark_deleted(&self, query: &mut QueryState) {
        query.filter.set(self.flag(), true);
    }


    pub fn check_actor(&self, actor: &Value) -> Result<()> {
        if !self.config.actors_enabled() {
            return Err(SoftDeleteError::config(
                "a deletion actor was supplied but deletedBy is disabled",
            ));
        }
        let field_type = self.config.actor_type().field_type();
        if !field_type.accepts(actor) {
            return Err(SoftDeleteError::validation(format!(
                "deletion actor must be {}, got {}",
                field_type.type_name(),
                actor
            )));
        }
        Ok(())
    }

    /// Field assignments that mark a record deleted at `now`.
    pub fn delete_fields(
        &self,
        actor: Option<&Value>,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, Value)>> {
        let fields = self.config.fields();
        let mut set = vec![(fields.flag().to_string(), Value::Bool(true))];
        if let Some(key) = fields.timestamp() {
            set.push((key.to_string(), timestamp(now)));
        }
        if let Some(actor) = actor {
            self.check_actor(actor)?;
            if let Some(key) = fields.actor() {
                set.push((key.to_string(), actor.clone()));
            }
        }
        Ok(set)
    }

    #[must_use]
    pub fn restore_fields(&self) -> Vec<(String, Value)> {
        let fields = self.config.fields();
        let mut set = vec![(fields.flag().to_string(), Value::Bool(false))];
        for key in [fields.timestamp(), fields.actor()].into_iter().flatten() {
            set.push((key.to_string(), Value::Null));
        }
        set
    }

    pub fn delete_update(&self, actor: Option<&Value>, now: DateTime<Utc>) -> Result<Update> {
        Ok(self
            .delete_fields(actor, now)?
            .into_iter()
            .fold(Update::new(), |update, (key, value)| update.set(key, value)))
    }

    #[must_use]
    pub fn restore_update(&self) -> Update {
        self.restore_fields()
            .into_iter()
            .fold(Update::new(), |update, (key, value)| update.set(key, value))
    }

    #[must_use]
    pub fn restore_filter(&self, filter: Filter) -> Filter {
        filter.and(self.deleted_filter())
    }

    pub fn apply_fields(doc: &mut Document, fields: Vec<(String, Value)>) {
        doc.extend(fields);
    }
}
