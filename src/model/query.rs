use std::marker::PhantomData;

use crate::core::error::Result;
use crate::db::{DocumentStore, Filter, QueryKind, QueryState, ReturnDocument, SortOrder};

use super::Model;
use super::entity::Entity;


pub struct Many;

pub struct One;

pub struct Count;


/// A read operation under construction. Modifiers only touch this query's own
/// state; hooks run once, inside `exec`.
pub struct Query<S: ?Sized, T> {
    model: Model<S>,
    state: QueryState,
    _output: PhantomData<fn() -> T>,
}

impl<S: DocumentStore + ?Sized, T> Query<S, T> {
    pub(crate) fn new(model: Model<S>, state: QueryState) -> Self {
        Self {
            model,
            state,
            _output: PhantomData,
        }
    }

    /// Only records whose flag is not `true` (absent counts as active).
    #[must_use]
    pub fn active(mut self) -> Self {
        self.model.interceptor().mark_active(&mut self.state);
        self
    }

    #[must_use]
    pub fn deleted(mut self) -> Self {
        self.model.interceptor().mark_deleted(&mut self.state);
        self
    }

    /// Opts this query out of the implicit deletion filter.
    #[must_use]
    pub fn with_deleted(mut self) -> Self {
        self.state.set_include_deleted();
        self
    }

    #[must_use]
    pub fn and(mut self, filter: Filter) -> Self {
        self.state.filter = std::mem::take(&mut self.state.filter).and(filter);
        self
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    fn prepare(mut self) -> (Model<S>, QueryState) {
        self.model.hooks().run_query(&mut self.state);
        (self.model, self.state)
    }
}

impl<S: DocumentStore + ?Sized> Query<S, Many> {
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.state.options.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: usize) -> Self {
        self.state.options.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.state.options.sort = Some((field.into(), order));
        self
    }

    pub async fn exec(self) -> Result<Vec<Entity<S>>> {
        let (model, state) = self.prepare();
        let docs = model
            .store()
            .find(model.collection(), &state.filter, &state.options)
            .await?;
        Ok(docs
            .into_iter()
            .map(|doc| Entity::new(model.clone(), doc))
            .collect())
    }
}

impl<S: DocumentStore + ?Sized> Query<S, One> {
    /// For find-and-update: return the document after the update is applied.
    #[must_use]
    pub fn return_updated(mut self) -> Self {
        self.state.return_document = ReturnDocument::After;
        self
    }

    pub async fn exec(self) -> Result<Option<Entity<S>>> {
        let (model, state) = self.prepare();
        let found = match state.kind {
            QueryKind::FindOneAndUpdate => {
                let update = state.update.unwrap_or_default();
                model
                    .store()
                    .find_one_and_update(
                        model.collection(),
                        &state.filter,
                        &update,
                        state.return_document,
                    )
                    .await?
            }
            _ => {
                model
                    .store()
                    .find_one(model.collection(), &state.filter, &state.options)
                    .await?
            }
        };
        Ok(found.map(|doc| Entity::new(model, doc)))
    }
}

impl<S: DocumentStore + ?Sized> Query<S, Count> {
    pub async fn exec(self) -> Result<u64> {
        let (model, state) = self.prepare();
        Ok(model.store().count(model.collection(), &state.filter).await?)
    }
}
