use crate::core::error::Result;
use crate::db::{AggregateState, Document, DocumentStore};

use super::Model;


pub struct Aggregate<S: ?Sized> {
    model: Model<S>,
    state: AggregateState,
}

impl<S: DocumentStore + ?Sized> Aggregate<S> {
    pub(crate) fn new(model: Model<S>, state: AggregateState) -> Self {
        Self { model, state }
    }

    #[must_use]
    pub fn stage(mut self, stage: Document) -> Self {
        self.state.pipeline.push(stage);
        self
    }

    #[must_use]
    pub fn with_deleted(mut self) -> Self {
        self.state.set_include_deleted();
        self
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    pub async fn exec(mut self) -> Result<Vec<Document>> {
        self.model.hooks().run_aggregate(&mut self.state);
        Ok(self
            .model
            .store()
            .aggregate(self.model.collection(), &self.state.pipeline)
            .await?)
    }
}
