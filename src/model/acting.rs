use serde_json::Value;

use crate::core::error::Result;
use crate::db::{Document, DocumentStore, Filter, UpdateResult};
use crate::deletion::DeleteKind;
use crate::deletion::soft::{soft_delete, soft_delete_returning};

use super::Model;


/// Delete-class operations that also set the deletion-actor field.
pub struct Acting<'a, S: ?Sized> {
    model: &'a Model<S>,
    actor: Value,
}

impl<'a, S: DocumentStore + ?Sized> Acting<'a, S> {
    pub(crate) fn new(model: &'a Model<S>, actor: Value) -> Self {
        Self { model, actor }
    }

    pub fn actor(&self) -> &Value {
        &self.actor
    }

    pub async fn delete_one(&self, filter: Filter) -> Result<UpdateResult> {
        soft_delete(self.model, DeleteKind::DeleteOne, filter, Some(&self.actor)).await
    }

    pub async fn delete_many(&self, filter: Filter) -> Result<UpdateResult> {
        soft_delete(self.model, DeleteKind::DeleteMany, filter, Some(&self.actor)).await
    }

    pub async fn find_one_and_delete(&self, filter: Filter) -> Result<Option<Document>> {
        soft_delete_returning(
            self.model,
            DeleteKind::FindOneAndDelete,
            filter,
            Some(&self.actor),
        )
        .await
    }

    pub async fn find_by_id_and_delete(&self, id: impl Into<Value>) -> Result<Option<Document>> {
        soft_delete_returning(
            self.model,
            DeleteKind::FindByIdAndDelete,
            Filter::by_id(id),
            Some(&self.actor),
        )
        .await
    }
}
