//! Entity-type handle with the soft-delete overlay applied.
//!
//! [`Model::apply`] resolves the options, declares the deletion fields on the
//! schema and installs the read hooks. Everything afterwards goes through the
//! model: reads are built as [`Query`] / [`Aggregate`] values that run the
//! hooks right before execution, and the delete-class operations keep their
//! names but only ever update the deletion fields.

mod acting;
mod aggregate;
mod entity;
mod query;


use std::sync::Arc;

use serde_json::Value;
use tracing::info;

pub use acting::Acting;
pub use aggregate::Aggregate;
pub use entity::Entity;
pub use query::{Count, Many, One, Query};

use crate::core::config::{SoftDeleteConfig, SoftDeleteOptions};
use crate::core::error::{Result, SoftDeleteError};
use crate::db::{
    AggregateState, Document, DocumentStore, Filter, ObjectId, Pipeline, QueryKind, QueryState,
    Update, UpdateResult,
};
use crate::deletion::restore::restore_matching;
use crate::deletion::soft::{soft_delete, soft_delete_returning};
use crate::deletion::{DeleteKind, HookRegistry, SoftDeleteInterceptor};
use crate::schema::{Schema, augment};


pub struct Model<S: ?Sized> {
    inner: Arc<ModelInner<S>>,
}

struct ModelInner<S: ?Sized> {
    schema: Schema,
    config: Arc<SoftDeleteConfig>,
    interceptor: SoftDeleteInterceptor,
    hooks: HookRegistry,
    store: Arc<S>,
}

impl<S: ?Sized> Clone for Model<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentStore + ?Sized> Model<S> {
    pub fn apply(store: Arc<S>, mut schema: Schema, options: SoftDeleteOptions) -> Result<Self> {
        let config = Arc::new(options.resolve()?);
        augment(&mut schema, &config)?;

        let interceptor = SoftDeleteInterceptor::new(Arc::clone(&config));
        let mut hooks = HookRegistry::new();
        interceptor.install(&mut hooks);

        info!(
            "Soft delete applied to {} (policy: {}, flag: {})",
            schema.collection(),
            config.policy().as_str(),
            config.fields().flag()
        );

        Ok(Self {
            inner: Arc::new(ModelInner {
                schema,
                config,
                interceptor,
                hooks,
                store,
            }),
        })
    }

    pub fn collection(&self) -> &str {
        self.inner.schema.collection()
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn config(&self) -> &SoftDeleteConfig {
        &self.inner.config
    }

    pub(crate) fn store(&self) -> &S {
        &self.inner.store
    }

    pub(crate) fn interceptor(&self) -> &SoftDeleteInterceptor {
        &self.inner.interceptor
    }

    pub(crate) fn hooks(&self) -> &HookRegistry {
        &self.inner.hooks
    }


    /// Inserts a new entity. Missing `_id` and schema defaults are filled in,
    /// so the deletion flag always starts out `false`.
    pub async fn create(&self, value: Value) -> Result<Entity<S>> {
        let Value::Object(mut doc) = value else {
            return Err(SoftDeleteError::validation(format!(
                "{} documents must be objects",
                self.collection()
            )));
        };
        doc.entry("_id".to_string())
            .or_insert_with(|| ObjectId::new().into());
        self.inner.schema.apply_defaults(&mut doc);
        self.inner.schema.validate(&doc)?;

        self.store()
            .insert_one(self.collection(), doc.clone())
            .await?;
        Ok(Entity::new(self.clone(), doc))
    }

    pub fn find(&self, filter: Filter) -> Query<S, Many> {
        Query::new(self.clone(), QueryState::new(QueryKind::Find, filter))
    }

    pub fn find_one(&self, filter: Filter) -> Query<S, One> {
        Query::new(self.clone(), QueryState::new(QueryKind::FindOne, filter))
    }

    pub fn find_by_id(&self, id: impl Into<Value>) -> Query<S, One> {
        Query::new(
            self.clone(),
            QueryState::new(QueryKind::FindById, Filter::by_id(id)),
        )
    }

    pub fn count_documents(&self, filter: Filter) -> Query<S, Count> {
        Query::new(self.clone(), QueryState::new(QueryKind::Count, filter))
    }

    pub fn find_one_and_update(&self, filter: Filter, update: Update) -> Query<S, One> {
        Query::new(
            self.clone(),
            QueryState::new(QueryKind::FindOneAndUpdate, filter).with_update(update),
        )
    }

    pub fn aggregate(&self, pipeline: Pipeline) -> Aggregate<S> {
        Aggregate::new(self.clone(), AggregateState::new(pipeline))
    }


    pub async fn delete_one(&self, filter: Filter) -> Result<UpdateResult> {
        soft_delete(self, DeleteKind::DeleteOne, filter, None).await
    }

    pub async fn delete_many(&self, filter: Filter) -> Result<UpdateResult> {
        soft_delete(self, DeleteKind::DeleteMany, filter, None).await
    }

    pub async fn find_one_and_delete(&self, filter: Filter) -> Result<Option<Document>> {
        soft_delete_returning(self, DeleteKind::FindOneAndDelete, filter, None).await
    }

    pub async fn find_by_id_and_delete(&self, id: impl Into<Value>) -> Result<Option<Document>> {
        soft_delete_returning(self, DeleteKind::FindByIdAndDelete, Filter::by_id(id), None).await
    }

    /// Delete-class operations that also record who deleted the records.
    pub fn as_actor(&self, actor: impl Into<Value>) -> Acting<'_, S> {
        Acting::new(self, actor.into())
    }

    pub async fn restore(&self, filter: Filter) -> Result<UpdateResult> {
        restore_matching(self, filter).await
    }
}

impl<S: ?Sized> std::fmt::Debug for Model<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("collection", &self.inner.schema.collection())
            .field("config", &self.inner.config)
            .field("hooks", &self.inner.hooks)
            .finish()
    }
}
