use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::error::{Result, SoftDeleteError};
use crate::db::{Document, DocumentStore, Filter};
use crate::deletion::SoftDeleteInterceptor;
use crate::utils::parse_timestamp;

use super::Model;


/// One fetched or created document, bound to the model it belongs to.
pub struct Entity<S: ?Sized> {
    model: Model<S>,
    doc: Document,
}

impl<S: DocumentStore + ?Sized> Entity<S> {
    pub(crate) fn new(model: Model<S>, doc: Document) -> Self {
        Self { model, doc }
    }

    pub fn id(&self) -> Option<&Value> {
        self.doc.get("_id")
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.doc.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.doc.insert(field.into(), value.into());
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }


    pub fn is_deleted(&self) -> bool {
        self.doc.get(self.model.config().fields().flag()) == Some(&Value::Bool(true))
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        let key = self.model.config().fields().timestamp()?;
        self.doc.get(key).and_then(parse_timestamp)
    }

    pub fn deleted_by(&self) -> Option<&Value> {
        let key = self.model.config().fields().actor()?;
        self.doc.get(key).filter(|v| !v.is_null())
    }


    /// Persists the whole document by `_id`.
    pub async fn save(&mut self) -> Result<()> {
        let id = self
            .id()
            .cloned()
            .ok_or_else(|| SoftDeleteError::validation("entity has no _id"))?;
        self.model.schema().validate(&self.doc)?;

        let result = self
            .model
            .store()
            .replace_one(self.model.collection(), &Filter::by_id(id.clone()), self.doc.clone())
            .await?;
        if result.matched_count == 0 {
            return Err(SoftDeleteError::NotFound(format!(
                "{} in {}",
                id,
                self.model.collection()
            )));
        }
        debug!("Saved {} in {}", id, self.model.collection());
        Ok(())
    }

    pub async fn restore(mut self) -> Result<Self> {
        if !self.is_deleted() {
            let id = self.id().cloned().unwrap_or_default();
            warn!(
                "Restoring {} in {} which is not deleted",
                id,
                self.model.collection()
            );
        }
        let fields = self.model.interceptor().restore_fields();
        SoftDeleteInterceptor::apply_fields(&mut self.doc, fields);
        self.save().await?;
        Ok(self)
    }

    pub async fn soft_delete(mut self, actor: Option<Value>) -> Result<Self> {
        let fields = self
            .model
            .interceptor()
            .delete_fields(actor.as_ref(), Utc::now())?;
        SoftDeleteInterceptor::apply_fields(&mut self.doc, fields);
        self.save().await?;
        Ok(self)
    }
}

impl<S: ?Sized> Clone for Entity<S> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            doc: self.doc.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for Entity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("collection", &self.model.inner.schema.collection())
            .field("doc", &self.doc)
            .finish()
    }
}
