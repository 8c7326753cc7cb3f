//! Soft-delete overlay for document stores.
//!
//! Delete-class operations mark records deleted instead of removing them, and
//! reads are rewritten according to an [`ArchivePolicy`] so deleted records are
//! hidden or shown as configured.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use softdel::{Filter, InMemoryStore, Model, Schema, SoftDeleteOptions};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let posts = Model::apply(store, Schema::new("posts"), SoftDeleteOptions::new())?;
//!
//! posts.delete_one(Filter::eq("title", "draft")).await?;
//! let visible = posts.find(Filter::new()).exec().await?;
//! let everything = posts.find(Filter::new()).with_deleted().exec().await?;
//! posts.restore(Filter::eq("title", "draft")).await?;
//! ```

pub mod core;
pub mod db;
pub mod deletion;
pub mod model;
pub mod schema;
pub mod utils;

pub use crate::core::config::{SoftDeleteConfig, SoftDeleteOptions};
pub use crate::core::error::{Result, SoftDeleteError};
pub use crate::core::fields::{FieldMap, FieldRole};
pub use crate::core::policy::{ActorType, ArchivePolicy};
pub use db::{
    Document, DocumentStore, Filter, InMemoryStore, ObjectId, Pipeline, StoreError, Update,
    UpdateResult,
};
pub use deletion::{Injection, SoftDeleteInterceptor};
pub use model::{Aggregate, Entity, Model, Query};
pub use schema::{FieldDef, FieldType, Schema};
pub use utils::init_tracing;
