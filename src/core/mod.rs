

pub mod config;
pub mod error;
pub mod fields;
pub mod policy;

pub use config::{SoftDeleteConfig, SoftDeleteOptions};
pub use error::{Result, SoftDeleteError};
pub use fields::{FieldMap, FieldRole};
pub use policy::{ActorType, ArchivePolicy};
