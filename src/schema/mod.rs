

pub mod augment;
pub mod types;

pub use augment::augment;
pub use types::{FieldDef, FieldType, Schema};
