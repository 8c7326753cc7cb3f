

pub mod client;
pub mod filter;
pub mod ids;
pub mod memory;
pub mod operation;
pub mod pipeline;

pub use client::{DocumentStore, FindOptions, ReturnDocument, SortOrder, StoreError, UpdateResult};
pub use filter::{Document, Filter, Update};
pub use ids::ObjectId;
pub use memory::InMemoryStore;
pub use operation::{AggregateState, QueryKind, QueryState};
pub use pipeline::Pipeline;
