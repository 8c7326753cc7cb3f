pub mod hooks;
pub mod interceptor;
pub mod models;
pub(crate) mod restore;
pub(crate) mod soft;


pub use hooks::{AggregateHook, HookRegistry, QueryHook};
pub use interceptor::{SoftDeleteInterceptor, active_condition};
pub use models::{DeleteKind, Injection};
