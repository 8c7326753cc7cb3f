
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum DeleteKind {
    DeleteOne,
    DeleteMany,
    FindOneAndDelete,
    FindByIdAndDelete,
}

impl DeleteKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}


/// What the interceptor did to one read operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Injection {
    Injected,
    /// `Scope` / `All` never inject.
    PolicyOpen,
    /// The operation opted out with `with_deleted()`.
    IncludeDeleted,
    /// The caller already constrains the deletion flag.
    ExplicitFilter,
}

impl Injection {
    #[must_use]
    pub fn injected(&self) -> bool {
        matches!(self, Self::Injected)
    }
}
