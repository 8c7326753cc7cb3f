use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info};

use super::models::DeleteKind;
use crate::core::error::{Result, SoftDeleteError};
use crate::db::{Document, DocumentStore, Filter, QueryKind, QueryState, ReturnDocument, UpdateResult};
use crate::model::Model;


/// `deleteOne` / `deleteMany` as a flag update. The match filter is passed
/// through untouched, so no read-visibility rule applies here.
pub(crate) async fn soft_delete<S>(
    model: &Model<S>,
    kind: DeleteKind,
    filter: Filter,
    actor: Option<&Value>,
) -> Result<UpdateResult>
where
    S: DocumentStore + ?Sized,
{
    debug!("Rewriting {} on {} into an update", kind.as_str(), model.collection());

    let update = model.interceptor().delete_update(actor, Utc::now())?;
    let outcome = match kind {
        DeleteKind::DeleteOne => {
            model
                .store()
                .update_one(model.collection(), &filter, &update)
                .await
        }
        DeleteKind::DeleteMany => {
            model
                .store()
                .update_many(model.collection(), &filter, &update)
                .await
        }
        DeleteKind::FindOneAndDelete | DeleteKind::FindByIdAndDelete => {
            return Err(SoftDeleteError::validation(format!(
                "{} returns the deleted document and cannot run as a plain update",
                kind.as_str()
            )));
        }
    };

    match outcome {
        Ok(result) => {
            info!(
                "Soft deleted {} of {} matched document(s) in {} via {}",
                result.modified_count,
                result.matched_count,
                model.collection(),
                kind.as_str()
            );
            Ok(result)
        }
        Err(e) => {
            error!("{} on {} failed: {}", kind.as_str(), model.collection(), e);
            Err(e.into())
        }
    }
}


/// `findOneAndDelete` / `findByIdAndDelete` as find-and-update, returning the
/// document as it was before the flag was set. Runs through the
/// find-and-update read hooks like any other find-and-update.
pub(crate) async fn soft_delete_returning<S>(
    model: &Model<S>,
    kind: DeleteKind,
    filter: Filter,
    actor: Option<&Value>,
) -> Result<Option<Document>>
where
    S: DocumentStore + ?Sized,
{
    debug!("Rewriting {} on {} into find-and-update", kind.as_str(), model.collection());

    let update = model.interceptor().delete_update(actor, Utc::now())?;
    let mut query = QueryState::new(QueryKind::FindOneAndUpdate, filter).with_update(update.clone());
    model.hooks().run_query(&mut query);

    match model
        .store()
        .find_one_and_update(model.collection(), &query.filter, &update, ReturnDocument::Before)
        .await
    {
        Ok(Some(previous)) => {
            let id = previous.get("_id").cloned().unwrap_or_default();
            info!(
                "Soft deleted {} in {} via {}",
                id,
                model.collection(),
                kind.as_str()
            );
            Ok(Some(previous))
        }
        Ok(None) => {
            debug!("{} on {} matched nothing", kind.as_str(), model.collection());
            Ok(None)
        }
        Err(e) => {
            error!("{} on {} failed: {}", kind.as_str(), model.collection(), e);
            Err(e.into())
        }
    }
}
