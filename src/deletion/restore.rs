use tracing::{debug, error, info};

use crate::core::error::Result;
use crate::db::{DocumentStore, Filter, UpdateResult};
use crate::model::Model;


/// Bulk restore. Only documents whose flag is currently `true` are touched.
pub(crate) async fn restore_matching<S>(model: &Model<S>, filter: Filter) -> Result<UpdateResult>
where
    S: DocumentStore + ?Sized,
{
    let interceptor = model.interceptor();
    let filter = interceptor.restore_filter(filter);
    let update = interceptor.restore_update();
    debug!("Restoring documents in {} matching {:?}", model.collection(), filter);

    match model
        .store()
        .update_many(model.collection(), &filter, &update)
        .await
    {
        Ok(result) => {
            info!(
                "Restored {} of {} matched document(s) in {}",
                result.modified_count,
                result.matched_count,
                model.collection()
            );
            Ok(result)
        }
        Err(e) => {
            error!("Restore on {} failed: {}", model.collection(), e);
            Err(e.into())
        }
    }
}
