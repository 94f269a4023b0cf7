use log::info;
use serde_json::Value;

use crate::cluster::ClusterApi;
use crate::error::Result;

/// Submit an asynchronous reindex from `source` into `dest`.
///
/// Returns once the cluster has accepted the task; completion is not polled.
/// Run the alias operation separately after the task finishes.
pub async fn reindex<C: ClusterApi>(cluster: &C, source: &str, dest: &str) -> Result<Value> {
    info!("Submitting reindex from {} to {}", source, dest);
    let submission = cluster.reindex(source, dest).await?;

    if let Some(task) = submission.get("task").and_then(Value::as_str) {
        info!("Reindex accepted as task {}", task);
    }

    Ok(submission)
}
