mod progress;
pub mod retention;

use log::{debug, info, warn};
use serde::Serialize;
use std::time::Instant;

use crate::cli::OperationRequest;
use crate::cluster::{AliasBinding, ClusterApi};
use crate::error::Result;

use self::progress::setup_prune_bar;

/// What a successful rollover changed in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolloverSummary {
    pub removed: Option<AliasBinding>,
    pub added: AliasBinding,
    pub deleted: Vec<String>,
}

/// Repoint `request.alias_name` at `request.target_index` and prune stale
/// indices sharing the alias name as prefix.
///
/// Steps run strictly in order and the first failure aborts the rest; nothing
/// already done is rolled back. The alias is removed before the new binding
/// is added, so there is a short window where it resolves to nothing.
/// Re-running with the same arguments is the recovery path.
pub async fn roll_over<C: ClusterApi>(
    cluster: &C,
    request: &OperationRequest,
    quiet: bool,
) -> Result<RolloverSummary> {
    let alias = request.alias_name.as_str();
    let target = request.target_index.as_str();
    let start_time = Instant::now();

    // 1. lookup
    info!("Looking up current bindings for alias {}", alias);
    let bindings = cluster.get_aliases(alias).await?;
    if bindings.len() > 1 {
        warn!(
            "Alias {} is bound to {} indices, only {} will be removed",
            alias,
            bindings.len(),
            bindings[0].index_name
        );
    }
    let current = bindings.into_iter().next();

    // 2. remove
    match &current {
        Some(binding) => {
            info!(
                "Removing alias {} from index {}",
                binding.alias_name, binding.index_name
            );
            cluster.delete_alias(binding).await?;
        }
        None => info!("Alias {} is not bound yet, nothing to remove", alias),
    }

    // 3. put
    let added = AliasBinding::new(target, alias);
    info!("Binding alias {} to index {}", alias, target);
    cluster.put_alias(&added).await?;

    // 4. list
    let candidates = cluster.list_indices(alias).await?;
    debug!(
        "Found {} indices matching prefix {}",
        candidates.len(),
        alias
    );

    // 5. delete
    let stale = retention::select_stale(
        candidates.into_iter().map(|index| index.index_name),
        target,
        request.keep_count,
    );
    let deleted = prune(cluster, stale, quiet).await?;

    debug!("Rollover of {} finished in {:.2?}", alias, start_time.elapsed());

    Ok(RolloverSummary {
        removed: current,
        added,
        deleted,
    })
}

/// Delete `stale` one index at a time, stopping at the first failure.
async fn prune<C: ClusterApi>(cluster: &C, stale: Vec<String>, quiet: bool) -> Result<Vec<String>> {
    if stale.is_empty() {
        info!("No stale indices beyond the retention window");
        return Ok(stale);
    }

    info!("Deleting {} stale indices: {:?}", stale.len(), stale);
    let bar = setup_prune_bar(stale.len() as u64, quiet);

    for index_name in &stale {
        if let Some(pb) = &bar {
            pb.set_message(index_name.clone());
        }
        if let Err(e) = cluster.delete_index(index_name).await {
            if let Some(pb) = &bar {
                pb.abandon_with_message(format!("failed to delete {}", index_name));
            }
            return Err(e);
        }
        info!("Deleted index {}", index_name);
        if let Some(pb) = &bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = bar {
        pb.finish_with_message(format!("deleted {} indices", stale.len()));
    }

    Ok(stale)
}
