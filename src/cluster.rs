use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One alias-to-index mapping as reported by `_cat/aliases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasBinding {
    #[serde(rename = "index")]
    pub index_name: String,
    #[serde(rename = "alias")]
    pub alias_name: String,
}

impl AliasBinding {
    pub fn new(index_name: impl Into<String>, alias_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            alias_name: alias_name.into(),
        }
    }
}

/// One row of `_cat/indices`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexDescriptor {
    #[serde(rename = "index")]
    pub index_name: String,
}

/// The cluster management calls the rollover and reindex pipelines depend on.
///
/// Every method maps a non-success HTTP status to
/// [`RolloverError::StepFailed`](crate::error::RolloverError::StepFailed).
#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    /// Aliases whose name matches `alias_name`.
    async fn get_aliases(&self, alias_name: &str) -> Result<Vec<AliasBinding>>;

    async fn delete_alias(&self, binding: &AliasBinding) -> Result<()>;

    async fn put_alias(&self, binding: &AliasBinding) -> Result<()>;

    /// Indices whose name starts with `prefix`.
    async fn list_indices(&self, prefix: &str) -> Result<Vec<IndexDescriptor>>;

    async fn delete_index(&self, index_name: &str) -> Result<()>;

    /// Submits an asynchronous reindex and returns the cluster's acknowledgement body.
    async fn reindex(&self, source: &str, dest: &str) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cat_aliases_rows_deserialize() {
        let rows = json!([
            {
                "alias": "logs",
                "index": "logs-2024-02",
                "filter": "-",
                "routing.index": "-",
                "routing.search": "-",
                "is_write_index": "-"
            }
        ]);

        let bindings: Vec<AliasBinding> = serde_json::from_value(rows).unwrap();
        assert_eq!(bindings, vec![AliasBinding::new("logs-2024-02", "logs")]);
    }

    #[test]
    fn test_cat_indices_rows_deserialize() {
        let rows = json!([{ "index": "logs-2024-01" }, { "index": "logs-2024-02" }]);

        let indices: Vec<IndexDescriptor> = serde_json::from_value(rows).unwrap();
        let names: Vec<_> = indices.iter().map(|i| i.index_name.as_str()).collect();
        assert_eq!(names, ["logs-2024-01", "logs-2024-02"]);
    }
}
