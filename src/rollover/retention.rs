use std::collections::BTreeSet;

/// Pick the stale indices to delete after a rollover.
///
/// The target is never a candidate. The remaining names are sorted
/// ascending and everything except the newest `keep` is returned, oldest
/// first. Ordering is lexicographic, so callers must use index names whose
/// lexicographic order matches their age (zero-padded sequence numbers or
/// date suffixes such as `logs-2024-01`).
pub fn select_stale<I, S>(candidates: I, target: &str, keep: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let stale: BTreeSet<String> = candidates
        .into_iter()
        .map(Into::into)
        .filter(|name| name != target)
        .collect();

    let excess = stale.len().saturating_sub(keep);
    stale.into_iter().take(excess).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: [&str; 3] = ["logs-2024-01", "logs-2024-02", "logs-2024-03"];

    #[test]
    fn test_keep_one_deletes_oldest() {
        let deleted = select_stale(CANDIDATES, "logs-2024-03", 1);
        assert_eq!(deleted, ["logs-2024-01"]);
    }

    #[test]
    fn test_keep_zero_deletes_every_non_target() {
        let deleted = select_stale(CANDIDATES, "logs-2024-03", 0);
        assert_eq!(deleted, ["logs-2024-01", "logs-2024-02"]);
    }

    #[test]
    fn test_fewer_candidates_than_keep_deletes_nothing() {
        assert!(select_stale(CANDIDATES, "logs-2024-03", 2).is_empty());
        assert!(select_stale(CANDIDATES, "logs-2024-03", 10).is_empty());
        assert!(select_stale(Vec::<String>::new(), "logs-2024-03", 0).is_empty());
    }

    #[test]
    fn test_target_exempt_even_when_oldest() {
        // Rolling back to an older index must not delete it.
        let deleted = select_stale(CANDIDATES, "logs-2024-01", 0);
        assert_eq!(deleted, ["logs-2024-02", "logs-2024-03"]);

        let deleted = select_stale(CANDIDATES, "logs-2024-01", 1);
        assert_eq!(deleted, ["logs-2024-02"]);
    }

    #[test]
    fn test_unsorted_input_is_sorted_ascending() {
        let deleted = select_stale(
            ["logs-2024-05", "logs-2024-02", "logs-2024-04", "logs-2024-01"],
            "logs-2024-06",
            2,
        );
        assert_eq!(deleted, ["logs-2024-01", "logs-2024-02"]);
    }

    #[test]
    fn test_deletion_count_is_excess_over_keep() {
        let names: Vec<String> = (0..20).map(|i| format!("idx-{:03}", i)).collect();

        for keep in 0..25 {
            let deleted = select_stale(names.clone(), "idx-019", keep);
            let stale = names.len() - 1;
            assert_eq!(deleted.len(), stale.saturating_sub(keep), "keep={}", keep);
            assert!(!deleted.contains(&"idx-019".to_string()));
            // Always the smallest names
            assert_eq!(deleted, names[..deleted.len()]);
        }
    }
}
