use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress bar for the retention deletions, drawn on stderr.
pub fn setup_prune_bar(total: u64, quiet: bool) -> Option<ProgressBar> {
    if quiet || total == 0 {
        return None;
    }

    let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
    let style = ProgressStyle::default_bar()
        .template("{spinner:.red} [{elapsed_precise}] [{wide_bar:.yellow/red}] Pruning: {pos}/{len} ({msg})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("starting...");
    Some(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_bar_when_quiet_or_empty() {
        assert!(setup_prune_bar(3, true).is_none());
        assert!(setup_prune_bar(0, false).is_none());
    }

    #[test]
    fn test_bar_length_matches_deletions() {
        let pb = setup_prune_bar(3, false).unwrap();
        assert_eq!(pb.length(), Some(3));
        pb.finish_and_clear();
    }
}
