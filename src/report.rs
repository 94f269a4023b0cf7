use std::io::{self, Write};

use console::style;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, RolloverError};

/// Terminal result of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RolloverOutcome {
    pub success: bool,
    pub status_code: u16,
    pub detail: Value,
}

impl From<&Result<Value>> for RolloverOutcome {
    fn from(result: &Result<Value>) -> Self {
        match result {
            Ok(detail) => RolloverOutcome {
                success: true,
                status_code: 200,
                detail: detail.clone(),
            },
            Err(e) => RolloverOutcome {
                success: false,
                status_code: e.status_code(),
                detail: e.detail(),
            },
        }
    }
}

/// Render a success payload for the outcome record.
pub fn outcome_detail<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(RolloverError::Output)
}

/// Print the result to stdout/stderr and return the process exit code.
pub fn report(result: &Result<Value>) -> i32 {
    let stdout = io::stdout();
    let stderr = io::stderr();
    report_to(result, &mut stdout.lock(), &mut stderr.lock())
}

pub fn report_to<O: Write, E: Write>(result: &Result<Value>, out: &mut O, err: &mut E) -> i32 {
    let outcome = RolloverOutcome::from(result);
    let detail = serde_json::to_string_pretty(&outcome.detail).unwrap_or_default();

    // Console write failures must not change the exit code.
    match result {
        Ok(_) => {
            let _ = writeln!(out, "{}", style("SUCCESS!").green().bold());
            if !outcome.detail.is_null() {
                let _ = writeln!(out, "{}", detail);
            }
            0
        }
        Err(e) => {
            let _ = writeln!(err, "{}", style(e).red().bold().for_stderr());
            if let RolloverError::StepFailed { .. } | RolloverError::Client { .. } = e {
                let _ = writeln!(err, "{}", detail);
            }
            log::debug!("Failure outcome: {:?}", outcome);
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Step;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn run(result: Result<Value>) -> (i32, String, String) {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = report_to(&result, &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_success_exits_zero() {
        let (code, out, err) = run(Ok(json!({ "deleted": ["logs-2024-01"] })));

        assert_eq!(code, 0);
        assert!(out.starts_with("SUCCESS!\n"));
        assert!(out.contains("logs-2024-01"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_step_failure_names_the_step() {
        let (code, out, err) = run(Err(RolloverError::StepFailed {
            step: Step::Delete,
            status: 403,
            detail: json!({ "error": { "type": "cluster_block_exception" } }),
        }));

        assert_eq!(code, 403);
        assert!(out.is_empty());
        assert!(err.starts_with("DELETE ERROR: Exit with status code 403"));
        assert!(err.contains("cluster_block_exception"));
    }

    #[test]
    fn test_validation_exits_500() {
        let (code, _, err) = run(Err(RolloverError::Validation(
            "ERROR: Must specify both index and target parameters.".to_string(),
        )));

        assert_eq!(code, 500);
        assert_eq!(
            err,
            "ERROR: Must specify both index and target parameters.\n"
        );
    }

    #[test]
    fn test_outcome_record() {
        let outcome = RolloverOutcome::from(&Err(RolloverError::StepFailed {
            step: Step::List,
            status: 503,
            detail: json!("unavailable"),
        }));
        assert_eq!(
            outcome,
            RolloverOutcome {
                success: false,
                status_code: 503,
                detail: json!("unavailable"),
            }
        );

        let outcome = RolloverOutcome::from(&Ok(json!({ "task": "n:1" })));
        assert!(outcome.success);
        assert_eq!(outcome.status_code, 200);
    }

    #[test]
    fn test_unserializable_payload_is_an_error() {
        // JSON object keys must be strings
        let payload: BTreeMap<(u8, u8), u8> = BTreeMap::from([((1, 2), 3)]);

        let err = outcome_detail(&payload).unwrap_err();
        assert!(matches!(err, RolloverError::Output(_)));

        let (code, out, err) = run(Err(err));
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert!(err.contains("failed to serialize outcome"));
    }

    #[test]
    fn test_summary_detail_lists_changes() {
        let summary = crate::rollover::RolloverSummary {
            removed: None,
            added: crate::cluster::AliasBinding::new("logs-2024-03", "logs"),
            deleted: vec!["logs-2024-01".to_string()],
        };

        let detail = outcome_detail(&summary).unwrap();
        assert_eq!(detail["removed"], Value::Null);
        assert_eq!(detail["added"]["index"], "logs-2024-03");
        assert_eq!(detail["deleted"], json!(["logs-2024-01"]));
    }
}
