use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Exit code used when the required arguments are missing.
pub const VALIDATION_EXIT_CODE: i32 = 500;

/// Exit code for failures that carry no HTTP status.
pub const CLIENT_EXIT_CODE: i32 = 1;

/// A single cluster call in the rollover or reindex pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Lookup,
    Remove,
    Put,
    List,
    Delete,
    Reindex,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Lookup => "lookup",
            Step::Remove => "remove",
            Step::Put => "put",
            Step::List => "list",
            Step::Delete => "delete",
            Step::Reindex => "reindex",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RolloverError {
    /// Required CLI input is missing; nothing has been sent to the cluster.
    #[error("{0}")]
    Validation(String),

    /// The cluster client could not be configured.
    #[error("failed to set up cluster client: {0:#}")]
    Connection(#[source] anyhow::Error),

    /// A cluster call answered with a non-success status.
    #[error("{} ERROR: Exit with status code {status}", .step.as_str().to_uppercase())]
    StepFailed {
        step: Step,
        status: u16,
        detail: Value,
    },

    /// The success payload could not be rendered as JSON.
    #[error("failed to serialize outcome: {0}")]
    Output(#[source] serde_json::Error),

    /// The client failed without an HTTP status (connection refused, timeout, bad body).
    #[error("{step} request failed: {source}")]
    Client {
        step: Step,
        #[source]
        source: elasticsearch::Error,
    },
}

impl RolloverError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RolloverError::Validation(_) => VALIDATION_EXIT_CODE,
            RolloverError::StepFailed { status, .. } => i32::from(*status),
            RolloverError::Connection(_)
            | RolloverError::Client { .. }
            | RolloverError::Output(_) => CLIENT_EXIT_CODE,
        }
    }

    /// HTTP-style status for the outcome record; 500 when the failure carries none.
    pub fn status_code(&self) -> u16 {
        match self {
            RolloverError::StepFailed { status, .. } => *status,
            _ => 500,
        }
    }

    pub fn step(&self) -> Option<Step> {
        match self {
            RolloverError::StepFailed { step, .. } | RolloverError::Client { step, .. } => {
                Some(*step)
            }
            _ => None,
        }
    }

    /// JSON rendering of the failure, printed by the reporter.
    pub fn detail(&self) -> Value {
        match self {
            RolloverError::StepFailed { detail, .. } => detail.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RolloverError>;
