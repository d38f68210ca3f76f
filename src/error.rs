// Error kinds shared across the analytical core.
//
// Every fallible public function returns ArbResult. The variants are the
// complete set of failure conditions; callers branch on the kind, the UI
// layer renders a message per kind.

use std::time::Duration;

use thiserror::Error;

pub type ArbResult<T> = Result<T, ArbError>;

#[derive(Debug, Error)]
pub enum ArbError {
    /// A referenced date, symbol, or file is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed configuration, unknown direction, non-positive quantity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Stale price under a required leg, broker not connected, or too few
    /// bars for analysis.
    #[error("precondition not met: {0}")]
    PreconditionNotMet(String),

    /// A data row violates its own invariants (bid > ask, negative volume).
    #[error("inconsistent data: {0}")]
    InconsistentData(String),

    /// A broker call ran past its per-call deadline.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// Scan cancelled before completion.
    #[error("scan cancelled")]
    Cancelled,
}
