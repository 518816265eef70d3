use serde::Serialize;

/// Message used when a failing test is sealed without any continuation lines.
pub const FALLBACK_FAILURE_MESSAGE: &str = "failed";

/// Result of a single test record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail(Failure),
    Skipped,
    Error(Diagnostic),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }
}

/// Details reported under a failing test's outcome line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// First continuation line, trimmed.
    pub message: String,
    pub body: String,
}

/// Error text attached to an `Error` outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: Option<String>,
    pub body: String,
}

impl Diagnostic {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            message: None,
            body: body.into(),
        }
    }

    pub fn with_message(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            body: body.into(),
        }
    }
}
