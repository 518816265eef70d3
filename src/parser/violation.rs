use thiserror::Error;

/// A line that does not fit the transcript grammar where it appears.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("expected line {line} to be {expected}, only {available} lines in input")]
    Truncated {
        line: usize,
        expected: &'static str,
        available: usize,
    },
    #[error("expected line {line} to be {expected}, got {found:?}")]
    Mismatch {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("unexpected line {line}: {found:?}")]
    Unexpected { line: usize, found: String },
}

impl Violation {
    pub fn line(&self) -> usize {
        match self {
            Violation::Truncated { line, .. }
            | Violation::Mismatch { line, .. }
            | Violation::Unexpected { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn messages_quote_found_text() {
        let v = Violation::Mismatch {
            line: 3,
            expected: "a 40-character rule line",
            found: "oops \"quoted\"".into(),
        };
        assert_eq!(
            v.to_string(),
            r#"expected line 3 to be a 40-character rule line, got "oops \"quoted\"""#
        );
        assert_eq!(v.line(), 3);

        let v = Violation::Truncated {
            line: 5,
            expected: "the failed count line",
            available: 4,
        };
        assert_eq!(
            v.to_string(),
            "expected line 5 to be the failed count line, only 4 lines in input"
        );
    }
}
