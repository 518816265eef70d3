use crate::models::{Diagnostic, Report, TestRecord, last_dotted_segment};

use super::ansi::strip_ansi;
use super::violation::Violation;

pub const MESSAGE_PREFIX: &str = "Converting plenary test output to JUnit XML report: ";

/// Build the report emitted when the transcript does not match the grammar:
/// a single error record whose body is the whole input, line-numbered.
pub fn synthesize(lines: &[String], suite_name: &str, violation: &Violation) -> Report {
    let mut report = Report::new(suite_name);
    report.push(TestRecord::error(
        last_dotted_segment(suite_name),
        Diagnostic::with_message(
            format!("{MESSAGE_PREFIX}{violation}"),
            format!("Test output:\n{}", numbered(lines)),
        ),
    ));
    report
}

/// `lines` rendered as `{n}| {line}` with right-aligned 1-based numbers.
fn numbered(lines: &[String]) -> String {
    let width = lines.len().to_string().len();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| strip_ansi(&format!("{:>width$}| {}", i + 1, line)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test_log::test]
    fn replaces_everything_with_one_error() {
        let input = lines(&["a", "\x1b[31mb\x1b[0m"]);
        let violation = Violation::Unexpected {
            line: 2,
            found: "b".into(),
        };
        let report = synthesize(&input, "tests.foo", &violation);

        assert_eq!(report.suite_name, "tests.foo");
        assert_eq!((report.tests, report.errors), (1, 1));
        assert_eq!((report.failures, report.skipped), (0, 0));
        let record = &report.test_cases[0];
        assert_eq!(record.name, "foo");
        assert_eq!(
            record.outcome,
            Outcome::Error(Diagnostic::with_message(
                "Converting plenary test output to JUnit XML report: unexpected line 2: \"b\"",
                "Test output:\n1| a\n2| b"
            ))
        );
    }

    #[test_log::test]
    fn numbers_are_right_aligned() {
        let input: Vec<String> = (1..=10).map(|i| format!("line {i}")).collect();
        let text = numbered(&input);
        let rendered: Vec<&str> = text.lines().collect();
        assert_eq!(rendered[0], " 1| line 1");
        assert_eq!(rendered[9], "10| line 10");
    }

    #[test_log::test]
    fn unknown_suite_gives_empty_name() {
        let violation = Violation::Truncated {
            line: 1,
            expected: "a 40-character rule line",
            available: 0,
        };
        let report = synthesize(&[], "", &violation);
        assert_eq!(report.suite_name, "");
        assert_eq!(report.test_cases[0].name, "");
    }
}
