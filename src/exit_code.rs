use crate::parser::Conversion;

/// Exit status when the tool itself fails (unreadable input, render error).
pub const TOOL_FAILURE: u8 = 2;

/// Process exit status for a finished conversion.
///
/// A diagnosed transcript always exits 0: the CI consumer treats a non-zero
/// exit with no failures in the report as "ran but reported nothing". Only
/// failures gate the exit code; errors alone do not.
pub fn for_conversion(conversion: &Conversion) -> u8 {
    match conversion {
        Conversion::Diagnosed(_) => 0,
        Conversion::Parsed(report) if report.failures > 0 => 1,
        Conversion::Parsed(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnostic, Failure, Outcome, Report, TestRecord};

    fn report_with(outcomes: Vec<Outcome>) -> Report {
        let mut report = Report::new("s");
        for (i, outcome) in outcomes.into_iter().enumerate() {
            report.push(TestRecord::new(format!("t{i}"), outcome));
        }
        report
    }

    #[test_log::test]
    fn failures_exit_one() {
        let report = report_with(vec![Outcome::Pass, Outcome::Fail(Failure::default())]);
        assert_eq!(for_conversion(&Conversion::Parsed(report)), 1);
    }

    #[test_log::test]
    fn passes_and_skips_exit_zero() {
        let report = report_with(vec![Outcome::Pass, Outcome::Skipped]);
        assert_eq!(for_conversion(&Conversion::Parsed(report)), 0);
    }

    #[test_log::test]
    fn errors_alone_exit_zero() {
        let report = report_with(vec![Outcome::Error(Diagnostic::new("boom"))]);
        assert_eq!(report.errors, 1);
        assert_eq!(for_conversion(&Conversion::Parsed(report)), 0);
    }

    #[test_log::test]
    fn diagnosed_exits_zero_even_with_failures() {
        let report = report_with(vec![Outcome::Fail(Failure::default())]);
        assert_eq!(for_conversion(&Conversion::Diagnosed(report)), 0);
    }
}
