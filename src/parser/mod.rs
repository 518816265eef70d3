pub mod accumulator;
pub mod ansi;
pub mod diagnostic;
pub mod line;
pub mod violation;

use log::warn;

use crate::config::ReportConfig;
use crate::models::Report;

pub use accumulator::Accumulator;

/// Outcome of converting a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// The transcript matched the grammar.
    Parsed(Report),
    /// The transcript broke the grammar; the report holds a single synthetic
    /// error with the numbered input.
    Diagnosed(Report),
}

impl Conversion {
    pub fn report(&self) -> &Report {
        match self {
            Conversion::Parsed(report) | Conversion::Diagnosed(report) => report,
        }
    }
}

/// Parse the whole transcript, falling back to a diagnostic report on the
/// first structural violation.
pub fn convert(lines: &[String], options: &ReportConfig) -> Conversion {
    let mut accumulator = Accumulator::new(lines, options);
    match accumulator.run() {
        Ok(()) => Conversion::Parsed(accumulator.into_report()),
        Err(violation) => {
            warn!(
                "transcript does not match the expected format at line {}: {}",
                violation.line(),
                violation
            );
            Conversion::Diagnosed(diagnostic::synthesize(
                lines,
                accumulator.suite_name(),
                &violation,
            ))
        }
    }
}
