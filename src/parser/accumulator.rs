use log::debug;

use crate::config::ReportConfig;
use crate::models::{
    Diagnostic, FALLBACK_FAILURE_MESSAGE, Failure, Outcome, Report, TestRecord,
};

use super::ansi::strip_ansi;
use super::line::{
    FAILURE_INDENT, Keyword, LineKind, Position, SEPARATOR, TESTS_FAILED, classify,
};
use super::violation::Violation;

/// Message on the record built from an error raised outside any test.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error reported. \
    This usually occurs when an error is raised outside of an \"it\" block.";

const SUITE_HEADER_EXPECTED: &str = LineKind::SuiteHeader { path: "" }.describe();
const LOAD_ERROR_EXPECTED: &str = "the error printed for the file that failed to load";
const TESTS_FAILED_EXPECTED: &str = "\"Tests Failed. Exit: 1\"";

/// Where the accumulator is in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Output printed before the first rule line.
    Preamble,
    /// Directly after the first rule line; expects `Testing: <path>`.
    Header,
    /// Outcome lines, failure continuations and console output.
    Body,
    /// Cursor sits on the success count line.
    Summary,
    /// After the summary's closing rule line.
    Trailer,
    Done,
}

/// Single-pass state machine that rebuilds a [`Report`] from transcript lines.
///
/// The currently open failure is tracked as an index into the report's
/// records; it is sealed at the next outcome, summary or rule line, or at end
/// of input.
pub struct Accumulator<'a> {
    lines: &'a [String],
    options: &'a ReportConfig,
    cursor: usize,
    report: Report,
    startup: Vec<String>,
    open_failure: Option<usize>,
    failure_lines: Vec<String>,
    pending_output: Vec<String>,
}

impl<'a> Accumulator<'a> {
    pub fn new(lines: &'a [String], options: &'a ReportConfig) -> Self {
        Self {
            lines,
            options,
            cursor: 0,
            report: Report::default(),
            startup: Vec::new(),
            open_failure: None,
            failure_lines: Vec::new(),
            pending_output: Vec::new(),
        }
    }

    /// Drive the machine until the transcript is consumed or a line violates
    /// the grammar.
    pub fn run(&mut self) -> Result<(), Violation> {
        let mut state = State::Preamble;
        while state != State::Done {
            state = self.step(state)?;
        }
        Ok(())
    }

    pub fn step(&mut self, state: State) -> Result<State, Violation> {
        match state {
            State::Preamble => self.preamble(),
            State::Header => self.header(),
            State::Body => self.body(),
            State::Summary => self.summary(),
            State::Trailer => self.trailer(),
            State::Done => Ok(State::Done),
        }
    }

    /// Suite name as far as it is known; empty before the header was read.
    pub fn suite_name(&self) -> &str {
        &self.report.suite_name
    }

    pub fn into_report(self) -> Report {
        self.report
    }

    fn preamble(&mut self) -> Result<State, Violation> {
        let kind = self.require(self.cursor, LineKind::Separator.describe())?;
        let index = self.cursor;
        self.cursor += 1;
        if kind == LineKind::Separator {
            return Ok(State::Header);
        }
        let text = strip_ansi(&self.lines[index]);
        self.startup.push(text.trim_end().to_string());
        Ok(State::Preamble)
    }

    fn header(&mut self) -> Result<State, Violation> {
        let LineKind::SuiteHeader { path } = self.require(self.cursor, SUITE_HEADER_EXPECTED)?
        else {
            return Err(self.mismatch(self.cursor, SUITE_HEADER_EXPECTED));
        };
        self.report.suite_name = suite_name_from_path(&strip_ansi(path), self.options);
        debug!("suite {:?} from {:?}", self.report.suite_name, path);

        let startup = self.startup.join("\n");
        let startup = startup.trim_end();
        if !startup.is_empty() {
            debug!("recording {} lines of startup output", self.startup.len());
            self.report.push(TestRecord::error(
                self.options.startup_case_name.clone(),
                Diagnostic::new(startup),
            ));
        }

        self.cursor += 1;
        Ok(State::Body)
    }

    fn body(&mut self) -> Result<State, Violation> {
        let lines = self.lines;
        let Some(raw) = lines.get(self.cursor) else {
            self.seal_failure();
            return Ok(State::Done);
        };
        let normalized = strip_ansi(raw);
        match classify(raw, &normalized, Position::of(self.lines, self.cursor)) {
            LineKind::Outcome {
                leading,
                keyword,
                name,
            } => {
                self.seal_failure();
                self.record_outcome(leading, keyword, name);
                self.cursor += 1;
            }
            LineKind::SuccessCount => {
                self.seal_failure();
                return Ok(State::Summary);
            }
            LineKind::Separator => {
                self.seal_failure();
                self.record_load_failure()?;
            }
            _ => {
                self.continuation_or_output(raw, &normalized);
                self.cursor += 1;
            }
        }
        Ok(State::Body)
    }

    fn summary(&mut self) -> Result<State, Violation> {
        self.expect_kind(self.cursor + 1, LineKind::FailedCount)?;
        self.expect_kind(self.cursor + 2, LineKind::ErrorsCount)?;
        self.expect_kind(self.cursor + 3, LineKind::Separator)?;
        self.cursor += 4;
        debug!(
            "summary reached: {} tests, {} failures",
            self.report.tests, self.report.failures
        );
        Ok(State::Trailer)
    }

    fn trailer(&mut self) -> Result<State, Violation> {
        let lines = self.lines;
        let Some(raw) = lines.get(self.cursor) else {
            return Ok(State::Done);
        };
        let normalized = strip_ansi(raw);
        if let LineKind::UnexpectedError { message } =
            classify(raw, &normalized, Position::of(self.lines, self.cursor))
        {
            self.record_unexpected_error(message);
            return Ok(State::Done);
        }

        let found = normalized.trim().to_string();
        if self.report.failures == 0 {
            return Err(Violation::Unexpected {
                line: self.cursor + 1,
                found,
            });
        }
        if found != TESTS_FAILED {
            return Err(Violation::Mismatch {
                line: self.cursor + 1,
                expected: TESTS_FAILED_EXPECTED,
                found,
            });
        }
        if let Some(extra) = self.lines.get(self.cursor + 1) {
            return Err(Violation::Unexpected {
                line: self.cursor + 2,
                found: strip_ansi(extra).trim().to_string(),
            });
        }
        Ok(State::Done)
    }

    fn record_outcome(&mut self, leading: &str, keyword: Keyword, name: &str) {
        if !leading.is_empty() {
            self.pending_output.push(strip_ansi(leading));
        }
        let outcome = match keyword {
            Keyword::Success => Outcome::Pass,
            Keyword::Fail => Outcome::Fail(Failure::default()),
            Keyword::Pending => Outcome::Skipped,
        };
        let failed = outcome.is_failure();
        let mut record = TestRecord::new(strip_ansi(name), outcome);
        record.captured_output = self.take_output();
        let index = self.report.push(record);
        if failed {
            self.open_failure = Some(index);
        }
    }

    /// Cursor sits on a rule line in the middle of the body: the next line
    /// must be the file-load marker, followed by the load error and a closing
    /// rule line.
    fn record_load_failure(&mut self) -> Result<(), Violation> {
        let marker = self.cursor + 1;
        self.expect_kind(marker, LineKind::FailedToLoadFile)?;
        let first = marker + 1;
        self.require(first, LOAD_ERROR_EXPECTED)?;

        let end = (first..self.lines.len())
            .find(|&i| self.is_separator(i))
            .unwrap_or(self.lines.len());
        self.expect_kind(end, LineKind::Separator)?;

        let body = self.lines[first..end]
            .iter()
            .map(|line| strip_ansi(line).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        debug!("file failed to load, {} lines of error output", end - first);
        let name = self.report.short_name().to_string();
        self.report.push(TestRecord::error(name, Diagnostic::new(body)));
        self.cursor = end + 1;
        Ok(())
    }

    fn record_unexpected_error(&mut self, first_line: &str) {
        let body = std::iter::once(strip_ansi(first_line))
            .chain(self.lines[self.cursor + 1..].iter().map(|l| strip_ansi(l)))
            .collect::<Vec<_>>()
            .join("\n");
        debug!("unexpected top-level error after the summary");
        let mut record = TestRecord::error(
            self.report.short_name().to_string(),
            Diagnostic::with_message(UNEXPECTED_ERROR_MESSAGE, body),
        );
        record.captured_output = self.take_output();
        self.report.push(record);
    }

    fn continuation_or_output(&mut self, raw: &str, normalized: &str) {
        if let Some(index) = self.open_failure
            && let Some(rest) = raw.strip_prefix(FAILURE_INDENT)
            && let Some(failure) = self.report.failure_mut(index)
        {
            if failure.message.is_empty() {
                failure.message = normalized.trim().to_string();
            } else {
                self.failure_lines.push(strip_ansi(rest));
            }
            return;
        }
        self.pending_output.push(normalized.to_string());
    }

    fn seal_failure(&mut self) {
        let Some(index) = self.open_failure.take() else {
            return;
        };
        let body = self.failure_lines.join("\n");
        self.failure_lines.clear();
        if let Some(failure) = self.report.failure_mut(index) {
            failure.body = body.trim().to_string();
            if failure.message.is_empty() {
                failure.message = FALLBACK_FAILURE_MESSAGE.to_string();
            }
        }
    }

    fn take_output(&mut self) -> Option<String> {
        let joined = self.pending_output.join("\n");
        self.pending_output.clear();
        let text = joined.trim();
        (self.options.capture_output && !text.is_empty()).then(|| text.to_string())
    }

    fn is_separator(&self, index: usize) -> bool {
        self.lines
            .get(index)
            .is_some_and(|line| strip_ansi(line).trim() == SEPARATOR)
    }

    /// Classify `lines[index]`, failing if the transcript ends before it.
    fn require(&self, index: usize, expected: &'static str) -> Result<LineKind<'a>, Violation> {
        let Some(raw) = self.lines.get(index) else {
            return Err(Violation::Truncated {
                line: index + 1,
                expected,
                available: self.lines.len(),
            });
        };
        Ok(classify(
            raw,
            &strip_ansi(raw),
            Position::of(self.lines, index),
        ))
    }

    fn expect_kind(&self, index: usize, want: LineKind<'static>) -> Result<(), Violation> {
        if self.require(index, want.describe())? == want {
            Ok(())
        } else {
            Err(self.mismatch(index, want.describe()))
        }
    }

    fn mismatch(&self, index: usize, expected: &'static str) -> Violation {
        let found = self
            .lines
            .get(index)
            .map(|line| strip_ansi(line).trim().to_string())
            .unwrap_or_default();
        Violation::Mismatch {
            line: index + 1,
            expected,
            found,
        }
    }
}

/// `tests/foo/bar_spec.lua` -> `tests.foo.bar` (or `tests.foo.bar_spec`).
pub fn suite_name_from_path(path: &str, options: &ReportConfig) -> String {
    let path = path.trim();
    let mut stem = path.strip_suffix(".lua").unwrap_or(path);
    if options.strip_spec_suffix {
        stem = stem.strip_suffix("_spec").unwrap_or(stem);
    }
    stem.replace('/', ".")
}
