use std::sync::LazyLock;

use regex::Regex;

use super::ansi::strip_ansi;

/// Rule line that frames the suite header, the summary and file-load failures.
pub const SEPARATOR: &str = "========================================";
/// Marker printed when a spec file cannot be loaded at all.
pub const FAILED_TO_LOAD_FILE: &str = "FAILED TO LOAD FILE";
/// Trailer printed after the summary when any test failed.
pub const TESTS_FAILED: &str = "Tests Failed. Exit: 1";
/// Indentation of failure continuation lines.
pub const FAILURE_INDENT: &str = "            ";

static SUITE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Testing:\s+(.+)$").expect("valid regex"));
static OUTCOME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\x1B\[\d+m(Success|Fail|Pending)\x1B\[0m\s+\|\|\s+(.+)$")
        .expect("valid regex")
});
static UNEXPECTED_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^We had an unexpected error:\s+").expect("valid regex"));

const SUCCESS_COUNT_PREFIX: &str = "\x1b[32mSuccess:";
const FAILED_COUNT_PREFIX: &str = "\x1b[31mFailed :";
const ERRORS_COUNT_PREFIX: &str = "\x1b[31mErrors :";

/// Where a line sits relative to the structure around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// First line of the transcript.
    First,
    /// Directly after a rule line.
    AfterSeparator,
    Other,
}

impl Position {
    /// Position of `lines[index]`.
    pub fn of(lines: &[String], index: usize) -> Self {
        match index.checked_sub(1).and_then(|prev| lines.get(prev)) {
            None => Position::First,
            Some(prev) if strip_ansi(prev).trim() == SEPARATOR => Position::AfterSeparator,
            Some(_) => Position::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Success,
    Fail,
    Pending,
}

/// Kind of a single transcript line. Borrowed fields point into the raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Separator,
    SuiteHeader {
        path: &'a str,
    },
    Outcome {
        /// Console output printed on the same line before the keyword.
        leading: &'a str,
        keyword: Keyword,
        name: &'a str,
    },
    SuccessCount,
    FailedCount,
    ErrorsCount,
    UnexpectedError {
        /// Rest of the line after the fixed prefix.
        message: &'a str,
    },
    FailedToLoadFile,
    Plain,
}

impl LineKind<'_> {
    /// Short description used in violation messages.
    pub const fn describe(&self) -> &'static str {
        match self {
            LineKind::Separator => "a 40-character rule line",
            LineKind::SuiteHeader { .. } => "a suite header (\"Testing: <path>\")",
            LineKind::Outcome { .. } => "a test outcome line",
            LineKind::SuccessCount => "the success count line",
            LineKind::FailedCount => "the failed count line",
            LineKind::ErrorsCount => "the errors count line",
            LineKind::UnexpectedError { .. } => "an unexpected error line",
            LineKind::FailedToLoadFile => "\"FAILED TO LOAD FILE\"",
            LineKind::Plain => "a plain line",
        }
    }
}

/// Classify `raw` (with `normalized` being `raw` minus color sequences).
///
/// Kinds are tried in a fixed priority order and the first match wins. The
/// file-load marker and the unexpected-error prefix are only recognised
/// directly after a rule line.
pub fn classify<'a>(raw: &'a str, normalized: &str, position: Position) -> LineKind<'a> {
    let trimmed = raw.trim();

    if normalized.trim() == SEPARATOR {
        return LineKind::Separator;
    }
    if let Some(caps) = SUITE_HEADER.captures(trimmed)
        && let Some(path) = caps.get(1)
    {
        return LineKind::SuiteHeader {
            path: path.as_str(),
        };
    }
    if let Some(caps) = OUTCOME.captures(trimmed)
        && let (Some(leading), Some(keyword), Some(name)) = (caps.get(1), caps.get(2), caps.get(3))
    {
        let keyword = match keyword.as_str() {
            "Success" => Keyword::Success,
            "Fail" => Keyword::Fail,
            _ => Keyword::Pending,
        };
        return LineKind::Outcome {
            leading: leading.as_str(),
            keyword,
            name: name.as_str(),
        };
    }
    if trimmed.starts_with(SUCCESS_COUNT_PREFIX) {
        return LineKind::SuccessCount;
    }
    if trimmed.starts_with(FAILED_COUNT_PREFIX) {
        return LineKind::FailedCount;
    }
    if trimmed.starts_with(ERRORS_COUNT_PREFIX) {
        return LineKind::ErrorsCount;
    }
    if position == Position::AfterSeparator {
        if let Some(prefix) = UNEXPECTED_ERROR.find(raw) {
            return LineKind::UnexpectedError {
                message: &raw[prefix.end()..],
            };
        }
        if normalized.trim() == FAILED_TO_LOAD_FILE {
            return LineKind::FailedToLoadFile;
        }
    }
    LineKind::Plain
}
