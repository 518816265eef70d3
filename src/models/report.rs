use serde::Serialize;

use super::outcome::{Diagnostic, Failure, Outcome};

/// One named test result, in the order it was discovered in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRecord {
    pub name: String,
    pub outcome: Outcome,
    /// Console text printed before the outcome line, if capture is enabled.
    pub captured_output: Option<String>,
}

impl TestRecord {
    pub fn new(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            captured_output: None,
        }
    }

    pub fn error(name: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self::new(name, Outcome::Error(diagnostic))
    }
}

/// Root of the recovered model: one suite and its test records.
///
/// The counters are running tallies kept in step with `test_cases` by
/// [`Report::push`]; they are never recomputed from the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub suite_name: String,
    pub tests: usize,
    pub failures: usize,
    pub skipped: usize,
    pub errors: usize,
    pub test_cases: Vec<TestRecord>,
}

impl Report {
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            ..Self::default()
        }
    }

    /// Append a record and bump the tallies. Returns the record's index.
    pub fn push(&mut self, record: TestRecord) -> usize {
        self.tests += 1;
        match record.outcome {
            Outcome::Pass => {}
            Outcome::Fail(_) => self.failures += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Error(_) => self.errors += 1,
        }
        let index = self.test_cases.len();
        self.test_cases.push(record);
        index
    }

    /// Mutable access to the failure body of the record at `index`, if that
    /// record failed.
    pub fn failure_mut(&mut self, index: usize) -> Option<&mut Failure> {
        match self.test_cases.get_mut(index).map(|r| &mut r.outcome) {
            Some(Outcome::Fail(failure)) => Some(failure),
            _ => None,
        }
    }

    /// Last dotted segment of the suite name (`a.b.c` -> `c`).
    pub fn short_name(&self) -> &str {
        last_dotted_segment(&self.suite_name)
    }
}

pub fn last_dotted_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
