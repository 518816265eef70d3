pub mod outcome;
pub mod report;

pub use outcome::{Diagnostic, FALLBACK_FAILURE_MESSAGE, Failure, Outcome};
pub use report::{Report, TestRecord, last_dotted_segment};
