//! Pre-flight gating of a submission attempt.
//!
//! The validator is a pure function of the current form state. Any blocked
//! outcome prevents network activity entirely; no partial submission is ever
//! issued. Rules are evaluated in a fixed order so the user always sees the
//! first problem, not an arbitrary one.

use std::fmt;

/// Form state at the moment of submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    /// Inquiry text as entered.
    pub query: String,
    /// Dataset names the query will run against, including any dataset
    /// about to be created for it.
    pub dataset_names: Vec<String>,
    /// True when the submission wants a one-shot dataset built from a file.
    pub wants_upload: bool,
    /// True when file content is actually attached.
    pub file_attached: bool,
    /// True when another submission is still in flight.
    pub in_flight: bool,
}

/// Why a submission was blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    AlreadyInProgress,
    EmptyQuery,
    NoDatasetSelected,
    MissingFile,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            BlockReason::AlreadyInProgress => "a submission is already in progress",
            BlockReason::EmptyQuery => "please provide a new inquiry",
            BlockReason::NoDatasetSelected => "please select at least one dataset",
            BlockReason::MissingFile => "please attach a file for the new dataset",
        };
        f.write_str(msg)
    }
}

/// Validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Blocked(BlockReason),
}

/// Gate a submission attempt. Order: in-flight check, query text, dataset
/// selection, attached file.
pub fn validate(form: &SubmissionForm) -> Verdict {
    if form.in_flight {
        return Verdict::Blocked(BlockReason::AlreadyInProgress);
    }
    if form.query.trim().is_empty() {
        return Verdict::Blocked(BlockReason::EmptyQuery);
    }
    if form.dataset_names.is_empty() {
        return Verdict::Blocked(BlockReason::NoDatasetSelected);
    }
    if form.wants_upload && !form.file_attached {
        return Verdict::Blocked(BlockReason::MissingFile);
    }
    Verdict::Ok
}
