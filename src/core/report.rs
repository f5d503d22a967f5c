//! Run reporting types — what changed, where, and how often.
//!
//! A `ChangeRecord` is one rule's effect on one file. Records aggregate into
//! a `FileReport` per modified file, and reports aggregate into the
//! `RunSummary` for the whole invocation. Nothing here outlives the run.

use serde::Serialize;

/// One rule's replacements within a single file.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    /// The source text or pattern label that matched.
    pub from: String,
    /// The canonical token it was replaced with.
    pub to: String,
    /// How many occurrences were replaced.
    pub count: usize,
}

/// All changes made to one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// File path relative to the scan root.
    pub file: String,
    /// Total replacements across all rules.
    pub replacements: usize,
    /// Per-rule breakdown.
    pub changes: Vec<ChangeRecord>,
}

/// A file that failed to read or write. Excluded from reports; the run continues.
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    /// File path relative to the scan root.
    pub file: String,
    /// Underlying error message.
    pub error: String,
}

/// The outcome of one full scan.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub files_modified: usize,
    pub total_replacements: usize,
    /// True when no file content was written back.
    pub dry_run: bool,
    /// One entry per file with at least one replacement.
    pub reports: Vec<FileReport>,
    /// Files skipped due to read/write failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileError>,
}

impl RunSummary {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            files_scanned: 0,
            files_modified: 0,
            total_replacements: 0,
            dry_run,
            reports: Vec::new(),
            errors: Vec::new(),
        }
    }
}
