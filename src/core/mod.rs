// Public modules
pub mod error;
pub mod normalize;
pub mod report;
pub mod rules;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use report::{ChangeRecord, FileError, FileReport, RunSummary};
