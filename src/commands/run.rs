use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use tokenfix::normalize;
use tokenfix::report::{ChangeRecord, FileError};
use tokenfix::rules::{RuleSet, ScanFilter};

use crate::commands::CmdResult;

/// Default scan root, relative to the repo checkout.
const DEFAULT_PATH: &str = "web/src";

#[derive(Args)]
pub struct RunArgs {
    /// Root path to scan (file or directory)
    #[arg(long, default_value = DEFAULT_PATH)]
    path: PathBuf,

    /// Compute and report all changes without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Include a per-file breakdown of every change
    #[arg(long)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RunOutput {
    #[serde(rename = "normalize.run")]
    Run {
        path: String,
        dry_run: bool,
        files_scanned: usize,
        files_modified: usize,
        total_replacements: usize,
        files: Vec<FileSummary>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        errors: Vec<FileError>,
    },
}

#[derive(Serialize)]
pub struct FileSummary {
    pub file: String,
    pub replacements: usize,
    /// Present only with --verbose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<ChangeRecord>>,
}

pub fn run(args: RunArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<RunOutput> {
    let rules = RuleSet::defaults();
    let filter = ScanFilter::defaults();

    let summary = normalize::run(&rules, &filter, &args.path, !args.dry_run)?;

    let files = summary
        .reports
        .iter()
        .map(|r| FileSummary {
            file: r.file.clone(),
            replacements: r.replacements,
            changes: if args.verbose {
                Some(r.changes.clone())
            } else {
                None
            },
        })
        .collect();

    // Per-file errors are already on the summary; only a missing root path
    // makes the whole run fail.
    Ok((
        RunOutput::Run {
            path: args.path.display().to_string(),
            dry_run: summary.dry_run,
            files_scanned: summary.files_scanned,
            files_modified: summary.files_modified,
            total_replacements: summary.total_replacements,
            files,
            errors: summary.errors,
        },
        0,
    ))
}
