//! Normalization engine — walk a source tree and rewrite color literals and
//! brand typos to canonical design tokens.
//!
//! For every eligible file the engine:
//! 1. Reads the full content as one string
//! 2. Runs the rewrite pipeline (contrast fixes → brand canonicalization →
//!    context-scoped substitutions → global literal table)
//! 3. Writes the result back in place, or just records it in dry-run mode
//!
//! Read/write failures on a single file are logged and skipped; only a
//! missing root path is fatal. Sibling directories are visited in sorted
//! order so runs are reproducible.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::report::{ChangeRecord, FileError, FileReport, RunSummary};
use crate::rules::{RuleSet, ScanFilter};

// ============================================================================
// File walking
// ============================================================================

fn walk_files(root: &Path, filter: &ScanFilter) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk_recursive(root, filter, &mut files);
    files
}

fn walk_recursive(dir: &Path, filter: &ScanFilter, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if filter.is_excluded(&path) {
                continue;
            }
            walk_recursive(&path, filter, files);
        } else if filter.is_eligible(&path) {
            files.push(path);
        }
    }
}

// ============================================================================
// Rewrite pipeline
// ============================================================================

/// Apply the full rule pipeline to one buffer.
///
/// Stages run sequentially; each sees the output of the previous one. The
/// contrast fixes run first so a brand-background/dark-text pairing becomes
/// white text before the text color would be tokenized generically, and the
/// context rules run before the literal table so context-scoped meanings
/// are not clobbered by the generic mapping.
pub fn rewrite(content: &str, rules: &RuleSet) -> (String, Vec<ChangeRecord>) {
    let mut buf = content.to_string();
    let mut changes = Vec::new();

    for rule in &rules.contrast {
        let count = rule.pattern.find_iter(&buf).count();
        if count > 0 {
            let next = rule
                .pattern
                .replace_all(&buf, rule.replacement.as_str())
                .into_owned();
            buf = next;
            changes.push(ChangeRecord {
                from: rule.label.clone(),
                to: rule.replacement.trim_start_matches("${1}").to_string(),
                count,
            });
        }
    }

    for rule in &rules.brand {
        let count = rule.pattern.find_iter(&buf).count();
        if count > 0 {
            let next = rule
                .pattern
                .replace_all(&buf, regex::NoExpand(rule.canonical.as_str()))
                .into_owned();
            buf = next;
            changes.push(ChangeRecord {
                from: rule.variant.clone(),
                to: rule.canonical.clone(),
                count,
            });
        }
    }

    for rule in &rules.context {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let next = rule
            .pattern
            .replace_all(&buf, |caps: &regex::Captures| {
                let token = rule.token_for(&caps[1]).to_string();
                *counts.entry(token.clone()).or_insert(0) += 1;
                format!("{}[{}]", rule.prefix, token)
            })
            .into_owned();
        buf = next;

        // One record per resolved token, sorted for stable report output
        let mut per_token: Vec<(String, usize)> = counts.into_iter().collect();
        per_token.sort();
        for (token, count) in per_token {
            changes.push(ChangeRecord {
                from: rule.label.clone(),
                to: token,
                count,
            });
        }
    }

    for rule in &rules.literals {
        let count = rule.pattern.find_iter(&buf).count();
        if count > 0 {
            let next = rule
                .pattern
                .replace_all(&buf, regex::NoExpand(rule.token.as_str()))
                .into_owned();
            buf = next;
            changes.push(ChangeRecord {
                from: rule.literal.clone(),
                to: rule.token.clone(),
                count,
            });
        }
    }

    (buf, changes)
}

// ============================================================================
// Run
// ============================================================================

/// Scan `root` and rewrite every eligible file, or preview when `write` is
/// false. Fails only when `root` does not exist; per-file errors are logged,
/// collected on the summary, and skipped.
pub fn run(rules: &RuleSet, filter: &ScanFilter, root: &Path, write: bool) -> Result<RunSummary> {
    if !root.exists() {
        return Err(Error::path_not_found(root.to_string_lossy()));
    }

    let files = if root.is_file() {
        if filter.is_eligible(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        }
    } else {
        walk_files(root, filter)
    };

    let mut summary = RunSummary::new(!write);

    for file_path in &files {
        summary.files_scanned += 1;

        let relative = {
            let stripped = file_path
                .strip_prefix(root)
                .unwrap_or(file_path)
                .to_string_lossy()
                .to_string();
            if stripped.is_empty() {
                file_path.to_string_lossy().to_string()
            } else {
                stripped
            }
        };

        let content = match std::fs::read_to_string(file_path) {
            Ok(c) => c,
            Err(e) => {
                log_status!("normalize", "Skipping {}: {}", relative, e);
                summary.errors.push(FileError {
                    file: relative,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let (rewritten, changes) = rewrite(&content, rules);
        if changes.is_empty() {
            continue;
        }

        let replacements: usize = changes.iter().map(|c| c.count).sum();

        if write {
            if let Err(e) = std::fs::write(file_path, &rewritten) {
                log_status!("normalize", "Failed to write {}: {}", relative, e);
                summary.errors.push(FileError {
                    file: relative,
                    error: e.to_string(),
                });
                continue;
            }
        }

        summary.files_modified += 1;
        summary.total_replacements += replacements;
        summary.reports.push(FileReport {
            file: relative,
            replacements,
            changes,
        });
    }

    if !write {
        log_status!("normalize", "Dry run, no files were written");
    }

    Ok(summary)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn rules() -> RuleSet {
        RuleSet::defaults()
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    #[test]
    fn button_contrast_fires_before_literal_substitution() {
        let input = r##"<button class="bg-[#13ec13] text-[#0d1b0d]">Buy</button>"##;
        let (out, changes) = rewrite(input, &rules());

        assert_eq!(
            out,
            r##"<button class="bg-[var(--primary)] text-white">Buy</button>"##
        );
        let contrast = changes
            .iter()
            .find(|c| c.from == "green button with dark text")
            .expect("contrast record");
        assert_eq!(contrast.to, "text-white");
        assert_eq!(contrast.count, 1);
    }

    #[test]
    fn contrast_skips_primary_bg_with_unrelated_classes() {
        let input = r##"<div class="bg-[#13ec13] w-full">"##;
        let (out, changes) = rewrite(input, &rules());

        // No contrast fix, but the literal still gets tokenized
        assert!(changes.iter().all(|c| c.from != "green button with dark text"));
        assert_eq!(out, r##"<div class="bg-[var(--primary)] w-full">"##);
    }

    #[test]
    fn contrast_does_not_cross_tag_boundary() {
        let input = r##"<i class="bg-[#13ec13]"></i><b class="text-[#0d1b0d]">x</b>"##;
        let (_, changes) = rewrite(input, &rules());
        assert!(changes.iter().all(|c| c.from != "green button with dark text"));
    }

    #[test]
    fn hover_contrast_credited_to_hover_rule() {
        let input = r##"<a class="hover:bg-[#13ec13] hover:text-[#0d1b0d]">"##;
        let (out, changes) = rewrite(input, &rules());

        assert_eq!(
            out,
            r##"<a class="hover:bg-[var(--primary)] hover:text-white">"##
        );
        let hover = changes
            .iter()
            .find(|c| c.from == "green button hover with dark text")
            .expect("hover record");
        assert_eq!(hover.to, "hover:text-white");
        assert!(changes.iter().all(|c| c.from != "green button with dark text"));
    }

    #[test]
    fn brand_variants_normalize_with_per_variant_counts() {
        let input = "Welcome to BUAME  2R, the 2RBUAMI of local trade. buame 2r forever.";
        let (out, changes) = rewrite(input, &rules());

        assert_eq!(
            out,
            "Welcome to 2RBUAME, the 2RBUAME of local trade. 2RBUAME forever."
        );
        let spaced = changes.iter().find(|c| c.from == "BUAME 2R").unwrap();
        assert_eq!(spaced.count, 2);
        let misspelled = changes.iter().find(|c| c.from == "2RBUAMI").unwrap();
        assert_eq!(misspelled.count, 1);
    }

    #[test]
    fn dark_bg_context_wins_over_global_green_mapping() {
        // #13ec13 is the action color everywhere except dark-mode backgrounds
        let input = r##"<div class="dark:bg-[#13ec13] bg-[#13ec13]">"##;
        let (out, _) = rewrite(input, &rules());
        assert_eq!(
            out,
            r##"<div class="dark:bg-[var(--background-dark)] bg-[var(--primary)]">"##
        );
    }

    #[test]
    fn context_rule_falls_back_for_unknown_hex() {
        let input = r##"class="border-[#aabbcc]""##;
        let (out, changes) = rewrite(input, &rules());
        assert_eq!(out, r##"class="border-[var(--border)]""##);
        let record = changes.iter().find(|c| c.from == "border color").unwrap();
        assert_eq!(record.to, "var(--border)");
        assert_eq!(record.count, 1);
    }

    #[test]
    fn text_wrapper_tokenizes_muted_foreground() {
        let input = r##"class="text-[#4c9a4c] hover:text-[#4C9A4C]""##;
        let (out, changes) = rewrite(input, &rules());
        assert_eq!(
            out,
            r##"class="text-[var(--muted-foreground)] hover:text-[var(--muted-foreground)]""##
        );
        let record = changes.iter().find(|c| c.from == "text color").unwrap();
        assert_eq!(record.count, 2);
    }

    #[test]
    fn literal_replacement_is_case_insensitive_and_counted() {
        let input = "a #11d411 b #11D411 c #11d411";
        let (out, changes) = rewrite(input, &rules());
        assert_eq!(out, "a var(--primary) b var(--primary) c var(--primary)");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].from, "#11d411");
        assert_eq!(changes[0].count, 3);
    }

    #[test]
    fn light_and_base_green_collapse_to_one_token() {
        let input = "background: #13ec13; accent: #11d411;";
        let (out, _) = rewrite(input, &rules());
        assert_eq!(out, "background: var(--primary); accent: var(--primary);");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let input = concat!(
            r##"<button class="bg-[#13ec13] text-[#0d1b0d] dark:bg-[#102210] border-[#cfe7cf]">"##,
            "BUAME 2R</button> body { color: #4c9a4c; background: #f8fcf8 }"
        );
        let (first, first_changes) = rewrite(input, &rules());
        assert!(!first_changes.is_empty());

        let (second, second_changes) = rewrite(&first, &rules());
        assert_eq!(second, first);
        assert!(second_changes.is_empty(), "got: {:?}", second_changes);
    }

    #[test]
    fn no_matches_leaves_content_untouched() {
        let input = "const x = 42; // nothing to normalize\n";
        let (out, changes) = rewrite(input, &rules());
        assert_eq!(out, input);
        assert!(changes.is_empty());
    }

    // ------------------------------------------------------------------
    // Run
    // ------------------------------------------------------------------

    #[test]
    fn missing_root_is_fatal() {
        let err = run(
            &rules(),
            &ScanFilter::defaults(),
            Path::new("/definitely/not/here"),
            false,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PathNotFound);
    }

    #[test]
    fn run_rewrites_eligible_files_and_skips_the_rest() {
        let dir = std::env::temp_dir().join("tokenfix_run_test");
        let deps = dir.join("node_modules").join("lib");
        let _ = std::fs::create_dir_all(&deps);

        std::fs::write(
            dir.join("Button.tsx"),
            r##"<button class="bg-[#13ec13] text-[#0d1b0d]">Go</button>"##,
        )
        .unwrap();
        std::fs::write(dir.join("styles.css"), ".x { color: #13ec13 }").unwrap();
        std::fs::write(deps.join("index.js"), "const c = '#13ec13';").unwrap();

        let summary = run(&rules(), &ScanFilter::defaults(), &dir, true).unwrap();

        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.files_modified, 1);
        assert!(!summary.dry_run);
        assert_eq!(summary.reports[0].file, "Button.tsx");

        let rewritten = std::fs::read_to_string(dir.join("Button.tsx")).unwrap();
        assert_eq!(
            rewritten,
            r##"<button class="bg-[var(--primary)] text-white">Go</button>"##
        );

        // Ineligible files are byte-for-byte unchanged
        assert_eq!(
            std::fs::read_to_string(dir.join("styles.css")).unwrap(),
            ".x { color: #13ec13 }"
        );
        assert_eq!(
            std::fs::read_to_string(deps.join("index.js")).unwrap(),
            "const c = '#13ec13';"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn dry_run_reports_the_same_but_writes_nothing() {
        let dir = std::env::temp_dir().join("tokenfix_dry_run_test");
        let _ = std::fs::create_dir_all(&dir);

        let original = "title: BUAME 2R, bg: #f8fcf8";
        std::fs::write(dir.join("config.ts"), original).unwrap();

        let dry = run(&rules(), &ScanFilter::defaults(), &dir, false).unwrap();
        assert!(dry.dry_run);
        assert_eq!(
            std::fs::read_to_string(dir.join("config.ts")).unwrap(),
            original
        );

        let live = run(&rules(), &ScanFilter::defaults(), &dir, true).unwrap();
        assert_eq!(dry.files_scanned, live.files_scanned);
        assert_eq!(dry.files_modified, live.files_modified);
        assert_eq!(dry.total_replacements, live.total_replacements);
        assert_eq!(dry.reports.len(), live.reports.len());
        assert_eq!(dry.reports[0].file, live.reports[0].file);

        assert_eq!(
            std::fs::read_to_string(dir.join("config.ts")).unwrap(),
            "title: 2RBUAME, bg: var(--background)"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn second_run_over_own_output_changes_nothing() {
        let dir = std::env::temp_dir().join("tokenfix_idempotent_run_test");
        let _ = std::fs::create_dir_all(&dir);

        std::fs::write(
            dir.join("Card.jsx"),
            r##"<div class="bg-[#e7f3e7] border-[#cfe7cf] text-[#0d1b0d]">2RBUAMI</div>"##,
        )
        .unwrap();

        let first = run(&rules(), &ScanFilter::defaults(), &dir, true).unwrap();
        assert_eq!(first.files_modified, 1);

        let second = run(&rules(), &ScanFilter::defaults(), &dir, true).unwrap();
        assert_eq!(second.files_modified, 0);
        assert_eq!(second.total_replacements, 0);
        assert!(second.reports.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn no_match_file_is_scanned_but_unreported() {
        let dir = std::env::temp_dir().join("tokenfix_no_match_test");
        let _ = std::fs::create_dir_all(&dir);

        std::fs::write(dir.join("util.ts"), "export const n = 1;\n").unwrap();

        let summary = run(&rules(), &ScanFilter::defaults(), &dir, true).unwrap();
        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.files_modified, 0);
        assert_eq!(summary.total_replacements, 0);
        assert!(summary.reports.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn single_file_root_is_processed() {
        let dir = std::env::temp_dir().join("tokenfix_single_file_test");
        let _ = std::fs::create_dir_all(&dir);
        let file = dir.join("one.tsx");
        std::fs::write(&file, "c: #4c9a4c").unwrap();

        let summary = run(&rules(), &ScanFilter::defaults(), &file, true).unwrap();
        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.files_modified, 1);
        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "c: var(--muted-foreground)"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn traversal_is_sorted_for_reproducible_reports() {
        let dir = std::env::temp_dir().join("tokenfix_sorted_test");
        let _ = std::fs::create_dir_all(dir.join("zz"));
        let _ = std::fs::create_dir_all(dir.join("aa"));

        std::fs::write(dir.join("zz").join("z.tsx"), "#13ec13").unwrap();
        std::fs::write(dir.join("aa").join("a.tsx"), "#13ec13").unwrap();
        std::fs::write(dir.join("m.tsx"), "#13ec13").unwrap();

        let summary = run(&rules(), &ScanFilter::defaults(), &dir, false).unwrap();
        let order: Vec<&str> = summary.reports.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(
            order,
            vec![
                format!("aa{}a.tsx", std::path::MAIN_SEPARATOR),
                "m.tsx".to_string(),
                format!("zz{}z.tsx", std::path::MAIN_SEPARATOR),
            ]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }
}
