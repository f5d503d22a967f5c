//! Rewrite rules — the immutable tables the normalization engine runs.
//!
//! Everything here is plain data built once at startup: contrast-pair fixes,
//! brand-name canonicalization, context-scoped hex substitutions, and the
//! global hex→token table. `RuleSet::defaults()` is the production table;
//! tests inject their own sets through the same constructors.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

// ============================================================================
// Rule types
// ============================================================================

/// A structural fix for a background/text utility pairing.
///
/// Matches a primary-background utility followed, within the same tag (up to
/// the next `>`), by a dark-foreground text utility, and swaps the text
/// utility for the white-text token. Brand-colored buttons must always
/// render with white text.
#[derive(Debug, Clone)]
pub struct ContrastRule {
    /// Human-readable kind, e.g. "green button with dark text".
    pub label: String,
    pub pattern: Regex,
    /// Replacement string; `${1}` re-emits everything up to the text utility.
    pub replacement: String,
}

impl ContrastRule {
    pub fn new(label: &str, pattern: &str, replacement: &str) -> Self {
        Self {
            label: label.to_string(),
            pattern: Regex::new(pattern).unwrap(),
            replacement: replacement.to_string(),
        }
    }
}

/// A known-incorrect brand spelling and its canonical form.
#[derive(Debug, Clone)]
pub struct BrandRule {
    /// The variant as users write it, e.g. "BUAME 2R".
    pub variant: String,
    pub pattern: Regex,
    pub canonical: String,
}

impl BrandRule {
    pub fn new(variant: &str, pattern: &str, canonical: &str) -> Self {
        Self {
            variant: variant.to_string(),
            pattern: Regex::new(pattern).unwrap(),
            canonical: canonical.to_string(),
        }
    }
}

/// A substitution scoped to one syntactic wrapper, e.g. `dark:bg-[#…]`.
///
/// The same hex value can play different styling roles depending on its
/// wrapper, so these rules carry their own hex→token sub-mapping. Captured
/// values missing from the map take `fallback` instead of being left alone.
#[derive(Debug, Clone)]
pub struct ContextRule {
    /// Human-readable scope, e.g. "dark-mode background".
    pub label: String,
    /// The utility prefix this rule is scoped to, e.g. "dark:bg-".
    pub prefix: String,
    pub pattern: Regex,
    pub map: HashMap<String, String>,
    pub fallback: String,
}

impl ContextRule {
    pub fn new(label: &str, prefix: &str, pairs: &[(&str, &str)], fallback: &str) -> Self {
        let pattern = Regex::new(&format!(
            r"(?i){}\[#([0-9a-f]{{6}})\]",
            regex::escape(prefix)
        ))
        .unwrap();

        Self {
            label: label.to_string(),
            prefix: prefix.to_string(),
            pattern,
            map: pairs
                .iter()
                .map(|(hex, token)| (hex.to_lowercase(), token.to_string()))
                .collect(),
            fallback: fallback.to_string(),
        }
    }

    /// Resolve a captured hex value to its canonical token.
    pub fn token_for(&self, hex: &str) -> &str {
        self.map
            .get(&hex.to_lowercase())
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

/// A bare hex literal mapped to a canonical token, replaced wherever it
/// appears (case-insensitive, embedded or not).
#[derive(Debug, Clone)]
pub struct LiteralRule {
    pub literal: String,
    pub token: String,
    pub pattern: Regex,
}

impl LiteralRule {
    pub fn new(literal: &str, token: &str) -> Self {
        Self {
            literal: literal.to_string(),
            token: token.to_string(),
            pattern: Regex::new(&format!("(?i){}", regex::escape(literal))).unwrap(),
        }
    }
}

// ============================================================================
// Rule set
// ============================================================================

/// The full ordered rule configuration for one run.
///
/// Vectors run in order; the stages themselves run contrast → brand →
/// context → literals. Context rules run before the global literal table so
/// context-scoped meanings are not clobbered by the generic mapping.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub contrast: Vec<ContrastRule>,
    pub brand: Vec<BrandRule>,
    pub context: Vec<ContextRule>,
    pub literals: Vec<LiteralRule>,
}

impl RuleSet {
    /// The production rule tables.
    pub fn defaults() -> Self {
        // Hover rule listed first so hover pairings are credited to it;
        // the base rule's lazy middle would otherwise absorb the `hover:`
        // prefix and claim the match.
        let contrast = vec![
            ContrastRule::new(
                "green button hover with dark text",
                r"(?i)(hover:bg-\[(?:#13ec13|var\(--primary\))\][^>]*?)hover:text-\[#0d1b0d\]",
                "${1}hover:text-white",
            ),
            ContrastRule::new(
                "green button with dark text",
                r"(?i)(bg-\[(?:#13ec13|var\(--primary\))\][^>]*?)text-\[#0d1b0d\]",
                "${1}text-white",
            ),
        ];

        let brand = vec![
            BrandRule::new("BUAME 2R", r"(?i)\bbuame\s+2r\b", "2RBUAME"),
            BrandRule::new("2RBUAMI", r"(?i)\b2rbuami\b", "2RBUAME"),
        ];

        let context = vec![
            // The bright green is the page background in dark mode, not the
            // action color it means everywhere else.
            ContextRule::new(
                "dark-mode background",
                "dark:bg-",
                &[
                    ("13ec13", "var(--background-dark)"),
                    ("102210", "var(--surface-dark)"),
                ],
                "var(--background-dark)",
            ),
            ContextRule::new(
                "border color",
                "border-",
                &[("cfe7cf", "var(--border)"), ("e7f3e7", "var(--border)")],
                "var(--border)",
            ),
            ContextRule::new(
                "text color",
                "text-",
                &[
                    ("0d1b0d", "var(--foreground)"),
                    ("4c9a4c", "var(--muted-foreground)"),
                    ("13ec13", "var(--primary)"),
                ],
                "var(--foreground)",
            ),
        ];

        // #13ec13 and #11d411 both collapse to var(--primary): the light and
        // base brand greens are intentionally one token.
        let literals = vec![
            LiteralRule::new("#13ec13", "var(--primary)"),
            LiteralRule::new("#11d411", "var(--primary)"),
            LiteralRule::new("#0d1b0d", "var(--foreground)"),
            LiteralRule::new("#f8fcf8", "var(--background)"),
            LiteralRule::new("#e7f3e7", "var(--surface)"),
            LiteralRule::new("#cfe7cf", "var(--border)"),
            LiteralRule::new("#4c9a4c", "var(--muted-foreground)"),
            LiteralRule::new("#102210", "var(--surface-dark)"),
        ];

        Self {
            contrast,
            brand,
            context,
            literals,
        }
    }
}

// ============================================================================
// Scan filter
// ============================================================================

/// Which files the walker hands to the rewrite pipeline.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    /// Extensions (without dot) that are eligible for rewriting.
    pub extensions: Vec<String>,
    /// Path fragments that exclude a file or directory wherever they appear.
    pub excluded_fragments: Vec<String>,
}

impl ScanFilter {
    pub fn defaults() -> Self {
        Self {
            extensions: ["js", "jsx", "ts", "tsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_fragments: [
                // dependency and VCS directories
                "node_modules",
                ".git",
                ".svn",
                ".hg",
                // build output
                "dist/",
                "build/",
                ".next",
                "coverage",
                // the tool's own directory
                "scripts/tokenfix",
                // config files and lockfiles
                "vite.config",
                "tailwind.config",
                "postcss.config",
                "eslint.config",
                "next.config",
                "package-lock",
                "yarn.lock",
                "pnpm-lock",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Check a path (file or directory) against the exclusion fragments.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/");
        self.excluded_fragments
            .iter()
            .any(|frag| normalized.contains(frag.as_str()))
    }

    /// A file is eligible iff its extension is listed and no exclusion
    /// fragment matches its path.
    pub fn is_eligible(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.extensions.iter().any(|e| e == ext) && !self.is_excluded(path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn context_rule_resolves_mapped_hex() {
        let rule = ContextRule::new(
            "text color",
            "text-",
            &[("0D1B0D", "var(--foreground)")],
            "var(--fallback)",
        );
        // Map keys and lookups are case-insensitive
        assert_eq!(rule.token_for("0d1b0d"), "var(--foreground)");
        assert_eq!(rule.token_for("0D1B0D"), "var(--foreground)");
    }

    #[test]
    fn context_rule_falls_back_for_unmapped_hex() {
        let rule = ContextRule::new("border color", "border-", &[], "var(--border)");
        assert_eq!(rule.token_for("abc123"), "var(--border)");
    }

    #[test]
    fn context_rule_pattern_requires_wrapper() {
        let rule = ContextRule::new("dark-mode background", "dark:bg-", &[], "var(--bg)");
        assert!(rule.pattern.is_match("dark:bg-[#13ec13]"));
        assert!(!rule.pattern.is_match("bg-[#13ec13]"));
        assert!(!rule.pattern.is_match("dark:bg-[var(--primary)]"));
    }

    #[test]
    fn defaults_collapse_light_and_base_green() {
        let rules = RuleSet::defaults();
        let tokens: Vec<&str> = rules
            .literals
            .iter()
            .filter(|l| l.literal == "#13ec13" || l.literal == "#11d411")
            .map(|l| l.token.as_str())
            .collect();
        assert_eq!(tokens, vec!["var(--primary)", "var(--primary)"]);
    }

    #[test]
    fn filter_accepts_source_extensions_only() {
        let filter = ScanFilter::defaults();
        assert!(filter.is_eligible(&PathBuf::from("web/src/pages/Home.tsx")));
        assert!(filter.is_eligible(&PathBuf::from("web/src/util.js")));
        assert!(!filter.is_eligible(&PathBuf::from("web/src/styles.css")));
        assert!(!filter.is_eligible(&PathBuf::from("web/src/data.json")));
    }

    #[test]
    fn filter_excludes_dependency_and_build_paths() {
        let filter = ScanFilter::defaults();
        assert!(!filter.is_eligible(&PathBuf::from("web/node_modules/react/index.js")));
        assert!(!filter.is_eligible(&PathBuf::from("web/dist/bundle.js")));
        assert!(!filter.is_eligible(&PathBuf::from("web/.next/chunk.js")));
    }

    #[test]
    fn filter_excludes_config_files_despite_extension() {
        let filter = ScanFilter::defaults();
        assert!(!filter.is_eligible(&PathBuf::from("web/vite.config.ts")));
        assert!(!filter.is_eligible(&PathBuf::from("web/tailwind.config.js")));
    }

    #[test]
    fn filter_excludes_tool_directory() {
        let filter = ScanFilter::defaults();
        assert!(!filter.is_eligible(&PathBuf::from("web/scripts/tokenfix/fix.ts")));
    }
}
