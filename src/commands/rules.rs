use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use tokenfix::rules::{RuleSet, ScanFilter};

use crate::commands::CmdResult;

#[derive(Args)]
pub struct RulesArgs {}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RulesOutput {
    #[serde(rename = "normalize.rules")]
    Rules {
        contrast: Vec<ContrastSummary>,
        brand: Vec<BrandSummary>,
        context: Vec<ContextSummary>,
        literals: Vec<LiteralSummary>,
        extensions: Vec<String>,
        excluded_fragments: Vec<String>,
    },
}

#[derive(Serialize)]
pub struct ContrastSummary {
    pub label: String,
    pub replacement: String,
}

#[derive(Serialize)]
pub struct BrandSummary {
    pub variant: String,
    pub canonical: String,
}

#[derive(Serialize)]
pub struct ContextSummary {
    pub label: String,
    pub prefix: String,
    pub map: BTreeMap<String, String>,
    pub fallback: String,
}

#[derive(Serialize)]
pub struct LiteralSummary {
    pub literal: String,
    pub token: String,
}

pub fn run(_args: RulesArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<RulesOutput> {
    let rules = RuleSet::defaults();
    let filter = ScanFilter::defaults();

    Ok((
        RulesOutput::Rules {
            contrast: rules
                .contrast
                .iter()
                .map(|r| ContrastSummary {
                    label: r.label.clone(),
                    replacement: r.replacement.trim_start_matches("${1}").to_string(),
                })
                .collect(),
            brand: rules
                .brand
                .iter()
                .map(|r| BrandSummary {
                    variant: r.variant.clone(),
                    canonical: r.canonical.clone(),
                })
                .collect(),
            context: rules
                .context
                .iter()
                .map(|r| ContextSummary {
                    label: r.label.clone(),
                    prefix: r.prefix.clone(),
                    map: r.map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                    fallback: r.fallback.clone(),
                })
                .collect(),
            literals: rules
                .literals
                .iter()
                .map(|r| LiteralSummary {
                    literal: r.literal.clone(),
                    token: r.token.clone(),
                })
                .collect(),
            extensions: filter.extensions,
            excluded_fragments: filter.excluded_fragments,
        },
        0,
    ))
}
