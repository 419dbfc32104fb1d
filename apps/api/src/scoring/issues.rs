use serde::{Deserialize, Serialize};

/// A category of problems the analysis mentions, with how many were flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCategory {
    pub name: String,
    pub count: u32,
}

const CATEGORY_TRIGGERS: &[(&str, &[&str])] = &[
    ("Keyword Match", &["missing keywords"]),
    ("Format Issues", &["format"]),
    ("Content Suggestions", &["suggest", "recommendation"]),
];

/// Coarse issue tally from keyword presence in the analysis text.
/// Categories with no hits are omitted.
pub fn summarize_issues(analysis: &str) -> Vec<IssueCategory> {
    let lower = analysis.to_lowercase();
    CATEGORY_TRIGGERS
        .iter()
        .filter(|(_, triggers)| triggers.iter().any(|t| lower.contains(t)))
        .map(|(name, _)| IssueCategory {
            name: (*name).to_string(),
            count: 1,
        })
        .collect()
}
