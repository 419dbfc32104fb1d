//! Score Extractor: recovers a 0–100 ATS score from free-form analysis text.
//!
//! The generator's output is non-deterministic natural language, so no single pattern
//! finds the score reliably. Instead an ordered cascade of independent matchers runs from
//! most trustworthy to most permissive; the first hit wins:
//!
//! 1. `heading_block`  : "ATS SCORE" label alone on its line, score on the next line
//! 2. `labeled_line`   : "ATS SCORE: N..." on one line, whole remainder kept as display
//! 3. `generic_pattern`: "SCORE: N", then "N/100", then a bare number on its own line
//! 4. `first_in_range` : first numeric token anywhere in the text lying in [0, 100]
//!
//! Nothing found → `{0, "0/100"}`. Extraction never fails.
//!
//! Candidates outside [0, 100] are rejected at every tier and scanning continues.
//! A `-` directly after a letter or digit ("2-4 years") is a separator, not a sign.

use once_cell::sync::Lazy;
use regex::{Match, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

static HEADING_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?(?:\d+\.[ \t]*)?(?:\*\*|__)?[ \t]*\bATS[ \t]+SCORE[ \t]*:?[ \t]*(?:\*\*|__)?[ \t]*:?[ \t]*\r?\n(?:[ \t]*\r?\n)*[ \t]*(?:\*\*|__)?[ \t]*(-?\d+(?:\.\d+)?[^\r\n]*)",
    )
    .unwrap()
});

/// Label followed directly by the score, allowing a colon and bold markers in between.
static LABELED_SCORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bATS[ \t]+SCORE[ \t]*(?:\*\*|__)?[ \t]*:?[ \t]*(?:\*\*|__)?[ \t]*(-?\d+(?:\.\d+)?[^\r\n]*)",
    )
    .unwrap()
});

static LABELED_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bATS[ \t]+SCORE[ \t]*:?[ \t]*([^\r\n]*)").unwrap());

/// Generic fallbacks, in priority order.
static GENERIC_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\bSCORE[ \t]*:[ \t]*(-?\d+(?:\.\d+)?)").unwrap(),
        Regex::new(r"(-?\d+(?:\.\d+)?)[ \t]*/[ \t]*100\b").unwrap(),
        Regex::new(r"(?m)^[ \t]*(-?\d+(?:\.\d+)?)[ \t]*$").unwrap(),
    ]
});

/// A score recovered from analysis text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Normalized score in [0, 100].
    pub value: f64,
    /// Best human-readable form: the generator's own text where available,
    /// otherwise a synthesized `"N/100"`. Never empty.
    pub display: String,
}

impl ScoreResult {
    /// The degraded result used when no score can be found.
    pub fn zero() -> Self {
        Self {
            value: 0.0,
            display: "0/100".to_string(),
        }
    }

    fn synthesized(token: &NumericToken<'_>) -> Self {
        Self {
            value: token.value,
            display: format!("{}/100", token.text),
        }
    }
}

/// Which tier of the cascade produced a score. Logged for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    HeadingBlock,
    LabeledLine,
    GenericPattern,
    FirstInRange,
}

type Matcher = fn(&str) -> Option<ScoreResult>;

const CASCADE: &[(MatchTier, Matcher)] = &[
    (MatchTier::HeadingBlock, heading_block),
    (MatchTier::LabeledLine, labeled_line),
    (MatchTier::GenericPattern, generic_pattern),
    (MatchTier::FirstInRange, first_in_range),
];

/// Extracts the ATS score from analysis text. Pure and infallible.
pub fn extract_score(text: &str) -> ScoreResult {
    match extract_score_with_tier(text) {
        Some((tier, score)) => {
            debug!(?tier, value = score.value, display = %score.display, "ATS score extracted");
            score
        }
        None => {
            warn!("No ATS score found in analysis text; defaulting to 0/100");
            ScoreResult::zero()
        }
    }
}

/// Runs the cascade and reports which tier matched, or `None` when nothing did.
pub fn extract_score_with_tier(text: &str) -> Option<(MatchTier, ScoreResult)> {
    CASCADE
        .iter()
        .find_map(|(tier, matcher)| matcher(text).map(|score| (*tier, score)))
}

// ────────────────────────────────────────────────────────────────────────────
// Tiers
// ────────────────────────────────────────────────────────────────────────────

/// Tier 1: a label-only "ATS SCORE" line (markdown heading, bold, or list item)
/// immediately followed by a line that starts with the score.
pub fn heading_block(text: &str) -> Option<ScoreResult> {
    HEADING_BLOCK_RE.captures_iter(text).find_map(|caps| {
        let line = caps.get(1)?;
        let token = first_token(text, line)?;
        accept(&token)?;
        Some(ScoreResult {
            value: token.value,
            display: clean_display(line.as_str()),
        })
    })
}

/// Tier 2: "ATS SCORE" followed by text up to the line break, kept whole as the display.
///
/// Lines where the score follows the label directly are tried first. Only when no such
/// line exists does the first number anywhere after a label count, so prose mentioning
/// "the ATS score" cannot shadow the real score line.
pub fn labeled_line(text: &str) -> Option<ScoreResult> {
    if LABELED_SCORE_RE.is_match(text) {
        return LABELED_SCORE_RE
            .captures_iter(text)
            .find_map(|caps| labeled_score(text, caps.get(1)?));
    }
    LABELED_LINE_RE
        .captures_iter(text)
        .find_map(|caps| labeled_score(text, caps.get(1)?))
}

fn labeled_score<'a>(text: &'a str, rest: Match<'a>) -> Option<ScoreResult> {
    let token = first_token(text, rest)?;
    accept(&token)?;
    let display = clean_display(rest.as_str());
    Some(ScoreResult {
        value: token.value,
        display: if display.is_empty() {
            format!("{}/100", token.text)
        } else {
            display
        },
    })
}

/// Tier 3: "SCORE: N", then "N/100", then a bare number alone on a line.
pub fn generic_pattern(text: &str) -> Option<ScoreResult> {
    GENERIC_RES.iter().find_map(|re| {
        re.captures_iter(text).find_map(|caps| {
            let token = parse_token(text, caps.get(1)?)?;
            accept(&token)?;
            Some(ScoreResult::synthesized(&token))
        })
    })
}

/// Tier 4: the first numeric token anywhere in the text that lies in [0, 100].
///
/// Deliberately naive: years of experience or percentages earlier in the text win.
pub fn first_in_range(text: &str) -> Option<ScoreResult> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| parse_token(text, m))
        .find(|token| accept(token).is_some())
        .map(|token| ScoreResult::synthesized(&token))
}

// ────────────────────────────────────────────────────────────────────────────
// Numeric tokens
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct NumericToken<'a> {
    value: f64,
    text: &'a str,
}

/// Interprets a numeric regex match found in `haystack`, applying the separator rule.
fn parse_token<'a>(haystack: &'a str, m: Match<'a>) -> Option<NumericToken<'a>> {
    let mut text = m.as_str();
    if let Some(unsigned) = text.strip_prefix('-') {
        let joined_to_word = haystack[..m.start()]
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric);
        if joined_to_word {
            text = unsigned;
        }
    }
    let value = text.parse::<f64>().ok()?;
    Some(NumericToken { value, text })
}

/// First numeric token inside `span`, which is itself a match within `haystack`.
fn first_token<'a>(haystack: &'a str, span: Match<'a>) -> Option<NumericToken<'a>> {
    let m = NUMBER_RE.find_at(haystack, span.start())?;
    if m.start() >= span.end() {
        return None;
    }
    parse_token(haystack, m)
}

fn accept(token: &NumericToken<'_>) -> Option<()> {
    (token.value.is_finite() && (0.0..=100.0).contains(&token.value)).then_some(())
}

/// Trims whitespace and markdown emphasis wrapped around a captured display segment.
fn clean_display(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
        .to_string()
}
