use serde::{Deserialize, Serialize};

use crate::scoring::extractor::ScoreResult;

/// Change in ATS score after the user edits the resume, relative to the original analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "points", rename_all = "snake_case")]
pub enum ScoreDelta {
    Improved(f64),
    Decreased(f64),
    Unchanged,
}

impl ScoreDelta {
    pub fn between(original: &ScoreResult, current: &ScoreResult) -> Self {
        let diff = current.value - original.value;
        if diff > 0.0 {
            ScoreDelta::Improved(diff)
        } else if diff < 0.0 {
            ScoreDelta::Decreased(-diff)
        } else {
            ScoreDelta::Unchanged
        }
    }

    /// Feedback line shown next to the updated score.
    pub fn message(&self) -> String {
        match self {
            ScoreDelta::Improved(points) => {
                format!("Your resume score improved by {points:.1} points!")
            }
            ScoreDelta::Decreased(points) => format!(
                "Your resume score decreased by {points:.1} points. Try different changes."
            ),
            ScoreDelta::Unchanged => {
                "Your score remains the same. Try implementing more suggestions.".to_string()
            }
        }
    }
}
