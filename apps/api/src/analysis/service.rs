//! Analysis service: full resume analysis and score-only rescoring.
//!
//! Flow (analyze): validate → render prompt → bounded generator call (analysis deadline)
//!                 → extract score → record into the session.
//! Flow (rescore): require prior analysis → validate edit → bounded call with the
//!                 score-only prompt (rescore deadline) → extract score → delta.
//!
//! The session is mutated only after the generator call succeeded.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::analysis::prompts::RESCORE_PROMPT_TEMPLATE;
use crate::analysis::request::AnalysisRequest;
use crate::errors::AppError;
use crate::llm_client::bounded::bounded_call;
use crate::llm_client::TextGenerator;
use crate::scoring::delta::ScoreDelta;
use crate::scoring::extractor::{extract_score, ScoreResult};
use crate::scoring::issues::{summarize_issues, IssueCategory};
use crate::sessions::SessionContext;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub analysis: String,
    pub score: ScoreResult,
    pub issues: Vec<IssueCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RescoreOutcome {
    pub score: ScoreResult,
    pub original_score: ScoreResult,
    pub delta: ScoreDelta,
    pub message: String,
}

/// Runs the full ATS analysis for `request` and records it in `session`.
pub async fn run_analysis(
    generator: &Arc<dyn TextGenerator>,
    session: &mut SessionContext,
    request: AnalysisRequest,
    deadline: Duration,
) -> Result<AnalysisOutcome, AppError> {
    if request.resume_text().trim().is_empty() {
        return Err(AppError::EmptyInput(
            "Resume text cannot be empty.".to_string(),
        ));
    }

    info!(
        session_id = %session.id,
        model = generator.model(),
        "Running ATS analysis"
    );
    let analysis = generate_bounded(generator, &request, deadline).await?;
    let score = extract_score(&analysis);
    let issues = summarize_issues(&analysis);
    info!(session_id = %session.id, score = %score.display, "ATS analysis complete");

    session.resume_text = Some(request.resume_text().to_string());
    session.job_description = Some(request.job_description().to_string());
    session.metadata = request.metadata().clone();
    session.analysis = Some(analysis.clone());
    session.original_score = Some(score.clone());
    session.current_score = Some(score.clone());
    if session.edited_resume.is_none() {
        session.edited_resume = Some(request.resume_text().to_string());
    }
    session.updated_at = Utc::now();

    Ok(AnalysisOutcome {
        analysis,
        score,
        issues,
    })
}

/// Re-scores the user's edited resume against the job description of the last analysis.
pub async fn rescore(
    generator: &Arc<dyn TextGenerator>,
    session: &mut SessionContext,
    edited_resume: &str,
    deadline: Duration,
) -> Result<RescoreOutcome, AppError> {
    let original_score = session
        .original_score
        .clone()
        .filter(|_| session.has_analysis())
        .ok_or_else(|| {
            AppError::Validation("Analyze a resume before requesting an updated score.".to_string())
        })?;
    if edited_resume.trim().is_empty() {
        return Err(AppError::EmptyInput(
            "Resume text cannot be empty.".to_string(),
        ));
    }

    let request = AnalysisRequest::new(
        edited_resume,
        session.job_description.clone().unwrap_or_default(),
        RESCORE_PROMPT_TEMPLATE,
        session.metadata.clone(),
    );

    info!(session_id = %session.id, "Rescoring edited resume");
    let response = generate_bounded(generator, &request, deadline).await?;
    let score = extract_score(&response);
    let delta = ScoreDelta::between(&original_score, &score);
    info!(
        session_id = %session.id,
        original = original_score.value,
        current = score.value,
        "Rescore complete"
    );

    session.current_score = Some(score.clone());
    session.edited_resume = Some(edited_resume.to_string());
    session.updated_at = Utc::now();

    Ok(RescoreOutcome {
        score,
        original_score,
        message: delta.message(),
        delta,
    })
}

async fn generate_bounded(
    generator: &Arc<dyn TextGenerator>,
    request: &AnalysisRequest,
    deadline: Duration,
) -> Result<String, AppError> {
    let generator = Arc::clone(generator);
    let inputs = request.generator_inputs();
    let text = bounded_call(deadline, move || async move { generator.generate(&inputs).await })
        .await?;
    Ok(text)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{LlmError, TextGenerator};

    /// Replays canned responses in order and records every input it receives.
    pub struct ScriptedGenerator {
        responses: Mutex<Vec<Result<String, LlmError>>>,
        pub calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedGenerator {
        pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, inputs: &[String]) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(inputs.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(LlmError::EmptyContent))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    /// Never answers.
    pub struct HangingGenerator;

    #[async_trait]
    impl TextGenerator for HangingGenerator {
        async fn generate(&self, _inputs: &[String]) -> Result<String, LlmError> {
            std::future::pending().await
        }

        fn model(&self) -> &str {
            "hanging"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{HangingGenerator, ScriptedGenerator};
    use super::*;
    use crate::analysis::prompts::ANALYSIS_PROMPT_TEMPLATE;
    use crate::analysis::request::{AnalysisMetadata, JobLevel};
    use crate::llm_client::LlmError;

    const ANALYSIS: &str = "1. ATS SCORE: 68.5/100\n2. KEY FINDINGS: Missing keywords: Kafka\n\
        3. OPTIMIZATION SUGGESTIONS: suggest adding metrics";

    fn request(resume: &str) -> AnalysisRequest {
        AnalysisRequest::new(
            resume,
            "Senior backend engineer, Kafka",
            ANALYSIS_PROMPT_TEMPLATE,
            AnalysisMetadata {
                job_level: JobLevel::Advanced,
                ..AnalysisMetadata::default()
            },
        )
    }

    #[tokio::test]
    async fn test_analysis_records_session_state() {
        let scripted = Arc::new(ScriptedGenerator::replying(&[ANALYSIS]));
        let generator: Arc<dyn TextGenerator> = scripted.clone();
        let mut session = SessionContext::new();

        let outcome = run_analysis(&generator, &mut session, request("Jane Doe resume"), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(outcome.score.value, 68.5);
        assert_eq!(outcome.score.display, "68.5/100");
        assert_eq!(outcome.issues.len(), 2);
        assert_eq!(session.analysis.as_deref(), Some(ANALYSIS));
        assert_eq!(session.original_score, Some(outcome.score.clone()));
        assert_eq!(session.current_score, Some(outcome.score));
        assert_eq!(session.edited_resume.as_deref(), Some("Jane Doe resume"));
        assert_eq!(session.metadata.job_level, JobLevel::Advanced);

        let calls = scripted.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0], "Jane Doe resume");
        assert!(calls[0][1].contains("Job description: Senior backend engineer, Kafka"));
    }

    #[tokio::test]
    async fn test_reanalysis_keeps_existing_edit() {
        let generator: Arc<dyn TextGenerator> =
            Arc::new(ScriptedGenerator::replying(&[ANALYSIS, ANALYSIS]));
        let mut session = SessionContext::new();
        run_analysis(&generator, &mut session, request("v1"), Duration::from_secs(60))
            .await
            .unwrap();
        session.edited_resume = Some("v1 with edits".to_string());

        run_analysis(&generator, &mut session, request("v2"), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(session.resume_text.as_deref(), Some("v2"));
        assert_eq!(session.edited_resume.as_deref(), Some("v1 with edits"));
    }

    #[tokio::test]
    async fn test_empty_resume_is_rejected_without_calling_generator() {
        let scripted = Arc::new(ScriptedGenerator::replying(&[ANALYSIS]));
        let generator: Arc<dyn TextGenerator> = scripted.clone();
        let mut session = SessionContext::new();

        let err = run_analysis(&generator, &mut session, request("  \n"), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyInput(_)));
        assert!(scripted.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_session_untouched() {
        let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::new(vec![Err(
            LlmError::Api {
                status: 500,
                message: "internal".to_string(),
            },
        )]));
        let mut session = SessionContext::new();

        let err = run_analysis(&generator, &mut session, request("resume"), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(!session.has_analysis());
        assert!(session.original_score.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_analysis_times_out() {
        let generator: Arc<dyn TextGenerator> = Arc::new(HangingGenerator);
        let mut session = SessionContext::new();

        let err = run_analysis(&generator, &mut session, request("resume"), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout(d) if d == Duration::from_secs(60)));
        assert!(!session.has_analysis());
    }

    #[tokio::test]
    async fn test_rescore_reports_improvement() {
        let scripted = Arc::new(ScriptedGenerator::replying(&[ANALYSIS, "74.0"]));
        let generator: Arc<dyn TextGenerator> = scripted.clone();
        let mut session = SessionContext::new();
        run_analysis(&generator, &mut session, request("resume"), Duration::from_secs(60))
            .await
            .unwrap();

        let outcome = rescore(&generator, &mut session, "resume + Kafka", Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(outcome.score.value, 74.0);
        assert_eq!(outcome.score.display, "74.0/100");
        assert_eq!(outcome.delta, ScoreDelta::Improved(5.5));
        assert_eq!(outcome.message, "Your resume score improved by 5.5 points!");
        assert_eq!(session.current_score.as_ref().unwrap().value, 74.0);
        assert_eq!(session.original_score.as_ref().unwrap().value, 68.5);
        assert_eq!(session.edited_resume.as_deref(), Some("resume + Kafka"));

        let calls = scripted.calls.lock().unwrap();
        assert!(calls[1][1].contains("Return ONLY the ATS score"));
        assert!(calls[1][1].contains("Senior backend engineer, Kafka"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescore_timeout_keeps_previous_score_and_edit() {
        let scripted: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::replying(&[ANALYSIS]));
        let mut session = SessionContext::new();
        run_analysis(&scripted, &mut session, request("resume"), Duration::from_secs(60))
            .await
            .unwrap();
        let score_before = session.current_score.clone();

        let hanging: Arc<dyn TextGenerator> = Arc::new(HangingGenerator);
        let err = rescore(&hanging, &mut session, "resume + Kafka", Duration::from_secs(30))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Timeout(d) if d == Duration::from_secs(30)));
        assert_eq!(session.current_score, score_before);
        assert_eq!(session.current_score.as_ref().unwrap().value, 68.5);
        assert_eq!(session.edited_resume.as_deref(), Some("resume"));
    }

    #[tokio::test]
    async fn test_rescore_without_analysis_is_validation_error() {
        let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::replying(&["70"]));
        let mut session = SessionContext::new();
        let err = rescore(&generator, &mut session, "edited", Duration::from_secs(30))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rescore_empty_edit_is_empty_input() {
        let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::replying(&[ANALYSIS]));
        let mut session = SessionContext::new();
        run_analysis(&generator, &mut session, request("resume"), Duration::from_secs(60))
            .await
            .unwrap();

        let err = rescore(&generator, &mut session, "   ", Duration::from_secs(30))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyInput(_)));
        assert_eq!(session.edited_resume.as_deref(), Some("resume"));
    }

    #[tokio::test]
    async fn test_unparseable_rescore_degrades_to_zero() {
        let generator: Arc<dyn TextGenerator> =
            Arc::new(ScriptedGenerator::replying(&[ANALYSIS, "I cannot score this."]));
        let mut session = SessionContext::new();
        run_analysis(&generator, &mut session, request("resume"), Duration::from_secs(60))
            .await
            .unwrap();

        let outcome = rescore(&generator, &mut session, "edited", Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(outcome.score, ScoreResult::zero());
        assert_eq!(outcome.delta, ScoreDelta::Decreased(68.5));
    }
}
