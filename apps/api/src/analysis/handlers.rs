//! Axum route handlers for sessions, analysis and rescoring.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::analysis::prompts::ANALYSIS_PROMPT_TEMPLATE;
use crate::analysis::request::{AnalysisMetadata, AnalysisRequest, JobLevel, JobRole};
use crate::analysis::service::{rescore, run_analysis};
use crate::ats::find_profile;
use crate::documents::extract_text_blocking;
use crate::errors::AppError;
use crate::scoring::delta::ScoreDelta;
use crate::scoring::extractor::ScoreResult;
use crate::scoring::issues::IssueCategory;
use crate::sessions::{SaveOutcome, SessionContext};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub session_id: Uuid,
    pub analysis: String,
    pub score: ScoreResult,
    pub issues: Vec<IssueCategory>,
}

#[derive(Debug, Deserialize)]
pub struct RescoreRequest {
    pub edited_resume: String,
}

#[derive(Debug, Serialize)]
pub struct RescoreResponse {
    pub session_id: Uuid,
    pub score: ScoreResult,
    pub original_score: ScoreResult,
    pub delta: ScoreDelta,
    pub message: String,
}

/// Fields of the multipart analyze form.
#[derive(Debug, Default)]
struct AnalyzeForm {
    resume: Option<Bytes>,
    job_description: String,
    job_level: Option<String>,
    job_role: Option<String>,
    ats_system: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionContext>) {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionContext>, AppError> {
    let session = state.sessions.get(id).await.ok_or_else(|| session_not_found(id))?;
    Ok(Json(session))
}

/// DELETE /api/v1/sessions/:id
///
/// Explicit reset: drops the analysis, scores and edits held for the session.
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/analyze
///
/// Multipart form: `resume` (PDF file, required), `job_description`, `job_level`,
/// `job_role`, `ats_system` (all optional).
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut session = state.sessions.get(id).await.ok_or_else(|| session_not_found(id))?;

    let form = read_analyze_form(multipart).await?;
    let metadata = parse_metadata(&form)?;
    let resume = form
        .resume
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("Please upload a resume to analyze.".to_string()))?;

    let resume_text = extract_text_blocking(state.documents.clone(), resume).await?;
    let request = AnalysisRequest::new(
        resume_text,
        form.job_description,
        ANALYSIS_PROMPT_TEMPLATE,
        metadata,
    );

    let outcome = run_analysis(
        &state.generator,
        &mut session,
        request,
        state.config.analysis_timeout,
    )
    .await?;

    write_back(&state, session, "analysis").await?;

    Ok(Json(AnalyzeResponse {
        session_id: id,
        analysis: outcome.analysis,
        score: outcome.score,
        issues: outcome.issues,
    }))
}

/// POST /api/v1/sessions/:id/rescore
pub async fn handle_rescore(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RescoreRequest>,
) -> Result<Json<RescoreResponse>, AppError> {
    let mut session = state.sessions.get(id).await.ok_or_else(|| session_not_found(id))?;

    let outcome = rescore(
        &state.generator,
        &mut session,
        &req.edited_resume,
        state.config.rescore_timeout,
    )
    .await?;

    write_back(&state, session, "rescore").await?;

    Ok(Json(RescoreResponse {
        session_id: id,
        score: outcome.score,
        original_score: outcome.original_score,
        delta: outcome.delta,
        message: outcome.message,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

async fn write_back(state: &AppState, session: SessionContext, action: &str) -> Result<(), AppError> {
    let id = session.id;
    match state.sessions.save(session).await {
        SaveOutcome::Saved => Ok(()),
        SaveOutcome::Missing => {
            warn!(session_id = %id, "Session reset while {action} was running; result discarded");
            Err(session_not_found(id))
        }
        SaveOutcome::Stale => {
            warn!(session_id = %id, "Session changed while {action} was running; result discarded");
            Err(AppError::Conflict(format!(
                "Session {id} was updated by another request. Please retry."
            )))
        }
    }
}

async fn read_analyze_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                form.resume = Some(field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read resume upload: {e}"))
                })?);
            }
            "job_description" | "job_level" | "job_role" | "ats_system" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
                match name.as_str() {
                    "job_description" => form.job_description = value,
                    "job_level" => form.job_level = non_blank(value),
                    "job_role" => form.job_role = non_blank(value),
                    _ => form.ats_system = non_blank(value),
                }
            }
            other => warn!("Ignoring unknown multipart field '{other}'"),
        }
    }

    Ok(form)
}

fn parse_metadata(form: &AnalyzeForm) -> Result<AnalysisMetadata, AppError> {
    let job_level = form
        .job_level
        .as_deref()
        .map(str::parse::<JobLevel>)
        .transpose()
        .map_err(AppError::Validation)?
        .unwrap_or_default();
    let job_role = form
        .job_role
        .as_deref()
        .map(str::parse::<JobRole>)
        .transpose()
        .map_err(AppError::Validation)?
        .unwrap_or_default();
    let ats_system_profile = match form.ats_system.as_deref() {
        Some(key) => Some(
            find_profile(key)
                .ok_or_else(|| AppError::Validation(format!("unknown ATS system '{key}'")))?,
        ),
        None => None,
    };

    Ok(AnalysisMetadata {
        job_level,
        job_role,
        ats_system_profile,
    })
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
