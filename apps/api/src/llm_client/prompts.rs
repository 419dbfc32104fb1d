// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file holds the pieces every ATS prompt must agree on.

/// Persona line opening every ATS prompt.
pub const RESUME_CHECKER_PERSONA: &str = "You are ResumeChecker, an expert in ATS \
    (Applicant Tracking System) analysis. Your task is to provide a consistent and accurate \
    evaluation of the resume against the job description.";

/// Weighted scoring criteria. Full analysis and score-only rescoring MUST use the same
/// weights, otherwise the delta shown after an edit is meaningless.
pub const SCORING_CRITERIA: &str = "\
1. Use a deterministic scoring algorithm that will produce the same score for the same resume and job description every time.
2. Calculate the ATS score based on the following criteria with exact weights:
   - Keyword match (40%): Presence of key skills, technologies, and qualifications from the job description
   - Resume format (20%): Proper structure, section organization, and machine readability
   - Experience relevance (25%): How well the experience matches the job requirements
   - Education match (15%): Relevance of education to the position";

/// Substituted for `{job_description}` when the user supplied none.
pub const NO_JOB_DESCRIPTION: &str = "Not provided (evaluate general ATS readiness)";
