// Prompt templates for the Analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Full analysis prompt template.
/// Replace: {persona}, {criteria}, {ats_profile}, {job_level}, {job_role},
///          {resume_text}, {job_description}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{persona}

INSTRUCTIONS:
{criteria}
3. Tailor expectations to a {job_level} candidate applying for a {job_role} position.

TARGET ATS SYSTEM:
{ats_profile}

ANALYSIS FORMAT:
1. ATS SCORE: Provide a single, consistent score out of 100 with one decimal place precision
2. KEY FINDINGS:
   - Identify the most important keywords found and missing in the resume
   - Evaluate the resume structure and format for ATS compatibility
   - Assess the overall match between the resume and job description
3. OPTIMIZATION SUGGESTIONS:
   - List 5 specific, actionable recommendations to improve the resume for this job
   - Suggest exact keywords to add and where to place them
   - Recommend format changes to improve ATS readability
4. SECTION-BY-SECTION ANALYSIS:
   - Briefly analyze each major section of the resume (Summary, Experience, Skills, Education)
   - Provide specific improvement suggestions for each section

Resume text: {resume_text}
Job description: {job_description}"#;

/// Score-only prompt used after the user edits the resume.
/// Replace: {persona}, {criteria}, {resume_text}, {job_description}
pub const RESCORE_PROMPT_TEMPLATE: &str = r#"{persona}

INSTRUCTIONS:
{criteria}

IMPORTANT: Return ONLY the ATS score as a number out of 100 with one decimal place precision.
Do not include any other text, explanation, or analysis.

Resume text: {resume_text}
Job description: {job_description}"#;

/// Used in place of a catalog profile when the user did not pick a target ATS.
pub const GENERIC_ATS_PROFILE: &str = "No specific ATS selected. Evaluate against common \
    ATS behaviour: plain single-column layout, standard section headings, no text in \
    images, tables or headers/footers.";
