use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::analysis::prompts::GENERIC_ATS_PROFILE;
use crate::ats::AtsSystemProfile;
use crate::llm_client::prompts::{NO_JOB_DESCRIPTION, RESUME_CHECKER_PERSONA, SCORING_CRITERIA};

/// Placeholders filled with user-supplied text.
static USER_PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(resume_text|job_description)\}").unwrap());

/// Seniority the candidate is applying at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobLevel {
    #[default]
    EntryLevel,
    Intermediate,
    Advanced,
}

impl JobLevel {
    pub fn label(&self) -> &'static str {
        match self {
            JobLevel::EntryLevel => "Entry Level/Fresher",
            JobLevel::Intermediate => "Intermediate (2-5 years)",
            JobLevel::Advanced => "Advanced (5+ years)",
        }
    }
}

impl FromStr for JobLevel {
    type Err = String;

    /// Accepts the wire name (`entry_level`) or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [JobLevel::EntryLevel, JobLevel::Intermediate, JobLevel::Advanced]
            .into_iter()
            .find(|level| {
                s.eq_ignore_ascii_case(level.label())
                    || serde_json::to_value(level)
                        .ok()
                        .and_then(|v| v.as_str().map(|name| name.eq_ignore_ascii_case(s)))
                        .unwrap_or(false)
            })
            .ok_or_else(|| format!("unknown job level '{s}'"))
    }
}

impl fmt::Display for JobLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Role family the resume is evaluated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRole {
    #[default]
    SoftwareDevelopmentEngineer,
    DataAnalyst,
    MernStackDeveloper,
    Other,
}

impl JobRole {
    pub fn label(&self) -> &'static str {
        match self {
            JobRole::SoftwareDevelopmentEngineer => "Software Development Engineer",
            JobRole::DataAnalyst => "Data Analyst/Scientist",
            JobRole::MernStackDeveloper => "MERN Stack Developer",
            JobRole::Other => "Other",
        }
    }
}

impl FromStr for JobRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [
            JobRole::SoftwareDevelopmentEngineer,
            JobRole::DataAnalyst,
            JobRole::MernStackDeveloper,
            JobRole::Other,
        ]
        .into_iter()
        .find(|role| {
            s.eq_ignore_ascii_case(role.label())
                || serde_json::to_value(role)
                    .ok()
                    .and_then(|v| v.as_str().map(|name| name.eq_ignore_ascii_case(s)))
                    .unwrap_or(false)
        })
        .ok_or_else(|| format!("unknown job role '{s}'"))
    }
}

impl fmt::Display for JobRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive context injected into the analysis prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisMetadata {
    pub job_level: JobLevel,
    pub job_role: JobRole,
    pub ats_system_profile: Option<&'static AtsSystemProfile>,
}

/// One analysis request. Immutable once built; consumed by a single generator call.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    resume_text: String,
    job_description: String,
    prompt_template: String,
    metadata: AnalysisMetadata,
}

impl AnalysisRequest {
    pub fn new(
        resume_text: impl Into<String>,
        job_description: impl Into<String>,
        prompt_template: impl Into<String>,
        metadata: AnalysisMetadata,
    ) -> Self {
        Self {
            resume_text: resume_text.into(),
            job_description: job_description.into(),
            prompt_template: prompt_template.into(),
            metadata,
        }
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn metadata(&self) -> &AnalysisMetadata {
        &self.metadata
    }

    /// Fills every placeholder of the template. Unknown placeholders are left as-is.
    pub fn render_prompt(&self) -> String {
        let job_description = if self.job_description.trim().is_empty() {
            NO_JOB_DESCRIPTION
        } else {
            self.job_description.as_str()
        };
        let ats_profile = self
            .metadata
            .ats_system_profile
            .map(AtsSystemProfile::render_for_prompt)
            .unwrap_or_else(|| GENERIC_ATS_PROFILE.to_string());

        let template = self
            .prompt_template
            .replace("{persona}", RESUME_CHECKER_PERSONA)
            .replace("{criteria}", SCORING_CRITERIA)
            .replace("{ats_profile}", &ats_profile)
            .replace("{job_level}", self.metadata.job_level.label())
            .replace("{job_role}", self.metadata.job_role.label());

        // User text is substituted in one pass so braces inside it are never re-read.
        USER_PLACEHOLDER_RE
            .replace_all(&template, |caps: &Captures<'_>| match &caps[1] {
                "resume_text" => self.resume_text.as_str(),
                _ => job_description,
            })
            .into_owned()
    }

    /// Input parts for the generator: the resume text, then the rendered prompt.
    pub fn generator_inputs(&self) -> Vec<String> {
        vec![self.resume_text.clone(), self.render_prompt()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, RESCORE_PROMPT_TEMPLATE};
    use crate::ats::find_profile;

    #[test]
    fn test_job_level_parses_wire_name_and_label() {
        assert_eq!("intermediate".parse::<JobLevel>().unwrap(), JobLevel::Intermediate);
        assert_eq!(
            "Advanced (5+ years)".parse::<JobLevel>().unwrap(),
            JobLevel::Advanced
        );
        assert!("principal".parse::<JobLevel>().is_err());
    }

    #[test]
    fn test_job_role_parses_wire_name_and_label() {
        assert_eq!(
            "data_analyst".parse::<JobRole>().unwrap(),
            JobRole::DataAnalyst
        );
        assert_eq!(
            "MERN Stack Developer".parse::<JobRole>().unwrap(),
            JobRole::MernStackDeveloper
        );
    }

    #[test]
    fn test_analysis_prompt_has_no_unfilled_placeholders() {
        let request = AnalysisRequest::new(
            "Jane Doe — Rust engineer",
            "Build distributed systems",
            ANALYSIS_PROMPT_TEMPLATE,
            AnalysisMetadata {
                job_level: JobLevel::Advanced,
                job_role: JobRole::SoftwareDevelopmentEngineer,
                ats_system_profile: find_profile("greenhouse"),
            },
        );
        let prompt = request.render_prompt();
        for placeholder in [
            "{persona}",
            "{criteria}",
            "{ats_profile}",
            "{job_level}",
            "{job_role}",
            "{resume_text}",
            "{job_description}",
        ] {
            assert!(!prompt.contains(placeholder), "{placeholder} left in prompt");
        }
        assert!(prompt.contains("Advanced (5+ years) candidate applying for a Software Development Engineer position"));
        assert!(prompt.contains("Greenhouse: "));
        assert!(prompt.contains("Keyword match (40%)"));
        assert!(prompt.ends_with("Job description: Build distributed systems"));
    }

    #[test]
    fn test_missing_job_description_and_profile_use_fallbacks() {
        let request = AnalysisRequest::new(
            "resume",
            "   ",
            ANALYSIS_PROMPT_TEMPLATE,
            AnalysisMetadata::default(),
        );
        let prompt = request.render_prompt();
        assert!(prompt.contains(NO_JOB_DESCRIPTION));
        assert!(prompt.contains(GENERIC_ATS_PROFILE));
    }

    #[test]
    fn test_resume_braces_are_not_reinterpreted() {
        let request = AnalysisRequest::new(
            "skills: {job_role} templating",
            "jd",
            RESCORE_PROMPT_TEMPLATE,
            AnalysisMetadata::default(),
        );
        assert!(request.render_prompt().contains("skills: {job_role} templating"));
    }

    #[test]
    fn test_job_description_placeholders_are_left_literal() {
        let request = AnalysisRequest::new(
            "RESUME BODY",
            "Paste {resume_text} here",
            ANALYSIS_PROMPT_TEMPLATE,
            AnalysisMetadata::default(),
        );
        let prompt = request.render_prompt();
        assert!(prompt.contains("Paste {resume_text} here"));
        assert_eq!(prompt.matches("RESUME BODY").count(), 1);
    }

    #[test]
    fn test_generator_inputs_are_resume_then_prompt() {
        let request = AnalysisRequest::new("resume body", "jd", RESCORE_PROMPT_TEMPLATE, AnalysisMetadata::default());
        let inputs = request.generator_inputs();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0], "resume body");
        assert!(inputs[1].contains("Return ONLY the ATS score"));
    }
}
