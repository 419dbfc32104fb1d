//! Static catalog of applicant tracking systems.
//!
//! Purely descriptive: a profile is rendered into the analysis prompt so the generator
//! judges the resume against that system's known parsing behaviour. Never mutated.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtsSystemProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub key_features: &'static [&'static str],
    pub format_preferences: &'static str,
    pub parsing_quirks: &'static str,
}

impl AtsSystemProfile {
    /// Prompt paragraph describing this system.
    pub fn render_for_prompt(&self) -> String {
        format!(
            "{name}: {description}\nKey features: {features}\nFormat preferences: {format}\nParsing quirks: {quirks}",
            name = self.name,
            description = self.description,
            features = self.key_features.join("; "),
            format = self.format_preferences,
            quirks = self.parsing_quirks,
        )
    }
}

pub const ATS_PROFILES: &[AtsSystemProfile] = &[
    AtsSystemProfile {
        id: "workday",
        name: "Workday",
        description: "Enterprise HCM suite used by many Fortune 500 employers.",
        key_features: &[
            "Parses resumes into structured candidate profiles",
            "Knockout questions filter before recruiter review",
            "Keyword search over parsed fields",
        ],
        format_preferences: "Reverse-chronological .docx or text-based PDF with standard headings.",
        parsing_quirks: "Drops content in headers, footers and text boxes; multi-column layouts scramble work history.",
    },
    AtsSystemProfile {
        id: "taleo",
        name: "Oracle Taleo",
        description: "Long-established enterprise ATS with strict keyword-driven ranking.",
        key_features: &[
            "Requisition-specific keyword scoring",
            "Prescreening questionnaires",
            "Boolean recruiter search",
        ],
        format_preferences: "Plain single-column document; exact job-title and skill wording from the posting.",
        parsing_quirks: "Weak synonym handling, so abbreviations and spelled-out terms should both appear; tables often lost.",
    },
    AtsSystemProfile {
        id: "greenhouse",
        name: "Greenhouse",
        description: "Structured-hiring ATS popular with technology companies.",
        key_features: &[
            "Scorecards tied to interview plans",
            "Resume stored largely as-is for human review",
            "Light keyword filtering",
        ],
        format_preferences: "Clean PDF; readable for humans first, with quantified achievements.",
        parsing_quirks: "Parsed fields are secondary, but images and icons still drop contact details.",
    },
    AtsSystemProfile {
        id: "lever",
        name: "Lever",
        description: "Combined ATS and CRM focused on sourcing and nurturing candidates.",
        key_features: &[
            "Candidate profiles merged across applications",
            "Full-text search over resume content",
            "Tagging and pipeline stages",
        ],
        format_preferences: "Text-based PDF or .docx with skills listed explicitly.",
        parsing_quirks: "Does not rank by keyword, but search misses words embedded in graphics or unusual fonts.",
    },
    AtsSystemProfile {
        id: "icims",
        name: "iCIMS",
        description: "Talent acquisition platform common in mid-size and large enterprises.",
        key_features: &[
            "Automated resume parsing into profile fields",
            "Role-based keyword matching",
            "Candidate ranking against requisition",
        ],
        format_preferences: "Standard section headings (Experience, Education, Skills) and MM/YYYY dates.",
        parsing_quirks: "Non-standard headings leave sections unparsed; unusual date formats break tenure calculation.",
    },
    AtsSystemProfile {
        id: "successfactors",
        name: "SAP SuccessFactors",
        description: "SAP's cloud HR suite with an integrated recruiting module.",
        key_features: &[
            "Parsing into SAP candidate profiles",
            "Configurable prescreening",
            "Keyword and competency matching",
        ],
        format_preferences: ".docx or simple PDF, single column, no tables.",
        parsing_quirks: "Special characters and bullets made of symbols can corrupt parsed text.",
    },
];

/// Case-insensitive lookup by id or display name.
pub fn find_profile(key: &str) -> Option<&'static AtsSystemProfile> {
    let key = key.trim();
    ATS_PROFILES
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(key) || p.name.eq_ignore_ascii_case(key))
}
