use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ResearchQuery {
    pub title: String,
    pub query_text: String,
}

/// Outcome of one search call. Providers parse the shapes they know into
/// `Answer`; a 2xx body that matches no known shape is kept as `Raw` and
/// stringified at render time; a failed call degrades to `Empty`.
#[derive(Debug, Clone)]
pub enum SearchResult {
    Answer { text: String, citations: Vec<String> },
    Raw(Value),
    Empty,
}

impl SearchResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            SearchResult::Answer { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailKind {
    Generic,
    Personal,
    Unknown,
}

impl Default for EmailKind {
    fn default() -> Self {
        EmailKind::Unknown
    }
}

impl EmailKind {
    fn from_wire(raw: &str) -> Self {
        match raw {
            "generic" => EmailKind::Generic,
            "personal" => EmailKind::Personal,
            _ => EmailKind::Unknown,
        }
    }
}

// Anything the service sends that we do not recognize (including null)
// lands on Unknown instead of failing the whole response parse.
fn kind_from_wire<'de, D>(deserializer: D) -> Result<EmailKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(EmailKind::from_wire)
        .unwrap_or_default())
}

/// One address as returned by the email-discovery service. Field names
/// follow its wire format ("value" is the address itself).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(rename = "value")]
    pub address: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "kind_from_wire")]
    pub kind: EmailKind,
}

/// Buckets are not mutually exclusive except generic/named, which split on
/// `kind`. Generic and named are each capped at 3 entries, first-found order.
#[derive(Debug, Clone, Default)]
pub struct EmailClassification {
    pub career: Vec<EmailRecord>,
    pub founder: Vec<EmailRecord>,
    pub generic: Vec<EmailRecord>,
    pub named: Vec<EmailRecord>,
}

impl EmailClassification {
    pub fn is_empty(&self) -> bool {
        self.career.is_empty()
            && self.founder.is_empty()
            && self.generic.is_empty()
            && self.named.is_empty()
    }
}

/// Ordinal severity of a detected hiring-location constraint. The derived
/// ordering (none < low < medium < high) is what lets extraction escalate
/// without ever downgrading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionLevel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRestriction {
    pub has_restrictions: bool,
    pub restricted_to: Vec<String>,
    pub excluded_regions: Vec<String>,
    pub time_zone_requirement: Option<String>,
    pub restriction_level: RestrictionLevel,
    pub description: String,
    /// Filled in just before the record is persisted as a side-car.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_url: Option<String>,
}

impl Default for LocationRestriction {
    fn default() -> Self {
        Self {
            has_restrictions: false,
            restricted_to: Vec::new(),
            excluded_regions: Vec::new(),
            time_zone_requirement: None,
            restriction_level: RestrictionLevel::None,
            description: String::new(),
            company_url: None,
        }
    }
}

/// Transient verdict from the compatibility check; printed, never persisted.
#[derive(Debug, Clone)]
pub struct CompatibilityVerdict {
    pub is_compatible: bool,
    pub warning: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalInformation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub public_email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub resume: String,
    pub location: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CareerGoals {
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub ideal_roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub communication_and_strategy: Vec<String>,
    #[serde(default)]
    pub ai_and_technical: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

/// Candidate data file contents. The file holds an array of profiles; the
/// first entry wins. Absence of the file is a valid state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub personal_information: PersonalInformation,
    #[serde(default)]
    pub career_goals_and_preferences: CareerGoals,
    #[serde(default)]
    pub skills_and_expertise: Skills,
}

/// A report already on disk, parsed from its filename.
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub company: String,
    /// Filename stamp, `YYYYmmdd_HHMMSS`.
    pub timestamp: String,
    pub path: PathBuf,
}

impl SavedReport {
    pub fn display_timestamp(&self) -> String {
        chrono::NaiveDateTime::parse_from_str(&self.timestamp, "%Y%m%d_%H%M%S")
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| self.timestamp.clone())
    }
}
