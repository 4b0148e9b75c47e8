use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::models::{EmailClassification, EmailKind, EmailRecord};

// --- Domain normalization ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub name: String,
    /// False when the result has no dot left after stripping. Still usable,
    /// callers just warn about it.
    pub well_formed: bool,
}

/// Turn a URL-like or bare-domain string into a lowercase registrable
/// domain: strip scheme and `www.`, cut at the first `/`, drop trailing
/// dots. Never touches the network.
pub fn normalize_domain(website: &str) -> Option<Domain> {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut domain = trimmed.to_lowercase();

    // Treat scheme-less input as https, then strip longest prefix first
    if !domain.starts_with("https://") && !domain.starts_with("http://") {
        domain = format!("https://{}", domain);
    }
    for prefix in ["https://", "http://", "www."] {
        if let Some(rest) = domain.strip_prefix(prefix) {
            domain = rest.to_string();
        }
    }

    if let Some(idx) = domain.find('/') {
        domain.truncate(idx);
    }
    let domain = domain.trim_end_matches('.').to_string();

    if domain.is_empty() {
        return None;
    }

    let well_formed = domain.contains('.');
    Some(Domain {
        name: domain,
        well_formed,
    })
}

// --- Email discovery client ---

const DOMAIN_SEARCH_URL: &str = "https://api.hunter.io/v2/domain-search";

#[derive(Debug, Default, Deserialize)]
pub struct DomainSearchResponse {
    pub data: Option<DomainSearchData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DomainSearchData {
    #[serde(default)]
    pub emails: Vec<EmailRecord>,
}

pub struct EmailLookup {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl EmailLookup {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Look up published addresses for a domain. Limited to 10 entries per
    /// the original service quota tier.
    pub fn domain_search(&self, domain: &str) -> Result<DomainSearchResponse> {
        let response = self
            .client
            .get(DOMAIN_SEARCH_URL)
            .query(&[
                ("domain", domain),
                ("api_key", self.api_key.as_str()),
                ("limit", "10"),
            ])
            .send()
            .context("Failed to send request to email-discovery API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!(
                "Email-discovery request failed with status {}: {}",
                status,
                error_text
            ));
        }

        response
            .json()
            .context("Failed to parse email-discovery response")
    }
}

// --- Classification ---

const CAREER_KEYWORDS: &[&str] = &[
    "career",
    "recruit",
    "hr",
    "hiring",
    "talent",
    "job",
    "human resource",
];

const FOUNDER_KEYWORDS: &[&str] = &[
    "founder",
    "ceo",
    "chief executive",
    "president",
    "owner",
];

const BUCKET_CAP: usize = 3;

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// Partition discovered addresses into career / founder / generic / named
/// buckets. A record can land in career and founder at once; generic and
/// named split on the record's declared kind and are each capped at 3.
/// A missing or shapeless response yields four empty buckets.
pub fn classify_emails(response: Option<&DomainSearchResponse>) -> EmailClassification {
    let mut classification = EmailClassification::default();

    let emails = match response.and_then(|r| r.data.as_ref()) {
        Some(data) => &data.emails,
        None => return classification,
    };

    for email in emails {
        let address = email.address.to_lowercase();
        let position = email.position.as_deref().unwrap_or("").to_lowercase();
        let department = email.department.as_deref().unwrap_or("").to_lowercase();
        let first_name = email.first_name.as_deref().unwrap_or("");
        let last_name = email.last_name.as_deref().unwrap_or("");

        if contains_any(&position, CAREER_KEYWORDS)
            || contains_any(&department, CAREER_KEYWORDS)
            || contains_any(&address, CAREER_KEYWORDS)
        {
            classification.career.push(email.clone());
        }

        if contains_any(&position, FOUNDER_KEYWORDS) {
            classification.founder.push(email.clone());
        }

        if email.kind == EmailKind::Generic {
            if classification.generic.len() < BUCKET_CAP {
                classification.generic.push(email.clone());
            }
        } else if !first_name.is_empty()
            && !last_name.is_empty()
            && classification.named.len() < BUCKET_CAP
        {
            classification.named.push(email.clone());
        }
    }

    classification
}
