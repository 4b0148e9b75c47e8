use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::models::{
    EmailClassification, EmailRecord, LocationRestriction, ResearchQuery, SavedReport,
    SearchResult,
};

// --- Query planning ---

const QUERY_PLAN: &[(&str, &str)] = &[
    (
        "Company Overview",
        "Detailed company information for {subject} including size, headquarters, founding date, and description",
    ),
    (
        "Remote Work Policies",
        "Remote work policies and culture at {subject}, including location restrictions and time zone expectations",
    ),
    (
        "Leadership and Funding",
        "Leadership team and funding history of {subject}, including VCs and backers",
    ),
    (
        "Career Opportunities",
        "Career opportunities and hiring process at {subject}, including salary transparency and compensation strategy",
    ),
    (
        "Company Culture and Values",
        "Company values, mission, and culture at {subject}, especially regarding remote work",
    ),
    (
        "Market Positioning",
        "Competitors of {subject} and how they compare in terms of remote work policies",
    ),
    (
        "Company Reputation",
        "Any controversies or red flags related to {subject}, especially regarding treatment of employees",
    ),
];

/// The fixed, ordered set of research questions for one run. Ordering
/// determines report section order.
pub fn plan_queries(company_name: &str, additional_info: Option<&str>) -> Vec<ResearchQuery> {
    let subject = match additional_info {
        Some(info) if !info.trim().is_empty() => format!("{} {}", company_name, info.trim()),
        _ => company_name.to_string(),
    };

    QUERY_PLAN
        .iter()
        .map(|(title, template)| ResearchQuery {
            title: title.to_string(),
            query_text: template.replace("{subject}", &subject),
        })
        .collect()
}

// --- Assembly ---

fn render_email_entry(email: &EmailRecord) -> String {
    let name = match (email.first_name.as_deref(), email.last_name.as_deref()) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.to_string(),
        (None, Some(last)) => last.to_string(),
        (None, None) => String::new(),
    };

    let mut details: Vec<String> = Vec::new();
    if !name.trim().is_empty() {
        details.push(name.trim().to_string());
    }
    if let Some(position) = email.position.as_deref() {
        if !position.trim().is_empty() {
            details.push(position.trim().to_string());
        }
    }

    if details.is_empty() {
        format!("- {}", email.address)
    } else {
        format!("- {} ({})", email.address, details.join(", "))
    }
}

fn push_email_bucket(out: &mut String, label: &str, bucket: &[EmailRecord]) {
    if bucket.is_empty() {
        return;
    }
    out.push_str(&format!("**{}:**\n\n", label));
    for email in bucket {
        out.push_str(&render_email_entry(email));
        out.push('\n');
    }
    out.push('\n');
}

/// Assemble the complete report document. Pure string assembly; queries
/// and results are paired positionally.
pub fn assemble_report(
    company_name: &str,
    company_url: Option<&str>,
    additional_info: Option<&str>,
    generated_at: &str,
    queries: &[ResearchQuery],
    results: &[SearchResult],
    restriction: &LocationRestriction,
    emails: Option<&EmailClassification>,
    cover_letter: Option<&str>,
) -> String {
    let mut report = String::new();

    report.push_str(&format!("# Company Research Report: {}\n\n", company_name));
    report.push_str(&format!("Generated: {}\n", generated_at));
    if let Some(info) = additional_info {
        if !info.trim().is_empty() {
            report.push_str(&format!("Additional context: {}\n", info.trim()));
        }
    }
    if let Some(url) = company_url {
        report.push_str(&format!("Website: {}\n", url));
    }
    report.push('\n');

    report.push_str("## Location Restrictions\n\n");
    report.push_str(&restriction.description);
    report.push_str("\n\n");

    if let Some(emails) = emails {
        if !emails.is_empty() {
            report.push_str("## Contact Information\n\n");
            push_email_bucket(&mut report, "Career-related emails", &emails.career);
            push_email_bucket(&mut report, "Founder and executive emails", &emails.founder);
            push_email_bucket(&mut report, "Generic addresses", &emails.generic);
            push_email_bucket(&mut report, "Named contacts", &emails.named);
        }
    }

    report.push_str("## Research Findings\n\n");
    for (query, result) in queries.iter().zip(results.iter()) {
        report.push_str(&format!("### {}\n\n", query.title));
        match result {
            SearchResult::Answer { text, citations } => {
                report.push_str(text.trim());
                report.push('\n');
                if !citations.is_empty() {
                    report.push_str("\nSources:\n");
                    for citation in citations {
                        report.push_str(&format!("- {}\n", citation));
                    }
                }
            }
            SearchResult::Raw(value) => {
                // unknown response shape: keep what came back, verbatim
                report.push_str(&value.to_string());
                report.push('\n');
            }
            SearchResult::Empty => {
                report.push_str("_No data returned for this query._\n");
            }
        }
        report.push('\n');
    }

    if let Some(letter) = cover_letter {
        report.push_str(letter);
    }

    report
}

// --- Persistence ---

/// Keep alphanumerics, hyphens and underscores; spaces become underscores,
/// everything else is dropped.
pub fn sanitize_company_name(name: &str) -> String {
    name.chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c == ' ' {
                Some('_')
            } else {
                None
            }
        })
        .collect()
}

pub fn report_filename(company_name: &str, timestamp: &str) -> String {
    format!("{}_{}.md", sanitize_company_name(company_name), timestamp)
}

pub fn save_report(output_dir: &Path, company_name: &str, timestamp: &str, report: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
    let path = output_dir.join(report_filename(company_name, timestamp));
    std::fs::write(&path, report)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(path)
}

/// JSON side-car with the location-restriction record, tagged with the
/// company URL when one was supplied.
pub fn save_location_sidecar(
    output_dir: &Path,
    company_name: &str,
    timestamp: &str,
    restriction: &LocationRestriction,
    company_url: Option<&str>,
) -> Result<PathBuf> {
    let mut record = restriction.clone();
    record.company_url = company_url.map(str::to_string);

    let path = output_dir.join(format!(
        "{}_{}_location.json",
        sanitize_company_name(company_name),
        timestamp
    ));
    let json = serde_json::to_string_pretty(&record)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write side-car to {}", path.display()))?;
    Ok(path)
}

/// Best-effort PDF rendering via pandoc. Callers log the error and carry
/// on; the markdown report is the artifact of record.
pub fn render_pdf(report_path: &Path) -> Result<PathBuf> {
    let pdf_path = report_path.with_extension("pdf");
    let output = Command::new("pandoc")
        .arg(report_path)
        .arg("-o")
        .arg(&pdf_path)
        .output()
        .context("Failed to run 'pandoc'. Install pandoc for PDF output.")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("pandoc failed: {}", stderr));
    }

    Ok(pdf_path)
}

// --- Saved reports ---

/// Scan the output directory for saved reports. Filenames follow
/// `<sanitized-name>_<YYYYmmdd>_<HHMMSS>.md`; anything else is ignored.
pub fn list_reports(output_dir: &Path) -> Result<Vec<SavedReport>> {
    let mut reports = Vec::new();

    let entries = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(reports),
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some((company, timestamp)) = split_report_stem(stem) {
            reports.push(SavedReport {
                company,
                timestamp,
                path,
            });
        }
    }

    // newest first
    reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.company.cmp(&b.company)));
    Ok(reports)
}

fn split_report_stem(stem: &str) -> Option<(String, String)> {
    // Expect <name>_<8 digit date>_<6 digit time>
    let (rest, time) = stem.rsplit_once('_')?;
    let (name, date) = rest.rsplit_once('_')?;
    if time.len() != 6 || !time.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if name.is_empty() {
        return None;
    }
    Some((name.replace('_', " "), format!("{}_{}", date, time)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmailKind, RestrictionLevel};
    use serde_json::json;

    #[test]
    fn test_plan_queries_titles_and_order() {
        let queries = plan_queries("Acme", None);
        assert_eq!(queries.len(), 7);
        let titles: Vec<&str> = queries.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Company Overview",
                "Remote Work Policies",
                "Leadership and Funding",
                "Career Opportunities",
                "Company Culture and Values",
                "Market Positioning",
                "Company Reputation",
            ]
        );
        for query in &queries {
            assert!(query.query_text.contains("Acme"));
        }
    }

    #[test]
    fn test_plan_queries_interpolates_additional_info() {
        let queries = plan_queries("Mercury", Some("banking startup"));
        assert!(queries[0].query_text.contains("Mercury banking startup"));

        let without = plan_queries("Mercury", Some("  "));
        assert!(without[0].query_text.contains("Mercury including"));
    }

    #[test]
    fn test_assemble_report_pairs_results_positionally() {
        let queries = vec![
            ResearchQuery {
                title: "Company Overview".to_string(),
                query_text: "q1".to_string(),
            },
            ResearchQuery {
                title: "Remote Work Policies".to_string(),
                query_text: "q2".to_string(),
            },
            ResearchQuery {
                title: "Leadership and Funding".to_string(),
                query_text: "q3".to_string(),
            },
        ];
        let results = vec![
            // plain text-with-citations shape
            SearchResult::Answer {
                text: "Acme builds rockets.".to_string(),
                citations: vec!["https://acme.example".to_string()],
            },
            // chat-completions shape, as it arrives off the wire
            crate::ai::parse_response_body(json!({
                "choices": [{"message": {"role": "assistant", "content": "Fully remote."}}]
            })),
            // a body matching neither shape is stringified as-is
            SearchResult::Raw(json!({"status": "throttled"})),
        ];
        let restriction = LocationRestriction::default();

        let report = assemble_report(
            "Acme",
            Some("https://acme.example"),
            None,
            "2026-08-06 12:00:00",
            &queries,
            &results,
            &restriction,
            None,
            None,
        );

        let overview_idx = report.find("### Company Overview").unwrap();
        let remote_idx = report.find("### Remote Work Policies").unwrap();
        assert!(overview_idx < remote_idx);
        assert!(report.contains("Acme builds rockets."));
        assert!(report.contains("- https://acme.example"));
        assert!(report.contains("Fully remote."));
        assert!(report.contains("{\"status\":\"throttled\"}"));
    }

    #[test]
    fn test_assemble_report_renders_contact_buckets() {
        let classification = EmailClassification {
            career: vec![EmailRecord {
                address: "jobs@acme.io".to_string(),
                first_name: None,
                last_name: None,
                position: None,
                department: None,
                kind: EmailKind::Generic,
            }],
            founder: vec![EmailRecord {
                address: "jane@acme.io".to_string(),
                first_name: Some("Jane".to_string()),
                last_name: Some("Doe".to_string()),
                position: Some("CEO".to_string()),
                department: None,
                kind: EmailKind::Personal,
            }],
            generic: Vec::new(),
            named: Vec::new(),
        };
        let restriction = LocationRestriction {
            has_restrictions: true,
            restricted_to: vec!["United States".to_string()],
            restriction_level: RestrictionLevel::High,
            description: "Restricted to: United States".to_string(),
            ..Default::default()
        };

        let report = assemble_report(
            "Acme",
            None,
            Some("rocket startup"),
            "2026-08-06 12:00:00",
            &[],
            &[],
            &restriction,
            Some(&classification),
            Some("## Cover Letter for Acme\n"),
        );

        assert!(report.contains("Additional context: rocket startup"));
        assert!(report.contains("Restricted to: United States"));
        // graceful omission of missing name parts
        assert!(report.contains("- jobs@acme.io\n"));
        assert!(report.contains("- jane@acme.io (Jane Doe, CEO)"));
        assert!(report.contains("**Founder and executive emails:**"));
        assert!(!report.contains("**Generic addresses:**"));
        assert!(report.ends_with("## Cover Letter for Acme\n"));
    }

    #[test]
    fn test_assemble_report_empty_result_notes_no_data() {
        let queries = plan_queries("Acme", None);
        let results = vec![SearchResult::Empty; 7];
        let report = assemble_report(
            "Acme",
            None,
            None,
            "2026-08-06 12:00:00",
            &queries,
            &results,
            &LocationRestriction::default(),
            None,
            None,
        );
        assert_eq!(report.matches("_No data returned for this query._").count(), 7);
    }

    #[test]
    fn test_sanitize_company_name() {
        assert_eq!(sanitize_company_name("Acme Rockets"), "Acme_Rockets");
        assert_eq!(sanitize_company_name("Acme, Inc."), "Acme_Inc");
        assert_eq!(sanitize_company_name("foo-bar_baz"), "foo-bar_baz");
    }

    #[test]
    fn test_split_report_stem() {
        let (company, timestamp) = split_report_stem("Acme_Rockets_20260806_120000").unwrap();
        assert_eq!(company, "Acme Rockets");
        assert_eq!(timestamp, "20260806_120000");

        assert!(split_report_stem("notes").is_none());
        assert!(split_report_stem("Acme_2026_120000").is_none());
        assert!(split_report_stem("_20260806_120000").is_none());
    }
}
