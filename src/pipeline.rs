use anyhow::Result;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::ai::SearchProvider;
use crate::config::Config;
use crate::email::{EmailLookup, classify_emails, normalize_domain};
use crate::letter::compose_cover_letter;
use crate::location::{check_compatibility, extract_restrictions};
use crate::models::{EmailClassification, SearchResult};
use crate::report;

/// Politeness delay between successive search calls.
const QUERY_DELAY: Duration = Duration::from_secs(1);

const DESCRIPTION_LIMIT: usize = 600;

pub struct ResearchOptions {
    pub company_name: String,
    pub additional_info: Option<String>,
    pub company_url: Option<String>,
    pub interest_reason: Option<String>,
    pub want_pdf: bool,
    pub want_letter: bool,
}

pub struct RunOutcome {
    pub report_path: PathBuf,
    pub sidecar_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
}

/// One full research run: queries, heuristics, lookup, assembly,
/// persistence. Everything is sequential and blocking; individual call
/// failures degrade to "no data" and the run continues.
pub fn run_research(
    config: &Config,
    provider: &dyn SearchProvider,
    opts: &ResearchOptions,
) -> Result<RunOutcome> {
    let queries = report::plan_queries(
        &opts.company_name,
        opts.additional_info.as_deref(),
    );

    let mut results: Vec<SearchResult> = Vec::with_capacity(queries.len());
    for (i, query) in queries.iter().enumerate() {
        println!("  [{}/{}] {} ...", i + 1, queries.len(), query.title);
        match provider.search(&query.query_text) {
            Ok(result) => results.push(result),
            Err(e) => {
                eprintln!("  Warning: search failed for '{}': {:#}", query.title, e);
                results.push(SearchResult::Empty);
            }
        }
        if i + 1 < queries.len() {
            thread::sleep(QUERY_DELAY);
        }
    }

    let restriction = extract_restrictions(&results);
    println!("Location analysis: {}", restriction.description);

    let candidate = config.load_candidate();
    let verdict = check_compatibility(&restriction, candidate.as_ref());
    if !verdict.warning.is_empty() {
        println!("{}", verdict.warning);
    }

    let emails = lookup_emails(config, opts.company_url.as_deref());

    let cover_letter = if opts.want_letter && remote_friendly(&results) {
        println!("Generating cover letter...");
        Some(compose_cover_letter(
            provider,
            &opts.company_name,
            &company_description(&opts.company_name, &results),
            opts.interest_reason.as_deref().unwrap_or(""),
            candidate.as_ref(),
        ))
    } else {
        None
    };

    let now = chrono::Local::now();
    let generated_at = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let file_stamp = now.format("%Y%m%d_%H%M%S").to_string();

    let document = report::assemble_report(
        &opts.company_name,
        opts.company_url.as_deref(),
        opts.additional_info.as_deref(),
        &generated_at,
        &queries,
        &results,
        &restriction,
        emails.as_ref(),
        cover_letter.as_deref(),
    );

    let report_path =
        report::save_report(&config.output_dir, &opts.company_name, &file_stamp, &document)?;
    let sidecar_path = report::save_location_sidecar(
        &config.output_dir,
        &opts.company_name,
        &file_stamp,
        &restriction,
        opts.company_url.as_deref(),
    )?;

    let pdf_path = if opts.want_pdf {
        match report::render_pdf(&report_path) {
            Ok(path) => Some(path),
            Err(e) => {
                eprintln!("Warning: PDF rendering failed: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    Ok(RunOutcome {
        report_path,
        sidecar_path,
        pdf_path,
    })
}

/// Contact discovery needs a domain, and a domain needs a URL. Missing URL
/// disables the feature for the run; a failed lookup degrades to empty
/// buckets.
fn lookup_emails(config: &Config, company_url: Option<&str>) -> Option<EmailClassification> {
    let url = match company_url {
        Some(url) => url,
        None => {
            println!("No company URL provided; skipping email lookup.");
            return None;
        }
    };

    let domain = match normalize_domain(url) {
        Some(domain) => domain,
        None => {
            eprintln!("Warning: could not derive a domain from '{}'; skipping email lookup.", url);
            return None;
        }
    };
    if !domain.well_formed {
        eprintln!("Warning: '{}' does not look like a registrable domain.", domain.name);
    }

    println!("Looking up contact addresses for {}...", domain.name);
    let lookup = EmailLookup::new(config.hunter_api_key.clone());
    let response = match lookup.domain_search(&domain.name) {
        Ok(response) => Some(response),
        Err(e) => {
            eprintln!("  Warning: email lookup failed: {:#}", e);
            None
        }
    };

    Some(classify_emails(response.as_ref()))
}

/// Remote-friendliness gate for the cover letter. Pluggable extension
/// point; every company currently passes.
/// TODO: derive this from the remote-policy research section once the
/// extractor grows a remote/hybrid signal.
fn remote_friendly(_results: &[SearchResult]) -> bool {
    true
}

/// Short company blurb for the letter prompt, taken from the first
/// research answer (the overview query) when one exists.
fn company_description(company_name: &str, results: &[SearchResult]) -> String {
    for result in results {
        if let Some(text) = result.text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.chars().take(DESCRIPTION_LIMIT).collect();
            }
        }
    }
    format!("{} is a company being researched for remote-friendly roles.", company_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::path::PathBuf;

    struct StubProvider;

    impl SearchProvider for StubProvider {
        fn search(&self, query: &str) -> Result<SearchResult> {
            if query.contains("Remote work policies") {
                Ok(SearchResult::Answer {
                    text: "Hiring is US only with time zone overlap hours around EST.".to_string(),
                    citations: vec!["https://acme.example/careers".to_string()],
                })
            } else {
                Ok(SearchResult::Answer {
                    text: "Acme builds reusable rockets.".to_string(),
                    citations: Vec::new(),
                })
            }
        }

        fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("generation unavailable"))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn test_config(output_dir: PathBuf) -> Config {
        Config {
            hunter_api_key: "hk-test".to_string(),
            perplexity_api_key: Some("pk-test".to_string()),
            openrouter_api_key: None,
            output_dir,
            candidate_path: PathBuf::from("/nonexistent/candidate.json"),
        }
    }

    #[test]
    fn test_company_description_prefers_first_answer() {
        let results = vec![
            SearchResult::Empty,
            SearchResult::Answer {
                text: "  Acme builds rockets.  ".to_string(),
                citations: Vec::new(),
            },
        ];
        assert_eq!(company_description("Acme", &results), "Acme builds rockets.");

        let fallback = company_description("Acme", &[SearchResult::Empty]);
        assert!(fallback.starts_with("Acme is a company"));
    }

    // Full offline run: stub search results, no URL (lookup disabled), no
    // PDF. The letter body degrades to empty but the block is emitted.
    #[test]
    fn test_run_research_writes_report_and_sidecar() {
        let output_dir =
            std::env::temp_dir().join(format!("scout-pipeline-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&output_dir);

        let config = test_config(output_dir.clone());
        let opts = ResearchOptions {
            company_name: "Acme Rockets".to_string(),
            additional_info: Some("aerospace startup".to_string()),
            company_url: None,
            interest_reason: Some("launch cadence".to_string()),
            want_pdf: false,
            want_letter: true,
        };

        let outcome = run_research(&config, &StubProvider, &opts).unwrap();

        let document = std::fs::read_to_string(&outcome.report_path).unwrap();
        assert!(document.contains("# Company Research Report: Acme Rockets"));
        assert!(document.contains("Restricted to: United States"));
        assert!(document.contains("### Remote Work Policies"));
        assert!(document.contains("## Cover Letter for Acme Rockets"));
        assert!(document.contains("[Your Name]"));

        let sidecar = std::fs::read_to_string(&outcome.sidecar_path).unwrap();
        assert!(sidecar.contains("\"has_restrictions\": true"));
        assert!(sidecar.contains("\"restriction_level\": \"high\""));
        assert!(outcome.pdf_path.is_none());

        let _ = std::fs::remove_dir_all(&output_dir);
    }
}
