mod ai;
mod config;
mod email;
mod letter;
mod location;
mod models;
mod pipeline;
mod report;
mod tui;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use config::Config;
use pipeline::ResearchOptions;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Company research automation - gather intel, find contacts, draft outreach")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research a company and generate a report
    Research {
        /// Company name
        company: String,

        /// Additional identifying information to disambiguate similar names
        /// (e.g. "banking startup" for Mercury)
        #[arg(short, long)]
        about: Option<String>,

        /// Company website, enables contact-address lookup
        #[arg(short, long)]
        url: Option<String>,

        /// Why you are interested, personalizes the cover letter
        #[arg(short, long)]
        why: Option<String>,

        /// Also render the report as PDF (requires pandoc)
        #[arg(long)]
        pdf: bool,

        /// Skip cover letter generation
        #[arg(long)]
        no_letter: bool,
    },

    /// List saved reports
    List,

    /// Print a saved report (most recent one for the company)
    Show {
        /// Company name
        company: String,
    },

    /// Browse saved reports interactively
    Browse,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Research {
            company,
            about,
            url,
            why,
            pdf,
            no_letter,
        } => {
            // Credentials are checked up front; nothing runs without them.
            let config = Config::from_env()?;
            let provider = ai::create_provider(&config)?;

            print_banner();
            println!("Researching {} via {}...", company, provider.name());
            if let Some(info) = &about {
                println!("Additional information provided: {}", info);
            }

            let opts = ResearchOptions {
                company_name: company.clone(),
                additional_info: about,
                company_url: url,
                interest_reason: why,
                want_pdf: pdf,
                want_letter: !no_letter,
            };

            let outcome = pipeline::run_research(&config, provider.as_ref(), &opts)?;

            println!("\n{}", "=".repeat(80));
            println!("Research completed for {}.", company);
            println!("Report saved to {}", outcome.report_path.display());
            println!("Location record saved to {}", outcome.sidecar_path.display());
            if let Some(pdf_path) = &outcome.pdf_path {
                println!("PDF saved to {}", pdf_path.display());
            }
            println!("{}", "=".repeat(80));
        }

        Commands::List => {
            let output_dir = Config::resolve_output_dir();
            let reports = report::list_reports(&output_dir)?;
            if reports.is_empty() {
                println!("No reports found in {}.", output_dir.display());
            } else {
                println!("{:<30} {:<18} FILE", "COMPANY", "GENERATED");
                println!("{}", "-".repeat(80));
                for saved in reports {
                    let file = saved
                        .path
                        .file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    println!(
                        "{:<30} {:<18} {}",
                        truncate(&saved.company, 28),
                        saved.display_timestamp(),
                        file
                    );
                }
            }
        }

        Commands::Show { company } => {
            let output_dir = Config::resolve_output_dir();
            let reports = report::list_reports(&output_dir)?;
            let needle = company.to_lowercase();
            // list is newest-first, so the first hit is the latest report
            let found = reports
                .iter()
                .find(|r| r.company.to_lowercase().contains(&needle))
                .ok_or_else(|| anyhow!("No report found for '{}'", company))?;

            let body = std::fs::read_to_string(&found.path)?;
            println!("{}", body);
        }

        Commands::Browse => {
            let output_dir = Config::resolve_output_dir();
            tui::run_browse(&output_dir)?;
        }
    }

    Ok(())
}

fn print_banner() {
    println!("\n{}", "=".repeat(80));
    println!("{:^80}", "COMPANY RESEARCH");
    println!("{}", "=".repeat(80));
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
