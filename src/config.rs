use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

use crate::models::CandidateProfile;

/// Everything the pipeline needs, loaded once at startup and passed by
/// parameter. Components never read the process environment themselves.
#[derive(Debug, Clone)]
pub struct Config {
    pub hunter_api_key: String,
    pub perplexity_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub output_dir: PathBuf,
    pub candidate_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    /// Missing credentials are fatal here, before any work begins.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let hunter_api_key = env::var("HUNTER_API_KEY")
            .context("HUNTER_API_KEY must be set (email lookup credential)")?;
        let perplexity_api_key = env::var("PERPLEXITY_API_KEY").ok();
        let openrouter_api_key = env::var("OPENROUTER_API_KEY").ok();

        if perplexity_api_key.is_none() && openrouter_api_key.is_none() {
            return Err(anyhow!(
                "PERPLEXITY_API_KEY or OPENROUTER_API_KEY must be set. \
                 Add one to your environment or .env file."
            ));
        }

        let candidate_path = match env::var("SCOUT_CANDIDATE_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => Self::default_candidate_path(),
        };

        Ok(Self {
            hunter_api_key,
            perplexity_api_key,
            openrouter_api_key,
            output_dir: Self::resolve_output_dir(),
            candidate_path,
        })
    }

    /// Where reports live. Also used by the read-only commands (`list`,
    /// `show`, `browse`), which need no credentials.
    pub fn resolve_output_dir() -> PathBuf {
        if let Ok(dir) = env::var("SCOUT_OUTPUT_DIR") {
            return PathBuf::from(dir);
        }
        // XDG data directory or fallback to the working directory
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "scout") {
            proj_dirs.data_dir().join("reports")
        } else {
            PathBuf::from("reports")
        }
    }

    fn default_candidate_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "scout") {
            proj_dirs.config_dir().join("candidate.json")
        } else {
            PathBuf::from("candidate.json")
        }
    }

    /// Read the candidate data file. The file holds an array of profiles;
    /// the first entry wins. A missing or unreadable file is not an error:
    /// cover-letter personalization degrades to placeholders.
    pub fn load_candidate(&self) -> Option<CandidateProfile> {
        let raw = match std::fs::read_to_string(&self.candidate_path) {
            Ok(raw) => raw,
            Err(_) => return None,
        };
        match serde_json::from_str::<Vec<CandidateProfile>>(&raw) {
            Ok(mut profiles) if !profiles.is_empty() => Some(profiles.remove(0)),
            Ok(_) => None,
            Err(e) => {
                eprintln!(
                    "Warning: could not parse candidate file {}: {}",
                    self.candidate_path.display(),
                    e
                );
                None
            }
        }
    }
}
