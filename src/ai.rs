use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::models::SearchResult;

// --- Provider trait ---

/// A web-search/LLM backend. `search` answers a research query; `complete`
/// generates free text (cover letter, subject lines). Both are blocking
/// round trips.
pub trait SearchProvider {
    fn search(&self, query: &str) -> Result<SearchResult>;
    fn complete(&self, prompt: &str) -> Result<String>;
    fn name(&self) -> &str;
}

/// Pick a provider from the configured credentials, preferring Perplexity.
pub fn create_provider(config: &Config) -> Result<Box<dyn SearchProvider>> {
    if let Some(key) = &config.perplexity_api_key {
        return Ok(Box::new(PerplexityProvider::new(key.clone())));
    }
    if let Some(key) = &config.openrouter_api_key {
        return Ok(Box::new(OpenRouterProvider::new(key.clone())));
    }
    Err(anyhow!(
        "No search provider credential configured (PERPLEXITY_API_KEY or OPENROUTER_API_KEY)"
    ))
}

/// Interpret a 2xx response body. Known shapes become `Answer`; anything
/// else is kept as `Raw` so the report can still show what came back.
pub fn parse_response_body(body: Value) -> SearchResult {
    // Perplexity search shape: { text, citations }
    if let Some(text) = body.get("text").and_then(Value::as_str) {
        let citations = body
            .get("citations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        return SearchResult::Answer {
            text: text.to_string(),
            citations,
        };
    }

    // OpenRouter chat shape: { choices: [{ message: { content } }] }
    if let Some(content) = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return SearchResult::Answer {
            text: content.to_string(),
            citations: Vec::new(),
        };
    }

    SearchResult::Raw(body)
}

// --- Perplexity provider ---

const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/search";

#[derive(Debug, Serialize)]
struct PerplexityOptions {
    include_citations: bool,
}

#[derive(Debug, Serialize)]
struct PerplexityRequest<'a> {
    query: &'a str,
    options: PerplexityOptions,
}

pub struct PerplexityProvider {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl PerplexityProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn post(&self, query: &str) -> Result<Value> {
        let request = PerplexityRequest {
            query,
            options: PerplexityOptions {
                include_citations: true,
            },
        };

        let response = self
            .client
            .post(PERPLEXITY_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .context("Failed to send request to Perplexity API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!(
                "Perplexity API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        response
            .json()
            .context("Failed to parse Perplexity API response")
    }
}

impl SearchProvider for PerplexityProvider {
    fn search(&self, query: &str) -> Result<SearchResult> {
        Ok(parse_response_body(self.post(query)?))
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        match parse_response_body(self.post(prompt)?) {
            SearchResult::Answer { text, .. } => Ok(text),
            _ => Err(anyhow!("No text in Perplexity API response")),
        }
    }

    fn name(&self) -> &str {
        "perplexity"
    }
}

// --- OpenRouter provider ---

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const OPENROUTER_MODEL: &str = "anthropic/claude-3-opus:beta";

#[derive(Debug, Serialize)]
struct OpenRouterMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: Vec<OpenRouterMessage<'a>>,
}

pub struct OpenRouterProvider {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenRouterProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn post(&self, content: &str) -> Result<Value> {
        let request = OpenRouterRequest {
            model: OPENROUTER_MODEL,
            messages: vec![OpenRouterMessage {
                role: "user",
                content,
            }],
        };

        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .context("Failed to send request to OpenRouter API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!(
                "OpenRouter API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        response
            .json()
            .context("Failed to parse OpenRouter API response")
    }
}

impl SearchProvider for OpenRouterProvider {
    fn search(&self, query: &str) -> Result<SearchResult> {
        Ok(parse_response_body(self.post(query)?))
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        match parse_response_body(self.post(prompt)?) {
            SearchResult::Answer { text, .. } => Ok(text),
            _ => Err(anyhow!("No choices in OpenRouter API response")),
        }
    }

    fn name(&self) -> &str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn config_with(perplexity: Option<&str>, openrouter: Option<&str>) -> Config {
        Config {
            hunter_api_key: "hk-test".to_string(),
            perplexity_api_key: perplexity.map(str::to_string),
            openrouter_api_key: openrouter.map(str::to_string),
            output_dir: PathBuf::from("/tmp/scout-test"),
            candidate_path: PathBuf::from("/tmp/scout-test/candidate.json"),
        }
    }

    #[test]
    fn test_parse_perplexity_shape() {
        let body = json!({
            "text": "Acme builds rockets.",
            "citations": ["https://acme.example/about", "https://news.example/acme"]
        });
        match parse_response_body(body) {
            SearchResult::Answer { text, citations } => {
                assert_eq!(text, "Acme builds rockets.");
                assert_eq!(citations.len(), 2);
                assert_eq!(citations[0], "https://acme.example/about");
            }
            other => panic!("expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_perplexity_shape_without_citations() {
        let body = json!({ "text": "Acme builds rockets." });
        match parse_response_body(body) {
            SearchResult::Answer { citations, .. } => assert!(citations.is_empty()),
            other => panic!("expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_openrouter_shape() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Acme is remote-first." } }]
        });
        match parse_response_body(body) {
            SearchResult::Answer { text, citations } => {
                assert_eq!(text, "Acme is remote-first.");
                assert!(citations.is_empty());
            }
            other => panic!("expected Answer, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_shape_is_raw() {
        let body = json!({ "status": "ok", "payload": [1, 2, 3] });
        match parse_response_body(body.clone()) {
            SearchResult::Raw(value) => assert_eq!(value, body),
            other => panic!("expected Raw, got {:?}", other),
        }
    }

    #[test]
    fn test_create_provider_prefers_perplexity() {
        let provider = create_provider(&config_with(Some("pk"), Some("or"))).unwrap();
        assert_eq!(provider.name(), "perplexity");

        let provider = create_provider(&config_with(None, Some("or"))).unwrap();
        assert_eq!(provider.name(), "openrouter");
    }

    #[test]
    fn test_create_provider_without_keys_fails() {
        assert!(create_provider(&config_with(None, None)).is_err());
    }
}
