//! Generated case-page content.
//!
//! Pages are written by a hosted model through an OpenAI-compatible
//! chat-completions endpoint, asked to answer with a single JSON object.

use std::fmt;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};

/// Fields the model leaves out come back empty rather than failing the page.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseContent {
    pub name: String,
    pub citation: String,
    #[serde(deserialize_with = "lenient_year")]
    pub year: i32,
    pub court: String,
    pub judges: Vec<String>,
    pub summary: String,
    pub facts: String,
    pub issues: Vec<String>,
    pub holding: String,
    pub ratio: String,
    pub impact: String,
    pub related_cases: Vec<String>,
    pub topics: Vec<String>,
}

/// Accepts `1986` or `"1986"`; anything else reads as 0.
fn lenient_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Number(i32),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Year::deserialize(deserializer)? {
        Year::Number(year) => year,
        Year::Text(text) => text.trim().parse().unwrap_or(0),
        Year::Other(_) => 0,
    })
}

#[derive(Debug)]
pub enum CaseError {
    /// No API key configured.
    Config(String),
    Network(String),
    Api { status: u16, message: String },
    Parse(String),
    /// The model returned no content.
    Empty,
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseError::Config(msg) => write!(f, "config error: {msg}"),
            CaseError::Network(msg) => write!(f, "network error: {msg}"),
            CaseError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            CaseError::Parse(msg) => write!(f, "parse error: {msg}"),
            CaseError::Empty => write!(f, "no content generated"),
        }
    }
}

impl std::error::Error for CaseError {}

#[async_trait]
pub trait CaseGenerator: Send + Sync {
    async fn generate(&self, case_name: &str) -> Result<CaseContent, CaseError>;
}

const SYSTEM_PROMPT: &str =
    "You are an expert legal researcher specializing in Canadian Supreme Court cases.";

pub fn content_prompt(case_name: &str) -> String {
    format!(
        r#"You are a legal research expert. Generate comprehensive SEO-optimized content for the Supreme Court of Canada case: {case_name}

Provide the following in JSON format:
{{
  "name": "Full case name",
  "citation": "Neutral citation (e.g., [1986] 1 SCR 103)",
  "year": year as number,
  "court": "Supreme Court of Canada",
  "judges": ["List of judges who heard the case"],
  "summary": "One paragraph (100-150 words) clear summary of the case and its significance",
  "facts": "2-3 paragraphs describing the factual background",
  "issues": ["Array of key legal issues raised"],
  "holding": "2 paragraphs on what the court decided",
  "ratio": "2-3 paragraphs explaining the ratio decidendi (binding legal principle)",
  "impact": "2 paragraphs on the case's legal impact and subsequent application",
  "relatedCases": ["Array of 5-7 related case names"],
  "topics": ["Array of legal topics/areas, e.g., 'Charter Rights', 'Criminal Law', 'Constitutional Law'"]
}}

Make the content:
- Accurate and authoritative
- Clear and accessible to lawyers
- SEO-optimized with natural keyword usage
- Comprehensive but readable
- Focused on practical legal application"#
    )
}

// ── Wire types ──

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiCaseGenerator {
    api_key: Option<String>,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCaseGenerator {
    pub fn new(api_key: Option<String>, base_url: String, model: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CaseGenerator for OpenAiCaseGenerator {
    async fn generate(&self, case_name: &str) -> Result<CaseContent, CaseError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CaseError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let prompt = content_prompt(case_name);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.3,
        };

        let url = format!("{}/chat/completions", self.base_url);
        info!("Generating case content for '{}' with {}", case_name, self.model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CaseError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Case generation failed: {} - {}", status, message);
            return Err(CaseError::Api { status, message });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| CaseError::Parse(format!("completion response: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(CaseError::Empty)?;

        serde_json::from_str(&content).map_err(|e| CaseError::Parse(format!("case content: {e}")))
    }
}
