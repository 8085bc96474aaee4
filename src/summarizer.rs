//! Client for the generative-text service that writes the summaries.
//!
//! One blocking `generateContent` call per summary, no retries. The model is
//! asked for JSON matching [`SummaryDocument`]; anything else is an error.

use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::document::{SummaryDocument, Verbosity};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {message}")]
    RequestFailed { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("could not parse model reply: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can turn raw text into a structured summary.
pub trait Summarize {
    fn summarize(&self, text: &str, verbosity: Verbosity)
        -> Result<SummaryDocument, SummarizeError>;
}

fn length_instruction(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Short => {
            "conciso, focado no lead (quem, o quê, quando, onde), aprox. 100-150 palavras"
        }
        Verbosity::Medium => {
            "detalhado, cobrindo contexto e desenvolvimento, aprox. 300-400 palavras"
        }
        Verbosity::Analytical => {
            "profundo, incluindo análise de impacto, nuances e contexto histórico, aprox. 500+ palavras"
        }
    }
}

pub fn build_prompt(text: &str, verbosity: Verbosity) -> String {
    format!(
        "Você é um editor sênior de um jornal de prestígio. Sua tarefa é resumir o texto fornecido.\n\
         \n\
         Diretrizes Estritas:\n\
         1. O estilo deve ser jornalístico, objetivo e imparcial.\n\
         2. Mantenha a integridade total de nomes próprios, datas, locais e fatos numéricos. \
         Não invente ou alucine informações.\n\
         3. O tipo de resumo deve ser: {}.\n\
         4. Gere um título atraente e jornalístico.\n\
         5. Extraia os pontos-chave (bullet points).\n\
         \n\
         Texto para resumir:\n\
         \"{}\"\n",
        length_instruction(verbosity),
        text
    )
}

fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING", "description": "Título jornalístico do resumo" },
                    "summary": { "type": "STRING", "description": "O corpo do resumo" },
                    "bulletPoints": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Lista de 3 a 5 pontos principais"
                    }
                },
                "required": ["title", "summary", "bulletPoints"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Strips ```json ... ``` or ``` ... ``` fences some models wrap JSON in.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(rest) => {
            let rest = rest.trim_start();
            rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
        }
        None => text,
    }
}

/// Extracts the summary from a raw `generateContent` response body.
pub fn parse_generate_response(body: &str) -> Result<SummaryDocument, SummarizeError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text = response
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|c| c.parts.iter())
        .find_map(|p| p.text.as_deref())
        .filter(|t| !t.trim().is_empty())
        .ok_or(SummarizeError::EmptyResponse)?;

    let document: SummaryDocument = serde_json::from_str(strip_json_fences(text))?;
    Ok(document)
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    agent: ureq::Agent,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, SummarizeError> {
        if config.api_key.trim().is_empty() {
            return Err(SummarizeError::MissingApiKey);
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Ok(Self { config, agent })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl Summarize for GeminiClient {
    fn summarize(
        &self,
        text: &str,
        verbosity: Verbosity,
    ) -> Result<SummaryDocument, SummarizeError> {
        if text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput);
        }

        let prompt = build_prompt(text, verbosity);
        debug!(
            "Requesting {} summary from {} ({} chars of input)",
            verbosity,
            self.config.model,
            text.chars().count()
        );

        let response = self
            .agent
            .post(&self.endpoint())
            .set("x-goog-api-key", &self.config.api_key)
            .set("Content-Type", "application/json")
            .send_json(request_body(&prompt));

        let body = match response {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| SummarizeError::RequestFailed {
                    message: e.to_string(),
                })?,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                warn!("Summarization API returned {}: {}", status, body);
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(SummarizeError::Api { status, message });
            }
            // the transport error's Display carries the full URL
            Err(ureq::Error::Transport(transport)) => {
                return Err(SummarizeError::RequestFailed {
                    message: transport.kind().to_string(),
                })
            }
        };

        let document = parse_generate_response(&body)?;
        debug!(
            "Summary received: '{}' with {} bullet points",
            document.title,
            document.bullet_points.len()
        );
        Ok(document)
    }
}
