//! Financial advice and chat through a generative language model.
//!
//! The ledger is sent as plain text, one line per record, together with an
//! instruction. The reply is shown verbatim; nothing in it is parsed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdviceConfig;
use crate::domain::{Record, format_cents};

use super::{AppError, LedgerService};

const EMPTY_LEDGER_SUMMARY: &str = "No records yet";

/// Anything that can turn a prompt into a reply.
#[async_trait::async_trait]
pub trait AdviceClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

/// One line per record: `date category: .. amount: .. note: ..`.
pub fn ledger_summary(records: &[Record]) -> String {
    if records.is_empty() {
        return EMPTY_LEDGER_SUMMARY.to_string();
    }
    records
        .iter()
        .map(|r| {
            format!(
                "{} category: {} amount: {} note: {}",
                r.date,
                r.category,
                format_cents(r.amount),
                r.note
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn advice_prompt(records: &[Record]) -> String {
    format!(
        "You are a professional financial advisor. These are the user's income and expense records \
         (positive amounts are income, negative amounts are expenses):\n\
         {}\n\
         Give three concrete pieces of financial advice. Keep them short and use plain, friendly language.",
        ledger_summary(records)
    )
}

pub fn chat_prompt(records: &[Record], question: &str) -> String {
    format!(
        "You are a friendly financial advisor. These are the user's income and expense records \
         (positive amounts are income, negative amounts are expenses):\n\
         {}\n\n\
         The user's question is: {}\n\
         Answer based on these records. If the data is not enough to answer, say so honestly.",
        ledger_summary(records),
        question
    )
}

impl LedgerService {
    /// Ask for advice on the whole ledger. An empty ledger is an error and the
    /// client is not called.
    pub async fn financial_advice<C: AdviceClient + ?Sized>(
        &self,
        client: &C,
    ) -> Result<String, AppError> {
        if self.is_empty() {
            return Err(AppError::NoRecords);
        }
        let reply = client.generate(&advice_prompt(self.records())).await?;
        Ok(reply.trim().to_string())
    }

    /// Answer one free-form question. Each call sends the current ledger; no
    /// earlier questions or answers are included.
    pub async fn chat<C: AdviceClient + ?Sized>(
        &self,
        client: &C,
        question: &str,
    ) -> Result<String, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(crate::domain::ValidationError::MissingField("question").into());
        }
        let reply = client
            .generate(&chat_prompt(self.records(), question))
            .await?;
        Ok(reply.trim().to_string())
    }
}

/// [`AdviceClient`] backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn from_config(config: &AdviceConfig) -> Result<Self, AppError> {
        let api_key = config.api_key()?.to_string();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model_name()
        );
        Ok(Self {
            http: reqwest::Client::new(),
            url,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl AdviceClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        debug!(url = %self.url, prompt_len = prompt.len(), "Requesting advice");
        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::new(prompt))
            .send()
            .await
            .map_err(|e| AppError::Advice(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Advice(format!("{}: {}", status, body.trim())));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Advice(format!("Invalid response: {}", e)))?;
        body.text()
            .ok_or_else(|| AppError::Advice("Response contained no text".into()))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}
