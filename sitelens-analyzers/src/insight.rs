//! AI insight adapter for OpenAI-compatible chat completion APIs.
//!
//! Sends the target together with the other analyzers' normalized results
//! (the `context` option) and expects the assistant to answer with a single
//! JSON object: `{"score": 0-100, "strengths": [], "weaknesses": [],
//! "recommendations": []}`.

use crate::error::{Result, ScanError};
use crate::payload::into_payload;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sitelens_core::analyzer::{
    Analyzer, AnalyzerError, AnalyzerKind, AnalyzerOptions, CONTEXT_OPTION, Payload,
};
use sitelens_core::request::TargetDescriptor;
use tracing::{debug, info};

pub const DEFAULT_AI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a web marketing analyst. Given a website or business and \
automated audit results, assess its overall online presence. Answer with one JSON object only: \
{\"score\": integer 0-100, \"strengths\": [string], \"weaknesses\": [string], \
\"recommendations\": [string]}. Keep each list to at most five short items.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// Shape the assistant must answer with
#[derive(Debug, Deserialize)]
struct InsightAnswer {
    score: Option<f64>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<f64>,
    pub model: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Strip an optional ```json fence around the assistant's answer
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

pub fn parse_answer(content: &str, model: &str) -> Result<InsightReport> {
    let value: Value = serde_json::from_str(strip_code_fence(content))?;
    if !value.is_object() {
        return Err(ScanError::ParseError(
            "assistant answer is not a JSON object".to_string(),
        ));
    }
    let answer: InsightAnswer = serde_json::from_value(value)?;

    Ok(InsightReport {
        ai_score: answer.score.filter(|s| s.is_finite()),
        model: model.to_string(),
        strengths: answer.strengths,
        weaknesses: answer.weaknesses,
        recommendations: answer.recommendations,
    })
}

fn user_prompt(target: &TargetDescriptor, options: &AnalyzerOptions) -> String {
    let subject = match target {
        TargetDescriptor::Url { url } => format!("Website: {}", url),
        TargetDescriptor::Business(business) => format!("Business: {}", business.search_query()),
    };
    let context = options
        .get(CONTEXT_OPTION)
        .map(|c| serde_json::to_string_pretty(c).unwrap_or_default())
        .unwrap_or_else(|| "{}".to_string());

    format!("{}\n\nAudit results:\n{}", subject, context)
}

pub struct InsightAnalyzer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl InsightAnalyzer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_AI_MODEL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub async fn analyze(&self, target: &TargetDescriptor, options: &AnalyzerOptions) -> Result<Payload> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ScanError::MissingCredential("AI API key"))?;

        let body = json!({
            "model": self.model,
            "temperature": 0.2,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(target, options)}
            ]
        });

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Requesting AI insight from {} ({})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ScanError::ApiError(format!("{}: {}", status, detail.trim())));
        }

        let chat: ChatResponse = serde_json::from_str(&response.text().await?)?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ScanError::ParseError("no assistant message in response".to_string()))?;

        let report = parse_answer(&content, &self.model)?;
        info!(
            "AI insight for {}: score {:?}, {} recommendations",
            target,
            report.ai_score,
            report.recommendations.len()
        );

        into_payload(&report)
    }
}

#[async_trait]
impl Analyzer for InsightAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::AiInsight
    }

    async fn invoke(
        &self,
        target: &TargetDescriptor,
        options: &AnalyzerOptions,
    ) -> std::result::Result<Payload, AnalyzerError> {
        Ok(self.analyze(target, options).await?)
    }
}
