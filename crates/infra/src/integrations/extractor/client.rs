//! Chat-completions client for event extraction
//!
//! Sends the user's free text plus scheduling context to the configured
//! chat-completions API and parses the JSON draft out of the reply. The model
//! is prompted to return bare JSON; code fences are stripped defensively
//! before parsing because models add them anyway.

use async_trait::async_trait;
use chrono::{Datelike, Duration};
use reqwest::Method;
use slated_core::ports::{EventExtractor, ExtractionContext};
use slated_domain::{EventDraft, ExtractorConfig, Result, SlatedError};
use tracing::{debug, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, RawEventDraft};
use crate::http::HttpClient;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.2;

/// `EventExtractor` implementation backed by a chat-completions API.
pub struct LlmEventExtractor {
    http: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl LlmEventExtractor {
    pub fn new(http: HttpClient, config: &ExtractorConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        }
    }

    fn system_prompt(ctx: &ExtractionContext) -> String {
        let today = ctx.today;
        let tomorrow = today + Duration::days(1);
        format!(
            "You are an intelligent calendar assistant that extracts structured event \
             information from natural language.\n\n\
             Current Context:\n\
             - Today's Date: {today} ({weekday})\n\
             - User Timezone: {timezone}\n\
             - Work Hours: {work_hours}\n\n\
             Your task: Extract event details and return a JSON object with these fields:\n\
             {{\n\
               \"title\": \"string - event name/title\",\n\
               \"date\": \"YYYY-MM-DD - calculated date\",\n\
               \"time\": \"HH:MM - 24-hour format, omit if not specified\",\n\
               \"duration\": \"number - hours (default: 1 for meetings, 2 for tasks)\",\n\
               \"type\": \"meeting|task|focus_block|reminder\",\n\
               \"priority\": \"low|medium|high|urgent\",\n\
               \"participants\": [\"email1\", \"email2\"] - if mentioned,\n\
               \"description\": \"string - any additional context\",\n\
               \"flexible\": \"boolean - can this be rescheduled if needed?\"\n\
             }}\n\n\
             Date interpretation rules:\n\
             - \"today\" = {today}\n\
             - \"tomorrow\" = {tomorrow}\n\
             - \"next Monday\" = next occurring Monday from today in the user's timezone\n\n\
             Time interpretation:\n\
             - \"morning\" = 09:00-12:00 (suggest 10:00)\n\
             - \"afternoon\" = 13:00-17:00 (suggest 14:00)\n\
             - \"evening\" = 17:00-20:00 (suggest 18:00)\n\n\
             Return ONLY valid JSON, no markdown or explanation.",
            today = today,
            weekday = today.weekday(),
            timezone = ctx.timezone,
            work_hours = ctx.work_hours,
            tomorrow = tomorrow,
        )
    }
}

#[async_trait]
impl EventExtractor for LlmEventExtractor {
    async fn extract(&self, text: &str, ctx: &ExtractionContext) -> Result<EventDraft> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: Self::system_prompt(ctx) },
                ChatMessage { role: "user".to_string(), content: text.to_string() },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .send(
                self.http
                    .request(Method::POST, &self.api_url)
                    .bearer_auth(&self.api_key)
                    .json(&request),
            )
            .await
            .map_err(|e| SlatedError::Extraction(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            warn!(status = status.as_u16(), "extractor API error");
            return Err(SlatedError::Extraction(format!(
                "extractor API error ({status}): {error_text}"
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            SlatedError::Extraction(format!("failed to parse extractor response: {e}"))
        })?;

        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| SlatedError::Extraction("extractor returned no choices".into()))?;

        debug!(reply_len = content.len(), "extractor reply received");

        let cleaned = strip_code_fences(content);
        let raw: RawEventDraft = serde_json::from_str(cleaned).map_err(|e| {
            SlatedError::Extraction(format!("could not parse model reply as JSON: {e}"))
        })?;

        raw.into_draft()
    }
}

/// Remove a leading/trailing markdown code fence from the model reply.
fn strip_code_fences(reply: &str) -> &str {
    let mut cleaned = reply.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}
