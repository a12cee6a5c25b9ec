//! The external machine-translation provider, behind a narrow trait so jobs
//! and tests can swap in a fake.
//!
//! The production implementation talks to the OpenAI chat-completions API.
//! Callers wrap each call: a provider failure means "leave this unit
//! untranslated and continue", never a dead job.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::retry::{with_retry_if, RetryConfig};

/// Text-in/text-out translation dependency.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` into `target_language`.
    ///
    /// `kind_hint` describes what the text is ("service name", "gallery
    /// category", ...); `business_hint` describes the tenant ("Beauty
    /// Salon"). Both only shape the prompt.
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        kind_hint: &str,
        business_hint: &str,
    ) -> Result<String>;
}

/// OpenAI Chat Completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Build the system prompt for one translation unit.
///
/// The content-kind hint selects an instruction block: price-list entries
/// need terse professional wording, gallery captions an inviting tone.
fn build_system_prompt(target_language: &str, kind_hint: &str, business_hint: &str) -> String {
    let business = if business_hint.trim().is_empty() {
        "General Business"
    } else {
        business_hint
    };

    let instruction = if kind_hint.starts_with("service") {
        "Keep service names concise and professional. Do NOT translate well-known brand names. \
         If a term is an industry-standard technical term, keep the professional equivalent."
    } else if kind_hint.starts_with("gallery") {
        "Be creative, descriptive, and inviting. Use an engaging tone suitable for photo \
         captions to attract customers."
    } else {
        "Translate accurately and naturally."
    };

    format!(
        "You are a professional translator for a {} website. You are translating a {}. {} \
         Translate the input text to {}. Only return the translated text, no explanations.",
        business, kind_hint, instruction, target_language
    )
}

/// Production provider over the OpenAI API.
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiTranslator {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        }
    }
}

#[async_trait]
impl TranslationProvider for OpenAiTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        kind_hint: &str,
        business_hint: &str,
    ) -> Result<String> {
        // Nothing meaningful to translate.
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_system_prompt(target_language, kind_hint, business_hint),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            max_completion_tokens: 1000,
            temperature: 0.3,
        };

        let translated = with_retry_if(
            &RetryConfig::provider_call(),
            &format!("Translation to {}", target_language),
            || async {
                let response = self
                    .client
                    .post(&self.api_url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("Content-Type", "application/json")
                    .json(&request)
                    .send()
                    .await
                    .context("Failed to send translation request to OpenAI API")?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    anyhow::bail!("OpenAI API error during translation ({}): {}", status, body);
                }

                let chat_response: ChatResponse = response
                    .json()
                    .await
                    .context("Failed to parse OpenAI translation response")?;

                let translated = chat_response
                    .choices
                    .first()
                    .map(|c| c.message.content.trim().to_string())
                    .context("OpenAI translation response contained no choices")?;

                Ok(translated)
            },
            is_retryable_error,
        )
        .await?;

        Ok(translated)
    }
}

/// Determine if an error is retryable (5xx errors, 429 rate limit, network
/// errors). Other 4xx client errors should not be retried.
fn is_retryable_error(error: &anyhow::Error) -> bool {
    let error_str = error.to_string();

    // Error format: "OpenAI API error during translation (400 Bad Request): ..."
    if error_str.contains("OpenAI API error") {
        if let Some(start) = error_str.find('(') {
            if let Some(end) = error_str[start..].find(')') {
                let status_str = &error_str[start + 1..start + end];
                let status_num = status_str.split_whitespace().next().unwrap_or("");
                if let Ok(status) = status_num.parse::<u16>() {
                    return status == 429 || status >= 500;
                }
            }
        }
    }

    // Network errors, timeouts and other transient failures
    true
}
