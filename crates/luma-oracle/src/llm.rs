//! Similarity oracle backed by an OpenAI-compatible chat-completions API.
//!
//! Both questions are asked at low temperature with a constrained answer
//! format: `yes`/`no` for pairwise similarity, and a candidate number (or
//! `none`) for best-match selection. Anything else is a malformed response.

use std::time::Duration;

use async_trait::async_trait;
use luma_core::config::OracleConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OracleError;
use crate::oracle::SimilarityOracle;

const SIMILAR_SYSTEM_PROMPT: &str = "You decide whether two short user requests express the same intent. \
Ignore wording, word order, politeness and filler words. \
Answer with exactly one word: yes or no.";

const SELECT_SYSTEM_PROMPT: &str = "You match a short user request against a numbered list of known requests. \
Reply with the number of the known request that expresses the same intent. \
If none of them does, reply with the word none. Reply with nothing else.";

/// Connection settings for [`LlmSimilarityOracle`].
#[derive(Clone, Debug)]
pub struct LlmOracleConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmOracleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        let defaults = OracleConfig::default();
        Self {
            api_key: api_key.into(),
            base_url: defaults.base_url,
            model: defaults.model,
            temperature: defaults.temperature,
            timeout: Duration::from_secs(defaults.timeout_secs),
        }
    }

    /// Build from the `[oracle]` config section, reading the API key from the
    /// environment variable it names.
    pub fn from_oracle_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                OracleError::Config(format!("{} is not set", config.api_key_env))
            })?;
        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Production oracle. Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct LlmSimilarityOracle {
    client: reqwest::Client,
    config: LlmOracleConfig,
}

impl std::fmt::Debug for LlmSimilarityOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSimilarityOracle")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

impl LlmSimilarityOracle {
    pub fn new(config: LlmOracleConfig) -> Result<Self, OracleError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|e| OracleError::Config(format!("invalid API key header: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Send one system + user exchange and return the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let timeout_ms = self.config.timeout.as_millis() as u64;
        match tokio::time::timeout(self.config.timeout, self.send(&body)).await {
            Ok(Err(OracleError::Timeout(_))) | Err(_) => Err(OracleError::Timeout(timeout_ms)),
            Ok(result) => result,
        }
    }

    async fn send(&self, body: &ChatRequest<'_>) -> Result<String, OracleError> {
        let response = self.client.post(self.endpoint()).json(body).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status, body: text });
        }
        let parsed = response.json::<ChatResponse>().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::MalformedResponse("no message content".to_string()))
    }
}

#[async_trait]
impl SimilarityOracle for LlmSimilarityOracle {
    fn name(&self) -> &str {
        "llm"
    }

    async fn judge(&self, text_a: &str, text_b: &str) -> Result<bool, OracleError> {
        let user = format!("Request A: {}\nRequest B: {}", text_a, text_b);
        let reply = self.complete(SIMILAR_SYSTEM_PROMPT, &user).await?;
        debug!(reply = %reply, "Similarity reply");
        parse_yes_no(&reply)
    }

    async fn select(
        &self,
        target: &str,
        candidates: &[String],
    ) -> Result<Option<String>, OracleError> {
        let user = selection_prompt(target, candidates);
        let reply = self.complete(SELECT_SYSTEM_PROMPT, &user).await?;
        debug!(reply = %reply, candidates = candidates.len(), "Selection reply");
        parse_selection(&reply, candidates)
    }
}

fn selection_prompt(target: &str, candidates: &[String]) -> String {
    let mut prompt = format!("Request: {}\n\nKnown requests:\n", target);
    for (i, candidate) in candidates.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, candidate));
    }
    prompt
}

/// Strip surrounding whitespace, quotes and a trailing period. Case is kept.
fn unquote(reply: &str) -> &str {
    reply
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim_end_matches('.')
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim()
}

pub(crate) fn parse_yes_no(reply: &str) -> Result<bool, OracleError> {
    match unquote(reply).to_lowercase().as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(OracleError::MalformedResponse(reply.to_string())),
    }
}

pub(crate) fn parse_selection(
    reply: &str,
    candidates: &[String],
) -> Result<Option<String>, OracleError> {
    // An echoed candidate text wins over a list number, so a candidate that
    // is itself a number resolves to that text.
    let raw = reply.trim();
    let cleaned = unquote(reply);
    if let Some(candidate) = candidates
        .iter()
        .find(|c| c.as_str() == raw || c.as_str() == cleaned)
    {
        return Ok(Some(candidate.clone()));
    }

    if cleaned.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match cleaned.trim_start_matches('#').parse::<usize>() {
        Ok(n) => match n.checked_sub(1).and_then(|i| candidates.get(i)) {
            Some(candidate) => Ok(Some(candidate.clone())),
            None => Err(OracleError::MalformedResponse(format!(
                "candidate number {} out of range 1..={}",
                n,
                candidates.len()
            ))),
        },
        Err(_) => Err(OracleError::MalformedResponse(reply.to_string())),
    }
}
