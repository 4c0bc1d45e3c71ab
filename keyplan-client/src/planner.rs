use crate::error::{ClientError, Result};
use crate::result::TopicPlan;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const MIN_CHILD_PAGES: usize = 1;
pub const MAX_CHILD_PAGES: usize = 50;

/// Settings for the topic planner, fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub min_children: usize,
    pub max_children: usize,
}

impl PlannerConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(DEFAULT_OPENAI_BASE_URL)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url,
            model: DEFAULT_MODEL.to_string(),
            min_children: MIN_CHILD_PAGES,
            max_children: MAX_CHILD_PAGES,
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Clamp a requested child page count into the configured bounds.
    pub fn clamp_children(&self, requested: i64) -> usize {
        let min = self.min_children as i64;
        let max = self.max_children as i64;
        requested.clamp(min, max.max(min)) as usize
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Asks a chat completion model for a main page and child pages.
pub struct TopicPlanner {
    client: Client,
    config: PlannerConfig,
}

impl TopicPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::ConfigError("OpenAI API key is empty".to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("keyplan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn system_prompt(max_children: usize) -> String {
        format!(
            "You are an SEO keyword generator. \
             Return JSON with keys 'main_page' and 'child_pages'. \
             Include up to {} child pages. \
             Keep keywords short-tail and directly relevant. \
             Avoid long-tail or repetitive phrasing.",
            max_children
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.as_str().trim_end_matches('/')
        )
    }

    /// One chat completion call. No retries: any failure is returned as is.
    pub async fn plan(&self, topic: &str, max_children: usize) -> Result<TopicPlan> {
        let max_children = self.config.clamp_children(max_children as i64);
        info!(
            "Planning topic '{}' with up to {} child pages using {}",
            topic, max_children, self.config.model
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: Self::system_prompt(max_children),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Generate SEO structure for: {}", topic),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                debug!("Planner request failed: {}", e);
                ClientError::HttpError(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Planner API error {}: {}", status, body);
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Invalid completion body: {}", e)))?;

        debug!(
            "Planner responded in {} ms",
            start.elapsed().as_millis()
        );

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::ParseError("Completion has no content".to_string()))?;

        TopicPlan::from_content(&content, topic, max_children)
    }
}
