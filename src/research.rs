//! Deep-research task client
//!
//! Creates a research task on the remote service and polls it to completion
//! on a fixed cadence with a hard attempt cap (default 60 × 5 s, about five
//! minutes). The webset populate loop borrows its bounded-with-explicit-
//! timeout polling policy from this surface.
//!
//! Unlike webset polling, a status fetch failure here is fatal: the task has
//! no incremental output worth preserving, so there is nothing to salvage by
//! continuing.

use crate::config::{ApiConfig, ResearchConfig};
use crate::error::{Error, ResearchError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// Newly created research task
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchTask {
    /// Opaque task id assigned by the remote service
    pub research_id: String,
}

/// One cited source in a research result
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Citation {
    /// Source URL
    pub url: String,

    /// Source title, when known
    #[serde(default)]
    pub title: Option<String>,
}

impl Citation {
    /// Markdown `[title](url)` link, falling back to the URL as label
    pub fn markdown_link(&self) -> String {
        format!("[{}]({})", self.title.as_deref().unwrap_or(&self.url), self.url)
    }
}

/// Status snapshot of a research task
#[derive(Clone, Debug, Deserialize)]
pub struct ResearchStatus {
    /// Remote-defined status string ("completed" and "failed" are terminal)
    #[serde(default)]
    pub status: String,

    /// Structured research output, present once completed
    #[serde(default)]
    pub data: Option<serde_json::Value>,

    /// Cited sources
    #[serde(default)]
    pub citations: Vec<Citation>,

    /// Failure message, when the task failed
    #[serde(default)]
    pub message: Option<String>,
}

/// Final result of a research run
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchOutcome {
    /// Remote task id
    pub task_id: String,

    /// Structured research output
    pub data: Option<serde_json::Value>,

    /// Cited sources
    pub citations: Vec<Citation>,

    /// Comma-separated markdown links for all citations
    pub formatted_citations: String,

    /// Human-readable completion summary
    pub summary: String,
}

#[derive(Serialize)]
struct CreateResearchBody<'a> {
    model: &'a str,
    instructions: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_schema: Option<&'a serde_json::Value>,
}

/// Typed client for the research endpoints
pub struct ResearchClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    polling: ResearchConfig,
}

impl ResearchClient {
    /// Create a client from API configuration and a polling policy
    pub fn new(config: &ApiConfig, polling: ResearchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL '{}': {}", config.base_url, e),
            key: Some("base_url".to_string()),
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("webset-tools/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            polling,
        })
    }

    /// Create a research task
    pub async fn create_task(
        &self,
        instructions: &str,
        output_schema: Option<&serde_json::Value>,
    ) -> std::result::Result<ResearchTask, ResearchError> {
        let url = self
            .base_url
            .join("/research/v1")
            .map_err(|e| ResearchError::TaskCreation {
                status: 0,
                body: format!("invalid endpoint: {}", e),
            })?;

        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .json(&CreateResearchBody {
                model: "exa-research",
                instructions,
                output_schema,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::TaskCreation {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the current status of a research task
    pub async fn get_status(
        &self,
        research_id: &str,
    ) -> std::result::Result<ResearchStatus, ResearchError> {
        let url = self
            .base_url
            .join(&format!("/research/v1/{}", research_id))
            .map_err(|e| ResearchError::StatusFetch {
                status: 0,
                body: format!("invalid endpoint: {}", e),
            })?;

        let response = self
            .http
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::StatusFetch {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    /// Poll a research task until it completes, fails, or the budget runs out
    pub async fn poll(
        &self,
        research_id: &str,
    ) -> std::result::Result<ResearchStatus, ResearchError> {
        for attempt in 1..=self.polling.max_attempts {
            let status = self.get_status(research_id).await?;
            debug!(research_id, attempt, status = %status.status, "Research status check");

            match status.status.as_str() {
                "completed" => return Ok(status),
                "failed" => {
                    return Err(ResearchError::Failed(
                        status
                            .message
                            .unwrap_or_else(|| "research task failed".to_string()),
                    ));
                }
                _ => tokio::time::sleep(self.polling.interval).await,
            }
        }

        Err(ResearchError::TimedOut {
            attempts: self.polling.max_attempts,
        })
    }

    /// Create a task, poll it to completion and format the outcome
    pub async fn run(
        &self,
        instructions: &str,
        output_schema: Option<&serde_json::Value>,
    ) -> Result<ResearchOutcome> {
        let task = self.create_task(instructions, output_schema).await?;
        info!(research_id = %task.research_id, "Research task created");

        let completed = self.poll(&task.research_id).await?;

        let formatted_citations = completed
            .citations
            .iter()
            .map(Citation::markdown_link)
            .collect::<Vec<_>>()
            .join(", ");
        let summary = format!(
            "Research completed successfully. {} sources analyzed.",
            completed.citations.len()
        );

        Ok(ResearchOutcome {
            task_id: task.research_id,
            data: completed.data,
            citations: completed.citations,
            formatted_citations,
            summary,
        })
    }
}
