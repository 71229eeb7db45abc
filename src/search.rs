//! Web search client
//!
//! One-shot structured web search against the remote service's `/search`
//! endpoint. Each result comes back with its text snippet, highlights, an
//! optional summary and a pre-formatted markdown source link, ready to be
//! handed to the model as tool output.
//!
//! Unlike the webset populate loop, this is a single request/response
//! surface, so transient failures are retried with the crate's backoff
//! helper.

use crate::config::{ApiConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::request_with_retry;
use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters for one search call
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// The search query to find relevant information
    pub query: String,

    /// Category to search in (research paper, news, blog, any)
    #[serde(default = "default_category")]
    pub category: String,

    /// Number of results to return
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

impl SearchParams {
    /// Build params for a query with the default category and result count
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: default_category(),
            num_results: default_num_results(),
        }
    }
}

fn default_category() -> String {
    "any".to_string()
}

fn default_num_results() -> u32 {
    5
}

/// One search result
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Result URL
    pub url: String,

    /// Page title
    #[serde(default)]
    pub title: String,

    /// Text snippet
    #[serde(default)]
    pub text: String,

    /// Highlighted sentences
    #[serde(default)]
    pub highlights: Vec<String>,

    /// Generated summary, when available
    #[serde(default)]
    pub summary: Option<String>,

    /// Markdown `[title](url)` link for citation rendering
    #[serde(default)]
    pub formatted_source: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'a str,
    category: &'a str,
    num_results: u32,
    contents: ContentsBody,
}

#[derive(Serialize)]
struct ContentsBody {
    text: TextContents,
    highlights: HighlightContents,
    summary: SummaryContents,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextContents {
    max_characters: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HighlightContents {
    num_sentences: u32,
    highlights_per_url: u32,
}

#[derive(Serialize)]
struct SummaryContents {
    enabled: bool,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Typed client for the one-shot search endpoint
pub struct SearchClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    retry: RetryConfig,
}

impl SearchClient {
    /// Create a client from API configuration and a retry policy
    pub fn new(config: &ApiConfig, retry: RetryConfig) -> Result<Self> {
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
            retry,
        })
    }

    /// Run a search, retrying transient failures
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>> {
        request_with_retry(&self.retry, || self.search_once(params)).await
    }

    async fn search_once(&self, params: &SearchParams) -> Result<Vec<SearchResult>> {
        let url = self.base_url.join("/search").map_err(|e| Error::Config {
            message: format!("invalid search endpoint: {}", e),
            key: Some("base_url".to_string()),
        })?;

        let body = SearchBody {
            query: &params.query,
            search_type: "auto",
            category: &params.category,
            num_results: params.num_results,
            contents: ContentsBody {
                text: TextContents {
                    max_characters: 1000,
                },
                highlights: HighlightContents {
                    num_sentences: 1,
                    highlights_per_url: 1,
                },
                summary: SummaryContents { enabled: true },
            },
        };

        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Search {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: SearchEnvelope = response.json::<SearchEnvelope>().await?;
        let results = envelope
            .results
            .into_iter()
            .map(|mut result| {
                result.formatted_source = format!("[{}]({})", result.title, result.url);
                result
            })
            .collect();

        Ok(results)
    }
}
