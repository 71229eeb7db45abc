//! Remote webset API client
//!
//! Thin typed wrapper over the structured-search service's webset endpoints:
//! create, status, item listing (single snapshot and cursor-paginated bulk)
//! and single-item detail fetch. Every non-success response maps to a
//! [`ClientError`] variant carrying the remote status code and body; retry
//! policy is the caller's concern (the populate loop treats status and item
//! failures as tick-local, and creation failures as fatal).

use crate::config::ApiConfig;
use crate::error::{ClientError, Error};
use crate::types::{DocumentId, SearchMode, SearchRequest, WebsetId, WebsetItem};
use serde::{Deserialize, Serialize};
use url::Url;

/// Remote status value signaling that no further items will arrive
///
/// This is the only terminal status. Everything else, including
/// unrecognized values, means the job is still in progress.
pub const IDLE_STATUS: &str = "idle";

const API_KEY_HEADER: &str = "x-api-key";

/// Provenance metadata attached to a webset at creation time
///
/// Echoed back by the remote service; ties the webset to the document
/// artifact and owning user that spawned it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMetadata {
    /// Document artifact id the webset populates
    pub document_id: DocumentId,
    /// Owning user, when known
    pub user_id: Option<String>,
    /// Original query text
    pub query: String,
    /// Search mode
    pub mode: SearchMode,
    /// Requested row count (stringified, per the remote metadata contract)
    pub count: String,
}

/// Server-side webset job as returned by creation
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteWebset {
    /// Opaque webset id assigned by the remote service
    pub id: WebsetId,
    /// Initial status, when reported
    #[serde(default)]
    pub status: Option<String>,
}

/// Status snapshot of a webset job
#[derive(Clone, Debug, Deserialize)]
pub struct WebsetStatus {
    /// Remote-defined status string
    #[serde(default)]
    pub status: String,
}

impl WebsetStatus {
    /// Whether this status is the terminal one
    pub fn is_idle(&self) -> bool {
        self.status == IDLE_STATUS
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateWebsetBody<'a> {
    external_id: &'a str,
    search: CreateSearchBody<'a>,
    metadata: &'a CreateMetadata,
    enrichments: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct CreateSearchBody<'a> {
    query: &'a str,
    entity: CreateEntityBody,
    criteria: Vec<CreateCriterionBody<'a>>,
    count: u32,
    metadata: &'a CreateMetadata,
}

#[derive(Serialize)]
struct CreateEntityBody {
    #[serde(rename = "type")]
    entity_type: SearchMode,
}

#[derive(Serialize)]
struct CreateCriterionBody<'a> {
    description: &'a str,
}

#[derive(Deserialize)]
struct ItemsEnvelope {
    #[serde(default)]
    data: Vec<WebsetItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PagedItemsEnvelope {
    #[serde(default)]
    data: Vec<WebsetItem>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Typed client for the webset endpoints
pub struct WebsetClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl WebsetClient {
    /// Create a client from API configuration
    ///
    /// # Errors
    /// Returns a configuration error if the base URL does not parse, or if
    /// the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> crate::Result<Self> {
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
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Create a webset job for a search request
    ///
    /// A single attempt: a non-success response aborts the whole populate
    /// invocation with [`ClientError::TaskCreation`].
    pub async fn create_webset(
        &self,
        request: &SearchRequest,
        metadata: &CreateMetadata,
    ) -> Result<RemoteWebset, ClientError> {
        let body = CreateWebsetBody {
            external_id: metadata.document_id.as_str(),
            search: CreateSearchBody {
                query: &request.query,
                entity: CreateEntityBody {
                    entity_type: request.mode,
                },
                criteria: request
                    .criteria
                    .iter()
                    .map(|c| CreateCriterionBody { description: c })
                    .collect(),
                count: request.count,
                metadata,
            },
            metadata,
            enrichments: Vec::new(),
        };

        let response = self
            .http
            .post(self.endpoint("/websets/v0/websets")?)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::TaskCreation {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the current status of a webset job
    pub async fn get_status(&self, webset_id: &WebsetId) -> Result<WebsetStatus, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/websets/v0/websets/{}", webset_id))?)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::StatusFetch {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the current full item snapshot of a webset job
    ///
    /// The remote service always returns everything known so far, not a
    /// delta; deduplication against previously seen items happens in the
    /// accumulator.
    pub async fn list_items(&self, webset_id: &WebsetId) -> Result<Vec<WebsetItem>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/websets/v0/websets/{}/items", webset_id))?)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ItemsFetch {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: ItemsEnvelope = response.json().await?;
        Ok(envelope.data)
    }

    /// Fetch every item of a webset, following cursor pagination
    ///
    /// Repeats the listing request with the `cursor` token until the service
    /// reports `hasMore: false`, concatenating pages in order. An absent or
    /// empty cursor means first page; a repeated or empty `nextCursor` stops
    /// the walk rather than looping.
    pub async fn list_all_items(
        &self,
        webset_id: &WebsetId,
    ) -> Result<Vec<WebsetItem>, ClientError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url =
                self.endpoint(&format!("/websets/v0/websets/{}/items", webset_id))?;
            if let Some(c) = &cursor {
                url.query_pairs_mut().append_pair("cursor", c);
            }

            let response = self
                .http
                .get(url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::ItemsFetch {
                    status: status.as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }

            let page: PagedItemsEnvelope = response.json().await?;
            items.extend(page.data);

            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) if !next.is_empty() && cursor.as_deref() != Some(next.as_str()) => {
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(items)
    }

    /// Fetch a single item by id, for detail views
    pub async fn get_item(
        &self,
        webset_id: &WebsetId,
        item_id: &str,
    ) -> Result<WebsetItem, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&format!(
                "/websets/v0/websets/{}/items/{}",
                webset_id, item_id
            ))?)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ItemFetch {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
