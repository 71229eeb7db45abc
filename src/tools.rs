//! Library facade
//!
//! [`WebsetTools`] wires the clients, the document store, the streaming sink
//! and the plan store together behind one constructor, and tracks in-flight
//! populate invocations so they can be cancelled by document id.

use crate::client::WebsetClient;
use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::planner::{PlanStore, TodoPlanner};
use crate::populator::{PopulateParams, WebsetPopulator};
use crate::research::{ResearchClient, ResearchOutcome};
use crate::search::{SearchClient, SearchParams, SearchResult};
use crate::store::DocumentStore;
use crate::stream::{BroadcastSink, DataStreamSink};
use crate::types::{DocumentId, SearchRequest, SheetArtifact, StreamEvent, WebsetId, WebsetItem};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Main entry point for webset-tools
///
/// One instance serves any number of chats; per-invocation state lives
/// inside each call. Subscribe to [`StreamEvent`]s before invoking a tool to
/// observe its streaming output.
pub struct WebsetTools {
    /// Database instance for persistence
    /// Public for embedders to query stored documents directly
    pub db: Arc<Database>,
    sink: Arc<BroadcastSink>,
    webset_client: Arc<WebsetClient>,
    search_client: SearchClient,
    research_client: ResearchClient,
    plan_store: Arc<PlanStore>,
    populator: WebsetPopulator,
    active_populates: Arc<tokio::sync::Mutex<HashMap<DocumentId, CancellationToken>>>,
}

impl std::fmt::Debug for WebsetTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebsetTools").finish_non_exhaustive()
    }
}

impl WebsetTools {
    /// Create a new WebsetTools instance
    ///
    /// This initializes all core components:
    /// - Opens/creates the SQLite document store and runs migrations
    /// - Builds the webset, search and research API clients
    /// - Sets up the broadcast event sink and the plan store
    pub async fn new(config: Config) -> Result<Self> {
        if config.api.api_key.is_empty() {
            return Err(Error::Config {
                message: "api_key must be set".to_string(),
                key: Some("api_key".to_string()),
            });
        }

        let db = Arc::new(Database::new(&config.persistence.database_path).await?);
        let sink = Arc::new(BroadcastSink::default());
        let webset_client = Arc::new(WebsetClient::new(&config.api)?);
        let search_client = SearchClient::new(&config.api, config.retry.clone())?;
        let research_client = ResearchClient::new(&config.api, config.research.clone())?;
        let plan_store = Arc::new(PlanStore::new());

        let populator = WebsetPopulator::new(
            webset_client.clone(),
            db.clone() as Arc<dyn DocumentStore>,
            sink.clone() as Arc<dyn DataStreamSink>,
            config.polling.clone(),
        );

        Ok(Self {
            db,
            sink,
            webset_client,
            search_client,
            research_client,
            plan_store,
            populator,
            active_populates: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
        })
    }

    /// Subscribe to streaming events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Subscribe before invoking a tool, or the early
    /// announcement events will be missed.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StreamEvent> {
        self.sink.subscribe()
    }

    /// The shared to-do plan store
    pub fn plan_store(&self) -> Arc<PlanStore> {
        self.plan_store.clone()
    }

    /// Planner handle over the shared store and sink
    pub fn planner(&self) -> TodoPlanner {
        TodoPlanner::new(
            self.plan_store.clone(),
            self.sink.clone() as Arc<dyn DataStreamSink>,
        )
    }

    /// Create and populate a webset-backed sheet artifact
    ///
    /// Streams artifact announcement, metadata and full-snapshot CSV deltas
    /// while polling, then persists the final document. See
    /// [`WebsetPopulator`] for the polling policy and error semantics.
    pub async fn populate_webset(
        &self,
        request: SearchRequest,
        user_id: Option<String>,
    ) -> Result<SheetArtifact> {
        let document_id = DocumentId::generate();
        let cancel = CancellationToken::new();

        self.active_populates
            .lock()
            .await
            .insert(document_id.clone(), cancel.clone());

        let result = self
            .populator
            .run(
                PopulateParams {
                    request,
                    user_id,
                    document_id: document_id.clone(),
                },
                cancel,
            )
            .await;

        self.active_populates.lock().await.remove(&document_id);
        result
    }

    /// Cancel an in-flight populate invocation by document id
    ///
    /// Returns whether an invocation was found. The cancelled invocation
    /// persists its partial sheet and returns [`Error::Cancelled`].
    pub async fn cancel_populate(&self, document_id: &DocumentId) -> bool {
        match self.active_populates.lock().await.get(document_id) {
            Some(cancel) => {
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Run a one-shot web search
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>> {
        self.search_client.search(params).await
    }

    /// Run a deep-research task to completion
    pub async fn research(
        &self,
        instructions: &str,
        output_schema: Option<&serde_json::Value>,
    ) -> Result<ResearchOutcome> {
        self.research_client.run(instructions, output_schema).await
    }

    /// Fetch one webset item for a detail view
    ///
    /// Prefers a direct lookup by item id (the sheet's hidden `_itemId`
    /// column). Without an id, falls back to the paginated bulk listing,
    /// matching by row URL first and defaulting to the first item.
    pub async fn fetch_item(
        &self,
        webset_id: &WebsetId,
        item_id: Option<&str>,
        row_url: Option<&str>,
    ) -> Result<Option<WebsetItem>> {
        if let Some(item_id) = item_id {
            let item = self
                .webset_client
                .get_item(webset_id, item_id)
                .await
                .map_err(Error::Client)?;
            return Ok(Some(item));
        }

        let items = self
            .webset_client
            .list_all_items(webset_id)
            .await
            .map_err(Error::Client)?;

        if let Some(url) = row_url {
            let wanted = url.to_lowercase();
            let matched = items
                .iter()
                .find(|item| {
                    item.properties
                        .url
                        .as_deref()
                        .is_some_and(|u| u.to_lowercase() == wanted)
                })
                .cloned();
            if matched.is_some() {
                return Ok(matched);
            }
        }

        Ok(items.into_iter().next())
    }
}
