//! # webset-tools
//!
//! Backend library for AI chat data tools: live webset spreadsheets, web
//! search, deep research and per-chat to-do planning.
//!
//! ## Design Philosophy
//!
//! webset-tools is designed to be:
//! - **Library-first** - No CLI or HTTP server, purely a Rust crate for embedding
//! - **Event-driven** - Tool progress streams as typed events; consumers subscribe
//! - **Snapshot-based** - Every sheet delta carries the full accumulated CSV,
//!   so a consumer that keeps only the latest snapshot is always correct
//! - **Failure-tolerant** - Remote hiccups during polling are tick-local;
//!   only creation failures abort an invocation, and timeouts still persist
//!   partial results
//!
//! ## Quick Start
//!
//! ```no_run
//! use webset_tools::{Config, SearchMode, SearchRequest, WebsetTools};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         api: webset_tools::config::ApiConfig {
//!             api_key: std::env::var("EXA_API_KEY")?,
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     };
//!
//!     let tools = WebsetTools::new(config).await?;
//!
//!     // Subscribe to streaming events
//!     let mut events = tools.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // Populate a sheet from a structured web search
//!     let artifact = tools
//!         .populate_webset(
//!             SearchRequest {
//!                 query: "Seed-stage B2B SaaS startups in Germany".to_string(),
//!                 mode: SearchMode::Company,
//!                 criteria: vec!["has a public API".to_string()],
//!                 count: 25,
//!             },
//!             None,
//!         )
//!         .await?;
//!     println!("{} rows in {}", artifact.content.lines().count() - 1, artifact.title);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Remote webset API client
pub mod client;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Evaluation normalization (criterion text, tri-state verdicts)
pub mod evaluation;
/// Per-chat to-do plans
pub mod planner;
/// Webset population loop
pub mod populator;
/// Deep-research task client
pub mod research;
/// Retry logic with exponential backoff
pub mod retry;
/// Web search client
pub mod search;
/// Sheet projection and CSV accumulation
pub mod sheet;
/// Document persistence interface
pub mod store;
/// UI data-stream publishing
pub mod stream;
/// Library facade
pub mod tools;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use client::{CreateMetadata, RemoteWebset, WebsetClient, WebsetStatus};
pub use config::Config;
pub use db::Database;
pub use error::{ClientError, DatabaseError, Error, ResearchError, Result};
pub use planner::{NewTodoItem, PlanStore, TodoItem, TodoOperation, TodoPlan, TodoPlanner};
pub use populator::{PopulateParams, WebsetPopulator};
pub use research::{Citation, ResearchClient, ResearchOutcome};
pub use search::{SearchClient, SearchParams, SearchResult};
pub use sheet::SheetAccumulator;
pub use store::{Document, DocumentStore, NewDocument};
pub use stream::{BroadcastSink, DataStreamSink};
pub use tools::WebsetTools;
pub use types::{
    ArtifactKind, DocumentId, SearchMode, SearchRequest, SheetArtifact, StreamEvent, Verdict,
    WebsetId, WebsetItem,
};
