//! Webset population loop
//!
//! Drives one populate invocation end to end: announce the artifact, create
//! the remote webset, poll it on a fixed cadence while incrementally
//! materializing items into the CSV accumulator, stream full-snapshot deltas
//! to the UI, and persist the final document.
//!
//! The loop is an explicit state machine, `Creating → Polling → Done`, with
//! failure as an implicit absorbing state reachable from anywhere:
//! - `Creating`: a non-success creation response is fatal. Nothing has been
//!   persisted at that point; the error propagates to the caller (a `Finish`
//!   event is still emitted so the UI leaves its streaming state).
//! - `Polling`: status and item fetch failures are tick-local; the tick is
//!   logged and skipped, and the next one retries. The one terminal condition is
//!   the remote status literal `"idle"`; item-count-reached is deliberately
//!   NOT terminal, because the remote job may still be refining evaluations
//!   for items it has already returned.
//! - The loop is bounded: after `max_attempts` ticks (default 150 × 2 s,
//!   about five minutes) the partial sheet is persisted, `Finish` is
//!   emitted, and an explicit timeout error is returned. Unbounded polling
//!   would hold resources forever on a job that never goes idle.
//!
//! Each tick checks a cancellation token first, so an invocation can be torn
//! down when the owning request goes away; cancellation persists the partial
//! sheet the same way a timeout does.

use crate::client::{CreateMetadata, WebsetClient};
use crate::config::PollingConfig;
use crate::error::{Error, Result};
use crate::sheet::SheetAccumulator;
use crate::store::{DocumentStore, NewDocument};
use crate::stream::DataStreamSink;
use crate::types::{ArtifactKind, DocumentId, SearchRequest, SheetArtifact, StreamEvent, WebsetId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Parameters for one populate invocation
///
/// The document id is supplied by the caller (rather than generated inside
/// the loop) so an invocation can be tracked and cancelled by id before it
/// completes.
pub struct PopulateParams {
    /// The search request driving the webset
    pub request: SearchRequest,
    /// Owning user, when known
    pub user_id: Option<String>,
    /// Document id the sheet will be streamed and persisted under
    pub document_id: DocumentId,
}

/// How a populate invocation reached its terminal state
enum Stop {
    /// The remote webset reported the terminal status
    Idle,
    /// The attempt budget ran out first
    TimedOut { attempts: u32 },
    /// The cancellation token fired
    Cancelled,
}

/// Executes webset populate invocations
///
/// Holds the remote client, the document store, the streaming sink and the
/// polling policy. One populator serves any number of sequential or
/// concurrent invocations; all per-invocation state (accumulator, seen ids)
/// lives on the stack of [`run`](Self::run).
pub struct WebsetPopulator {
    client: Arc<WebsetClient>,
    store: Arc<dyn DocumentStore>,
    sink: Arc<dyn DataStreamSink>,
    polling: PollingConfig,
}

impl WebsetPopulator {
    /// Create a populator
    pub fn new(
        client: Arc<WebsetClient>,
        store: Arc<dyn DocumentStore>,
        sink: Arc<dyn DataStreamSink>,
        polling: PollingConfig,
    ) -> Self {
        Self {
            client,
            store,
            sink,
            polling,
        }
    }

    /// Run one populate invocation to completion
    ///
    /// Returns the artifact summary on success. On timeout or cancellation
    /// the partial sheet is persisted and `Finish` emitted before the error
    /// is returned, so the caller still has a usable artifact reference.
    pub async fn run(
        &self,
        params: PopulateParams,
        cancel: CancellationToken,
    ) -> Result<SheetArtifact> {
        let PopulateParams {
            request,
            user_id,
            document_id,
        } = params;
        request.validate()?;

        let title = request.title();

        // Announce the artifact and stream the header-only snapshot before
        // any remote call, so the UI can render an empty table immediately.
        self.sink.write(StreamEvent::Kind {
            kind: ArtifactKind::Sheet,
        });
        self.sink.write(StreamEvent::Id {
            document_id: document_id.clone(),
        });
        self.sink.write(StreamEvent::Title {
            title: title.clone(),
        });
        self.sink.write(StreamEvent::Clear);
        self.write_metadata(None, &request);

        let mut sheet = SheetAccumulator::new(&request);
        self.sink.write(StreamEvent::SheetDelta {
            csv: sheet.snapshot().to_string(),
        });

        // Creating
        let metadata = CreateMetadata {
            document_id: document_id.clone(),
            user_id: user_id.clone(),
            query: request.query.clone(),
            mode: request.mode,
            count: request.count.to_string(),
        };

        let webset = match self.client.create_webset(&request, &metadata).await {
            Ok(webset) => webset,
            Err(e) => {
                tracing::error!(error = %e, document_id = %document_id, "Webset creation failed");
                self.sink.write(StreamEvent::Finish);
                return Err(Error::Client(e));
            }
        };
        info!(webset_id = %webset.id, document_id = %document_id, "Webset created");
        self.write_metadata(Some(webset.id.clone()), &request);

        // Polling
        let stop = self.poll(&webset.id, &mut sheet, &cancel).await;

        // Done (or the bounded/cancelled variants of it)
        self.sink.write(StreamEvent::Finish);

        let artifact = SheetArtifact {
            id: document_id.clone(),
            title: title.clone(),
            kind: ArtifactKind::Sheet,
            content: sheet.snapshot().to_string(),
        };
        let document = NewDocument {
            id: document_id.clone(),
            title,
            kind: ArtifactKind::Sheet,
            content: artifact.content.clone(),
            user_id,
        };

        match stop {
            Stop::Idle => {
                self.store.save_document(document).await?;
                info!(
                    document_id = %document_id,
                    rows = sheet.row_count(),
                    "Webset population complete"
                );
                Ok(artifact)
            }
            Stop::TimedOut { attempts } => {
                // Partial rows still have value; persist before reporting
                if let Err(e) = self.store.save_document(document).await {
                    warn!(error = %e, document_id = %document_id, "Failed to persist partial sheet");
                }
                Err(Error::PollTimeout {
                    document_id,
                    attempts,
                })
            }
            Stop::Cancelled => {
                if let Err(e) = self.store.save_document(document).await {
                    warn!(error = %e, document_id = %document_id, "Failed to persist partial sheet");
                }
                Err(Error::Cancelled { document_id })
            }
        }
    }

    /// Poll until the webset goes idle, the budget runs out, or cancellation
    async fn poll(
        &self,
        webset_id: &WebsetId,
        sheet: &mut SheetAccumulator,
        cancel: &CancellationToken,
    ) -> Stop {
        for attempt in 1..=self.polling.max_attempts {
            if cancel.is_cancelled() {
                info!(webset_id = %webset_id, attempt, "Populate invocation cancelled");
                return Stop::Cancelled;
            }

            // A failed status check skips the whole attempt; the next tick
            // will see any items this one missed, since listings are full
            // snapshots.
            let status = match self.client.get_status(webset_id).await {
                Ok(status) => {
                    debug!(webset_id = %webset_id, attempt, status = %status.status, "Status check");
                    status
                }
                Err(e) => {
                    warn!(error = %e, webset_id = %webset_id, attempt, "Status fetch failed, skipping tick");
                    tokio::time::sleep(self.polling.interval).await;
                    continue;
                }
            };

            match self.client.list_items(webset_id).await {
                Ok(items) => {
                    if sheet.ingest(&items) {
                        debug!(
                            webset_id = %webset_id,
                            rows = sheet.row_count(),
                            "New items materialized"
                        );
                        self.sink.write(StreamEvent::SheetDelta {
                            csv: sheet.snapshot().to_string(),
                        });
                    }
                }
                Err(e) => {
                    warn!(error = %e, webset_id = %webset_id, attempt, "Item listing failed, continuing");
                }
            }

            if status.is_idle() {
                info!(webset_id = %webset_id, attempt, "Webset reached idle");
                return Stop::Idle;
            }

            tokio::time::sleep(self.polling.interval).await;
        }

        warn!(
            webset_id = %webset_id,
            attempts = self.polling.max_attempts,
            "Webset never reached idle within the attempt budget"
        );
        Stop::TimedOut {
            attempts: self.polling.max_attempts,
        }
    }

    fn write_metadata(&self, webset_id: Option<WebsetId>, request: &SearchRequest) {
        self.sink.write(StreamEvent::WebsetMetadata {
            webset_id,
            query: request.query.clone(),
            mode: request.mode,
            criteria: request.criteria.clone(),
        });
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
