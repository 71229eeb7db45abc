//! Per-chat to-do plans
//!
//! Assistant-managed task lists, one plan per chat. All mutation goes
//! through [`PlanStore`], an explicit reducer keyed by chat id: operations
//! are applied one at a time against the stored snapshot, and the store
//! handle is passed into whatever publishes or consumes plan events. There
//! is no ambient global state.
//!
//! [`TodoPlanner`] is the tool surface: it mutates the store and publishes
//! the matching stream event (always a full item snapshot, plus a
//! [`StreamEvent::TodoClear`] when a plan empties) so a consumer that only
//! keeps the latest snapshot stays correct.

use crate::stream::DataStreamSink;
use crate::types::{StreamEvent, TodoItemState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One to-do item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Item id
    pub id: String,
    /// Item text
    pub text: String,
    /// Whether the item is done
    pub is_done: bool,
    /// When the item was created
    pub created_at: DateTime<Utc>,
    /// When the item was last modified
    pub updated_at: DateTime<Utc>,
}

/// A chat's to-do plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPlan {
    /// Chat the plan belongs to
    pub chat_id: String,
    /// Plan title
    pub title: Option<String>,
    /// Items, in display order
    pub items: Vec<TodoItem>,
    /// When the plan was created
    pub created_at: DateTime<Utc>,
    /// When the plan was last modified
    pub updated_at: DateTime<Utc>,
}

impl TodoPlan {
    /// Item snapshot in the shape carried by stream events
    pub fn item_states(&self) -> Vec<TodoItemState> {
        self.items
            .iter()
            .map(|item| TodoItemState {
                id: item.id.clone(),
                text: item.text.clone(),
                is_done: item.is_done,
            })
            .collect()
    }
}

/// Input for creating or replacing plan items
///
/// Callers may hand over bare text (an id is generated) or a full item
/// (id and done state preserved).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodoItem {
    /// Existing item id to preserve, if any
    #[serde(default)]
    pub id: Option<String>,
    /// Item text
    pub text: String,
    /// Initial done state
    #[serde(default)]
    pub is_done: bool,
}

impl From<&str> for NewTodoItem {
    fn from(text: &str) -> Self {
        Self {
            id: None,
            text: text.to_string(),
            is_done: false,
        }
    }
}

/// One plan mutation
///
/// `Add` and `Reorder` position the affected item after `after_id`; a
/// missing or unknown `after_id` appends at the end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TodoOperation {
    /// Mark an item done
    Complete {
        /// Target item id
        id: String,
    },
    /// Mark an item not done
    Uncomplete {
        /// Target item id
        id: String,
    },
    /// Insert a new item
    Add {
        /// Item text
        text: String,
        /// Item to insert after; end of list when absent
        #[serde(default)]
        after_id: Option<String>,
    },
    /// Remove an item
    Remove {
        /// Target item id
        id: String,
    },
    /// Change an item's text
    Rename {
        /// Target item id
        id: String,
        /// New text
        text: String,
    },
    /// Move an item
    Reorder {
        /// Target item id
        id: String,
        /// Item to move after; end of list when absent
        #[serde(default)]
        after_id: Option<String>,
    },
    /// Remove all items
    Clear,
}

/// In-memory plan store, keyed by chat id
///
/// Invocations for different chats are independent; the lock scope is one
/// mutation at a time.
#[derive(Default)]
pub struct PlanStore {
    plans: RwLock<HashMap<String, TodoPlan>>,
}

impl PlanStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current plan for a chat, if any
    pub async fn plan(&self, chat_id: &str) -> Option<TodoPlan> {
        self.plans.read().await.get(chat_id).cloned()
    }

    /// Replace a chat's plan wholesale
    pub async fn replace(
        &self,
        chat_id: &str,
        items: Vec<NewTodoItem>,
        title: Option<String>,
    ) -> TodoPlan {
        let now = Utc::now();
        let items = items
            .into_iter()
            .map(|input| TodoItem {
                id: input
                    .id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                text: input.text,
                is_done: input.is_done,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let plan = TodoPlan {
            chat_id: chat_id.to_string(),
            title,
            items,
            created_at: now,
            updated_at: now,
        };
        self.plans
            .write()
            .await
            .insert(chat_id.to_string(), plan.clone());
        plan
    }

    /// Apply operations to a chat's plan, one at a time
    ///
    /// Creates an empty plan first when the chat has none. A provided title
    /// replaces the stored one; `None` keeps it.
    pub async fn update(
        &self,
        chat_id: &str,
        operations: &[TodoOperation],
        title: Option<String>,
    ) -> TodoPlan {
        let now = Utc::now();
        let mut plans = self.plans.write().await;
        let plan = plans.entry(chat_id.to_string()).or_insert_with(|| TodoPlan {
            chat_id: chat_id.to_string(),
            title: title.clone(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        });

        for operation in operations {
            apply_operation(&mut plan.items, operation, now);
        }

        if let Some(title) = title {
            plan.title = Some(title);
        }
        plan.updated_at = now;
        plan.clone()
    }

    /// Remove a chat's plan entirely
    pub async fn clear(&self, chat_id: &str) {
        self.plans.write().await.remove(chat_id);
    }

    /// Consumer-side reducer for plan stream events
    ///
    /// Mirrors the publishing side: replace/update install the carried
    /// snapshot, clear removes the plan. Non-plan events are ignored.
    pub async fn apply_event(&self, event: &StreamEvent) {
        match event {
            StreamEvent::TodoReplace {
                chat_id,
                title,
                items,
            }
            | StreamEvent::TodoUpdate {
                chat_id,
                title,
                items,
            } => {
                let inputs = items
                    .iter()
                    .map(|state| NewTodoItem {
                        id: Some(state.id.clone()),
                        text: state.text.clone(),
                        is_done: state.is_done,
                    })
                    .collect();
                self.replace(chat_id, inputs, title.clone()).await;
            }
            StreamEvent::TodoClear { chat_id } => {
                self.clear(chat_id).await;
            }
            _ => {}
        }
    }
}

/// Apply a single operation to an item list
fn apply_operation(items: &mut Vec<TodoItem>, operation: &TodoOperation, now: DateTime<Utc>) {
    match operation {
        TodoOperation::Complete { id } => {
            if let Some(item) = items.iter_mut().find(|i| &i.id == id) {
                item.is_done = true;
                item.updated_at = now;
            }
        }
        TodoOperation::Uncomplete { id } => {
            if let Some(item) = items.iter_mut().find(|i| &i.id == id) {
                item.is_done = false;
                item.updated_at = now;
            }
        }
        TodoOperation::Add { text, after_id } => {
            let item = TodoItem {
                id: uuid::Uuid::new_v4().to_string(),
                text: text.clone(),
                is_done: false,
                created_at: now,
                updated_at: now,
            };
            let position = after_id
                .as_ref()
                .and_then(|after| items.iter().position(|i| &i.id == after))
                .map(|idx| idx + 1)
                .unwrap_or(items.len());
            items.insert(position, item);
        }
        TodoOperation::Remove { id } => {
            items.retain(|i| &i.id != id);
        }
        TodoOperation::Rename { id, text } => {
            if let Some(item) = items.iter_mut().find(|i| &i.id == id) {
                item.text = text.clone();
                item.updated_at = now;
            }
        }
        TodoOperation::Reorder { id, after_id } => {
            let Some(index) = items.iter().position(|i| &i.id == id) else {
                return;
            };
            let moved = items.remove(index);
            let position = after_id
                .as_ref()
                .and_then(|after| items.iter().position(|i| &i.id == after))
                .map(|idx| idx + 1)
                .unwrap_or(items.len());
            items.insert(position, moved);
        }
        TodoOperation::Clear => {
            items.clear();
        }
    }
}

/// Tool surface for plan mutation plus event publishing
pub struct TodoPlanner {
    store: Arc<PlanStore>,
    sink: Arc<dyn DataStreamSink>,
}

impl TodoPlanner {
    /// Create a planner over a store and sink
    pub fn new(store: Arc<PlanStore>, sink: Arc<dyn DataStreamSink>) -> Self {
        Self { store, sink }
    }

    /// Create or replace a chat's plan and stream the replacement
    pub async fn create_plan(
        &self,
        chat_id: &str,
        title: impl Into<String>,
        items: Vec<NewTodoItem>,
    ) -> TodoPlan {
        let plan = self
            .store
            .replace(chat_id, items, Some(title.into()))
            .await;

        self.sink.write(StreamEvent::TodoReplace {
            chat_id: chat_id.to_string(),
            title: plan.title.clone(),
            items: plan.item_states(),
        });
        self.clear_if_empty(&plan);
        plan
    }

    /// Apply operations to a chat's plan and stream the updated snapshot
    pub async fn update_plan(
        &self,
        chat_id: &str,
        title: Option<String>,
        operations: &[TodoOperation],
    ) -> TodoPlan {
        let plan = self.store.update(chat_id, operations, title).await;

        self.sink.write(StreamEvent::TodoUpdate {
            chat_id: chat_id.to_string(),
            title: plan.title.clone(),
            items: plan.item_states(),
        });
        self.clear_if_empty(&plan);
        plan
    }

    fn clear_if_empty(&self, plan: &TodoPlan) {
        if plan.items.is_empty() {
            self.sink.write(StreamEvent::TodoClear {
                chat_id: plan.chat_id.clone(),
            });
        }
    }
}
