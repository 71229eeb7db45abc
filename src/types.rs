//! Core types for webset-tools

use serde::{Deserialize, Serialize};

/// Unique identifier for a remote webset job, assigned by the remote service
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebsetId(pub String);

impl WebsetId {
    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WebsetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for WebsetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for WebsetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a document artifact
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// Generate a fresh random document id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Search entity type, mapped to the remote service's `entity.type` value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Search for organisations
    Company,
    /// Search for individual people
    Person,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Company => write!(f, "company"),
            SearchMode::Person => write!(f, "person"),
        }
    }
}

/// Parameters of one webset populate invocation
///
/// Immutable once created. The order of `criteria` is significant: it defines
/// the column order of the resulting sheet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Plain-English description of what to find,
    /// e.g. "Seed-stage B2B SaaS startups in Germany"
    pub query: String,

    /// Entity type to search for
    pub mode: SearchMode,

    /// One or more inclusion criteria, each evaluated independently per
    /// discovered entity and each becoming a sheet column
    pub criteria: Vec<String>,

    /// Target number of rows (1 to 1000)
    pub count: u32,
}

impl SearchRequest {
    /// Validate the request before any remote call is made
    pub fn validate(&self) -> crate::Result<()> {
        if self.query.trim().len() < 3 {
            return Err(crate::Error::Validation(
                "query must be at least 3 characters".to_string(),
            ));
        }
        if self.criteria.is_empty() {
            return Err(crate::Error::Validation(
                "at least one criterion is required".to_string(),
            ));
        }
        if self.criteria.iter().any(|c| c.trim().is_empty()) {
            return Err(crate::Error::Validation(
                "criteria must be non-empty strings".to_string(),
            ));
        }
        if self.count == 0 || self.count > 1000 {
            return Err(crate::Error::Validation(
                "count must be between 1 and 1000".to_string(),
            ));
        }
        Ok(())
    }

    /// Display title for the artifact produced by this request
    pub fn title(&self) -> String {
        format!("{} webset for \"{}\"", self.mode, self.query)
    }
}

/// Tri-state outcome of evaluating one criterion against one entity
///
/// The remote service reports verdicts under inconsistent keys and
/// vocabularies; [`crate::evaluation`] normalizes all of them into this
/// closed enum. The raw shapes never travel past that boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The criterion is satisfied
    Match,
    /// The criterion is not satisfied
    Miss,
    /// The verdict is absent, pending, or unrecognized
    Unknown,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Match => write!(f, "Match"),
            Verdict::Miss => write!(f, "Miss"),
            Verdict::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One discovered entity, as returned by the remote item listing
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WebsetItem {
    /// Opaque id, unique per webset; the identity key for deduplication
    pub id: String,

    /// Nested entity properties
    #[serde(default)]
    pub properties: ItemProperties,

    /// Per-criterion verdict records, in remote order
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,

    /// Enrichment payloads, passed through untouched for detail views
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enrichments: Vec<serde_json::Value>,
}

/// Nested properties of a [`WebsetItem`]
///
/// Exactly one of `company` / `person` is expected to be present depending on
/// the search mode, but nothing is guaranteed: every field defaults to absent
/// and projection treats absent as empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProperties {
    /// Canonical URL of the entity
    #[serde(default)]
    pub url: Option<String>,

    /// Relevance summary / description text
    #[serde(default)]
    pub description: Option<String>,

    /// Company-specific fields (mode = company)
    #[serde(default)]
    pub company: Option<CompanyProperties>,

    /// Person-specific fields (mode = person)
    #[serde(default)]
    pub person: Option<PersonProperties>,
}

/// Company-specific item properties
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProperties {
    /// Company name
    #[serde(default)]
    pub name: Option<String>,

    /// Logo image URL
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Person-specific item properties
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProperties {
    /// Person name
    #[serde(default)]
    pub name: Option<String>,

    /// Current position / job title
    #[serde(default)]
    pub position: Option<String>,

    /// Location string
    #[serde(default)]
    pub location: Option<String>,

    /// Profile picture URL
    #[serde(default)]
    pub picture_url: Option<String>,

    /// Current employer
    #[serde(default)]
    pub company: Option<PersonCompany>,
}

/// Employer reference nested inside [`PersonProperties`]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCompany {
    /// Employer name
    #[serde(default)]
    pub name: Option<String>,
}

/// One per-criterion verdict record, in its raw remote shape
///
/// The criterion is either a bare string or an object carrying a
/// `description`; the verdict lives under `satisfied` or `result` and may be
/// a string or a boolean. Use [`crate::evaluation`] to read this; nothing
/// else should.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Criterion reference, string or object form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion: Option<CriterionField>,

    /// Verdict under the `satisfied` key, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfied: Option<serde_json::Value>,

    /// Verdict under the `result` key, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Free-text reasoning, shown in detail views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// The two wire representations of an evaluation's criterion
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionField {
    /// Bare string form
    Text(String),
    /// Object form with a `description` field
    Detailed {
        /// Criterion description text
        #[serde(default)]
        description: String,
    },
}

/// Kind of document artifact
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Prose document
    Text,
    /// Code document
    Code,
    /// Image document
    Image,
    /// CSV-backed spreadsheet
    Sheet,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Text => write!(f, "text"),
            ArtifactKind::Code => write!(f, "code"),
            ArtifactKind::Image => write!(f, "image"),
            ArtifactKind::Sheet => write!(f, "sheet"),
        }
    }
}

/// Summary of a populated sheet artifact, returned to the tool caller
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SheetArtifact {
    /// Document id the sheet was persisted under
    pub id: DocumentId,
    /// Display title
    pub title: String,
    /// Always [`ArtifactKind::Sheet`] for webset results
    pub kind: ArtifactKind,
    /// Final CSV text
    pub content: String,
}

/// Minimal to-do item state carried by stream events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemState {
    /// Item id
    pub id: String,
    /// Item text
    pub text: String,
    /// Whether the item is done
    pub is_done: bool,
}

/// Event emitted on the UI data stream during tool execution
///
/// Events are ordered per invocation: an artifact announcement
/// (`Kind`/`Id`/`Title`/`Clear`), metadata, zero or more snapshot deltas and
/// a terminal `Finish`. Each `SheetDelta` carries the **entire** accumulated
/// CSV text, not an increment; consumers keep only the latest snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Artifact kind announcement
    Kind {
        /// Kind of the artifact being streamed
        kind: ArtifactKind,
    },

    /// Artifact document id announcement
    Id {
        /// Document id of the artifact being streamed
        document_id: DocumentId,
    },

    /// Artifact title announcement
    Title {
        /// Display title
        title: String,
    },

    /// Reset the artifact content before streaming begins
    Clear,

    /// Webset association for the artifact; sent once with `webset_id: None`
    /// before creation and again with the real id after
    WebsetMetadata {
        /// Remote webset id, once known
        webset_id: Option<WebsetId>,
        /// Original query text
        query: String,
        /// Search mode
        mode: SearchMode,
        /// Requested criteria, in column order
        criteria: Vec<String>,
    },

    /// Full-snapshot CSV delta
    SheetDelta {
        /// The entire accumulated CSV text
        csv: String,
    },

    /// Terminal event; the artifact is no longer streaming
    Finish,

    /// A to-do plan was created or replaced wholesale
    TodoReplace {
        /// Chat the plan belongs to
        chat_id: String,
        /// Plan title
        title: Option<String>,
        /// Full item snapshot
        items: Vec<TodoItemState>,
    },

    /// A to-do plan was updated; carries the full post-update snapshot
    TodoUpdate {
        /// Chat the plan belongs to
        chat_id: String,
        /// Plan title
        title: Option<String>,
        /// Full item snapshot
        items: Vec<TodoItemState>,
    },

    /// A to-do plan was removed
    TodoClear {
        /// Chat the plan belonged to
        chat_id: String,
    },
}
