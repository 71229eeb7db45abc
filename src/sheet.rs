//! Sheet projection and accumulation
//!
//! Turns heterogeneous remote webset items into a fixed-width CSV document.
//! The column schema is derived from the search request: entity columns
//! first, then one column per requested criterion (in request order), then
//! the aggregate `satisfiesAllCriteria` column, then the hidden `pictureUrl`
//! and `_itemId` columns used by the grid's detail lookup.
//!
//! Escaping is applied per cell (quote-wrap with embedded quotes doubled)
//! rather than through a CSV library; header cells are intentionally left
//! unquoted so the grid widget receives bare column names.

use crate::evaluation;
use crate::types::{SearchMode, SearchRequest, WebsetItem};
use std::collections::HashSet;

/// Aggregate column name appended after the criteria columns
pub const SATISFIES_ALL_COLUMN: &str = "satisfiesAllCriteria";

/// Hidden column carrying the entity picture URL
pub const PICTURE_URL_COLUMN: &str = "pictureUrl";

/// Hidden column carrying the remote item id
pub const ITEM_ID_COLUMN: &str = "_itemId";

/// Escape one cell value: wrap in double quotes, doubling embedded quotes
pub fn escape_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Column names for a request, in the fixed schema order
pub fn header_columns(mode: SearchMode, criteria: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = match mode {
        SearchMode::Company => vec!["name".into(), "url".into(), "description".into()],
        SearchMode::Person => vec![
            "name".into(),
            "url".into(),
            "description".into(),
            "position".into(),
            "company".into(),
            "location".into(),
        ],
    };
    columns.extend(criteria.iter().cloned());
    columns.push(SATISFIES_ALL_COLUMN.into());
    columns.push(PICTURE_URL_COLUMN.into());
    columns.push(ITEM_ID_COLUMN.into());
    columns
}

/// Project one remote item into a row of escaped cells
///
/// Cell order matches [`header_columns`] for the same request. Absent entity
/// fields project as empty strings; this function never fails.
pub fn project_row(item: &WebsetItem, request: &SearchRequest) -> Vec<String> {
    let props = &item.properties;
    let url = props.url.as_deref().unwrap_or_default();
    let description = props.description.as_deref().unwrap_or_default();

    let mut cells: Vec<String> = Vec::with_capacity(request.criteria.len() + 9);

    match request.mode {
        SearchMode::Company => {
            let company = props.company.clone().unwrap_or_default();
            cells.push(escape_cell(company.name.as_deref().unwrap_or_default()));
            cells.push(escape_cell(url));
            cells.push(escape_cell(description));
        }
        SearchMode::Person => {
            let person = props.person.clone().unwrap_or_default();
            let employer = person
                .company
                .as_ref()
                .and_then(|c| c.name.as_deref())
                .unwrap_or_default();
            cells.push(escape_cell(person.name.as_deref().unwrap_or_default()));
            cells.push(escape_cell(url));
            cells.push(escape_cell(description));
            cells.push(escape_cell(person.position.as_deref().unwrap_or_default()));
            cells.push(escape_cell(employer));
            cells.push(escape_cell(person.location.as_deref().unwrap_or_default()));
        }
    }

    for criterion in &request.criteria {
        let verdict = evaluation::verdict_for(criterion, &item.evaluations);
        cells.push(escape_cell(&verdict.to_string()));
    }

    let satisfies_all = evaluation::satisfies_all(&request.criteria, &item.evaluations);
    cells.push(escape_cell(if satisfies_all { "true" } else { "false" }));

    let picture_url = match request.mode {
        SearchMode::Company => props
            .company
            .as_ref()
            .and_then(|c| c.logo_url.as_deref())
            .unwrap_or_default(),
        SearchMode::Person => props
            .person
            .as_ref()
            .and_then(|p| p.picture_url.as_deref())
            .unwrap_or_default(),
    };
    cells.push(escape_cell(picture_url));
    cells.push(escape_cell(&item.id));

    cells
}

/// Incrementally accumulated CSV document for one populate invocation
///
/// Owns the growing document text and the set of item ids already
/// materialized. Append-only: once a row is written for an item id it is
/// never rewritten or reordered, so a late re-evaluation of a seen item is
/// not reflected.
pub struct SheetAccumulator {
    request: SearchRequest,
    csv: String,
    seen: HashSet<String>,
}

impl SheetAccumulator {
    /// Start a new document containing exactly the header line
    ///
    /// The header is available immediately, before any remote call, so the
    /// UI can render an empty table while the webset is still being created.
    pub fn new(request: &SearchRequest) -> Self {
        let mut csv = header_columns(request.mode, &request.criteria).join(",");
        csv.push('\n');
        Self {
            request: request.clone(),
            csv,
            seen: HashSet::new(),
        }
    }

    /// Ingest a full item snapshot, appending rows for unseen items
    ///
    /// Items are processed in the order given (the remote listing order, not
    /// sorted). Returns whether any new row was appended.
    pub fn ingest(&mut self, items: &[WebsetItem]) -> bool {
        let mut updated = false;
        for item in items {
            if self.seen.contains(&item.id) {
                continue;
            }
            self.seen.insert(item.id.clone());
            let row = project_row(item, &self.request);
            self.csv.push_str(&row.join(","));
            self.csv.push('\n');
            updated = true;
        }
        updated
    }

    /// The full accumulated CSV text, header included
    pub fn snapshot(&self) -> &str {
        &self.csv
    }

    /// Number of data rows appended so far
    pub fn row_count(&self) -> usize {
        self.seen.len()
    }
}
