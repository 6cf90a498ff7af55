//! Pet talent pool finder.
//!
//! The talent sheet lists one pool per row: pool name, talent (often a `HYPERLINK`
//! cell) and talent type. A lookup keeps the rows whose type equals either of the two
//! requested types and renders them for the pre-chunked view.

use crate::{
    core::{
        paginator::Row,
        rows::{RowSet, RowSource},
    },
    errors::Result,
    google::{Cell, SheetsClient},
};
use async_trait::async_trait;

/// Default sheet holding the talent table.
pub const DEFAULT_SHEET_NAME: &str = "Talents Between Filter";
/// Default range within the sheet (header row excluded).
pub const DEFAULT_RANGE: &str = "A2:C";
/// Field label of every page of the talent view.
pub const FIELD_LABEL: &str = "Talents";

const POOL_COLUMN: usize = 0;
const TALENT_COLUMN: usize = 1;
const TYPE_COLUMN: usize = 2;

/// The two talent types to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalentQuery {
    /// First talent type
    pub first: String,
    /// Second talent type
    pub second: String,
}

impl TalentQuery {
    /// Query for `first` or `second`.
    #[must_use]
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    fn matches(&self, talent_type: &str) -> bool {
        talent_type == self.first || talent_type == self.second
    }
}

/// Full A1 range: `'<sheet>'!<range>`.
#[must_use]
pub fn full_range(sheet_name: &str, range: &str) -> String {
    format!("'{}'!{range}", sheet_name.replace('\'', "''"))
}

/// Keeps rows with a type cell equal to one of the query's types and renders each as
/// `[talent](url) - pool - type`. Rows missing the type column are skipped.
#[must_use]
pub fn find_talent_pools(cells: &[Vec<Cell>], query: &TalentQuery) -> Vec<Row> {
    cells
        .iter()
        .filter(|row| row.get(TYPE_COLUMN).is_some_and(|cell| query.matches(cell.text())))
        .map(|row| {
            vec![
                row[TALENT_COLUMN].to_markdown(),
                row[POOL_COLUMN].text().to_string(),
                row[TYPE_COLUMN].text().to_string(),
            ]
        })
        .collect()
}

/// [`RowSource`] over the talent sheet.
#[derive(Debug, Clone)]
pub struct TalentPoolSource {
    sheets: SheetsClient,
    spreadsheet_id: String,
    range: String,
}

impl TalentPoolSource {
    /// Source reading `range` of `sheet_name` in `spreadsheet_id`.
    #[must_use]
    pub fn new(sheets: SheetsClient, spreadsheet_id: impl Into<String>, sheet_name: &str, range: &str) -> Self {
        Self {
            sheets,
            spreadsheet_id: spreadsheet_id.into(),
            range: full_range(sheet_name, range),
        }
    }
}

#[async_trait]
impl RowSource for TalentPoolSource {
    type Query = TalentQuery;

    async fn fetch_rows(&self, query: &TalentQuery) -> Result<RowSet> {
        let cells = self
            .sheets
            .fetch_cells(&self.spreadsheet_id, &self.range)
            .await?;
        let rows = find_talent_pools(&cells, query);
        tracing::debug!(fetched = cells.len(), matched = rows.len(), "talent pool lookup");
        Ok(RowSet::new(
            vec![FIELD_LABEL.to_string()],
            rows,
        ))
    }
}
