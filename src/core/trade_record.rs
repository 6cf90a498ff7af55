//! Trade record ledger kept in a spreadsheet.
//!
//! The configured range starts with a header row that supplies the column titles; every
//! following row is one trade. Searching matches any cell case-insensitively.

use crate::{
    core::{
        paginator::Row,
        rows::{RowSet, RowSource, any_cell_contains},
    },
    errors::{Error, Result},
    google::{Cell, SheetsClient},
};
use async_trait::async_trait;

/// Usage line shown when an `addtrade` entry cannot be parsed.
pub const TRADE_USAGE: &str =
    "Invalid trade format. Please use: !addtrade <field> - <field> - ... (one value per sheet column)";

/// Splits header and records; hyperlinks render as markdown links.
#[must_use]
pub fn split_header(cells: Vec<Vec<Cell>>) -> RowSet {
    let mut rows = cells.into_iter().map(|row| {
        row.iter()
            .map(Cell::to_markdown)
            .collect::<Row>()
    });
    let column_titles = rows.next().unwrap_or_default();
    RowSet::new(column_titles, rows.filter(|row| !row.is_empty()).collect())
}

/// Keeps records where any cell contains `criteria`, ignoring case.
#[must_use]
pub fn search_trades(set: RowSet, criteria: &str) -> RowSet {
    let RowSet {
        column_titles,
        rows,
    } = set;
    let rows = rows
        .into_iter()
        .filter(|row| any_cell_contains(row, criteria))
        .collect();
    RowSet::new(column_titles, rows)
}

/// Separator between trade values. Bare hyphens stay inside a value, so dates and
/// negative amounts survive.
pub const TRADE_SEPARATOR: &str = " - ";

/// Parses `a - b - c` into trimmed cell values for appending.
pub fn parse_trade_entry(text: &str) -> Result<Vec<String>> {
    let values: Vec<String> = text
        .split(TRADE_SEPARATOR)
        .map(|v| v.trim().to_string())
        .collect();
    if values.len() < 2 || values.iter().all(String::is_empty) {
        return Err(Error::invalid_input(TRADE_USAGE));
    }
    Ok(values)
}

/// [`RowSource`] over the trade record range.
#[derive(Debug, Clone)]
pub struct TradeRecordSource {
    sheets: SheetsClient,
    spreadsheet_id: String,
    range: String,
}

impl TradeRecordSource {
    /// Source reading `range` (header row included) of `spreadsheet_id`.
    #[must_use]
    pub fn new(sheets: SheetsClient, spreadsheet_id: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            sheets,
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
        }
    }

    /// Appends one trade below the existing records.
    pub async fn append_trade(&self, values: &[String]) -> Result<()> {
        self.sheets
            .append_row(&self.spreadsheet_id, &self.range, values)
            .await
    }
}

#[async_trait]
impl RowSource for TradeRecordSource {
    type Query = str;

    async fn fetch_rows(&self, criteria: &str) -> Result<RowSet> {
        let cells = self
            .sheets
            .fetch_cells(&self.spreadsheet_id, &self.range)
            .await?;
        Ok(search_trades(split_header(cells), criteria))
    }
}
