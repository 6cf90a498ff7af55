//! Sheets v4 client.
//!
//! Ranges are read through `spreadsheets.get` with grid data so that a cell's entered
//! formula is visible next to its formatted value; that is how `=HYPERLINK(...)` cells
//! are decomposed into display text and URL.

use super::{GoogleAuth, endpoint, send};
use crate::errors::Result;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument};

/// Fallback for a cell with no formatted value.
pub const EMPTY_CELL: &str = "N/A";

#[allow(clippy::unwrap_used)] // literal pattern
static HYPERLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^=\s*HYPERLINK\(\s*"(.*?)"\s*[,;]\s*"(.*?)"\s*\)$"#).unwrap()
});

/// One cell of a fetched range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Plain formatted value
    Text(String),
    /// A `=HYPERLINK("url","text")` cell
    Link {
        /// Label shown in the sheet
        text: String,
        /// Link target
        url: String,
    },
}

impl Cell {
    /// Text shown in the sheet.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Link { text, .. } => text,
        }
    }

    /// Link target, if the cell is a hyperlink.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Link { url, .. } => Some(url),
        }
    }

    /// Markdown rendering: `[text](url)` for links, the text otherwise.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Link { text, url } => format!("[{text}]({url})"),
        }
    }
}

/// Splits `=HYPERLINK("url","text")` into `(text, url)`.
#[must_use]
pub fn parse_hyperlink(formula: &str) -> Option<(String, String)> {
    HYPERLINK
        .captures(formula.trim())
        .map(|caps| (caps[2].to_string(), caps[1].to_string()))
}

#[derive(Debug, Default, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetData>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetData {
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    #[serde(default)]
    row_data: Vec<RowData>,
}

#[derive(Debug, Default, Deserialize)]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    formatted_value: Option<String>,
    user_entered_value: Option<ExtendedValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtendedValue {
    formula_value: Option<String>,
}

impl CellData {
    fn into_cell(self) -> Cell {
        let link = self
            .user_entered_value
            .and_then(|v| v.formula_value)
            .and_then(|formula| parse_hyperlink(&formula));
        match link {
            Some((text, url)) => Cell::Link { text, url },
            None => Cell::Text(
                self.formatted_value
                    .unwrap_or_else(|| EMPTY_CELL.to_string()),
            ),
        }
    }
}

/// Sheets API client.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    auth: Arc<GoogleAuth>,
    base_url: String,
}

impl SheetsClient {
    /// Client against `base_url` (normally [`super::SHEETS_BASE_URL`]).
    #[must_use]
    pub fn new(http: reqwest::Client, auth: Arc<GoogleAuth>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into(),
        }
    }

    /// Reads an A1 range (e.g. `'Sheet'!A2:C`) as rows of cells.
    ///
    /// Trailing empty cells are omitted by the API, so rows may be ragged.
    #[instrument(skip(self))]
    pub async fn fetch_cells(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<Cell>>> {
        let url = endpoint(&self.base_url, &["spreadsheets", spreadsheet_id])?;
        let request = self.http.get(url).query(&[
            ("ranges", range),
            (
                "fields",
                "sheets.data.rowData.values(formattedValue,userEnteredValue)",
            ),
        ]);
        let response: SpreadsheetResponse = send("sheets", &self.auth, request).await?.json().await?;

        let rows: Vec<Vec<Cell>> = response
            .sheets
            .into_iter()
            .next()
            .and_then(|sheet| sheet.data.into_iter().next())
            .map(|grid| {
                grid.row_data
                    .into_iter()
                    .map(|row| row.values.into_iter().map(CellData::into_cell).collect())
                    .collect()
            })
            .unwrap_or_default();
        debug!(rows = rows.len(), "fetched sheet range");
        Ok(rows)
    }

    /// Appends one row after the table found in `range`, parsing values as if typed.
    #[instrument(skip(self, values))]
    pub async fn append_row(&self, spreadsheet_id: &str, range: &str, values: &[String]) -> Result<()> {
        let append = format!("{range}:append");
        let url = endpoint(
            &self.base_url,
            &["spreadsheets", spreadsheet_id, "values", &append],
        )?;
        let request = self
            .http
            .post(url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&serde_json::json!({ "values": [values] }));
        send("sheets", &self.auth, request).await?;
        Ok(())
    }
}
