//! Row sources behind the paginated views.
//!
//! A [`RowSource`] answers a query with a [`RowSet`]: ordered rows of string fields plus
//! the column titles they line up with. Sources may be a SQL table or a spreadsheet range;
//! the views only ever see the strings.

use crate::core::paginator::{PageSnapshot, Row};
use crate::errors::Result;
use async_trait::async_trait;

/// Rows answered by a source, with their shared column titles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    /// Titles parallel to each row's fields
    pub column_titles: Vec<String>,
    /// Matching rows, in source order
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Builds a row set.
    #[must_use]
    pub const fn new(column_titles: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            column_titles,
            rows,
        }
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Freezes the rows into a snapshot for a view.
    pub fn into_snapshot(
        self,
        page_size: usize,
        highlight_terms: impl IntoIterator<Item = String>,
    ) -> Result<PageSnapshot> {
        PageSnapshot::new(self.rows, self.column_titles, page_size, highlight_terms)
    }
}

/// Something that can be queried for rows.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Query criteria understood by the source.
    type Query: Send + Sync + ?Sized;

    /// Rows matching `query`, with column titles.
    async fn fetch_rows(&self, query: &Self::Query) -> Result<RowSet>;
}

/// Case-insensitive substring match of `needle` against any of `cells`.
///
/// An empty needle matches everything.
#[must_use]
pub fn any_cell_contains<S: AsRef<str>>(cells: &[S], needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty()
        || cells
            .iter()
            .any(|cell| cell.as_ref().to_lowercase().contains(&needle))
}
