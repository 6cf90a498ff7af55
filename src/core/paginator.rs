//! Paginated view state machine.
//!
//! A [`PagedView`] holds an immutable snapshot of rows and a cursor into it. It is driven
//! by [`PagedView::handle_action`], which checks the actor against the owner/delegate
//! pair, applies the navigation action and hands back a [`DisplayUnit`] to render.
//! Nothing in here knows about Discord; the bot layer turns [`DisplayUnit`]s into embeds
//! and button presses into action names.

use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// One record: an ordered sequence of string fields.
pub type Row = Vec<String>;

/// Number of rows per page in the pre-chunked layout.
pub const CHUNK_SIZE: usize = 10;

/// Shown for a column whose value is missing or blank.
pub const FALLBACK_VALUE: &str = "N/A";

/// Default inactivity timeout for toggleable views.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Immutable data behind a view, captured when the command handler has its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    rows: Vec<Row>,
    column_titles: Vec<String>,
    page_size: usize,
    highlight_terms: Vec<String>,
}

impl PageSnapshot {
    /// Builds a snapshot. A `page_size` of zero is rejected.
    ///
    /// Empty highlight terms are dropped since they would match everywhere.
    pub fn new(
        rows: Vec<Row>,
        column_titles: Vec<String>,
        page_size: usize,
        highlight_terms: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }

        let mut terms: Vec<String> = highlight_terms
            .into_iter()
            .filter(|term| !term.is_empty())
            .collect();
        terms.sort();
        terms.dedup();

        Ok(Self {
            rows,
            column_titles,
            page_size,
            highlight_terms: terms,
        })
    }

    /// All rows, in order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column titles shared by every row.
    #[must_use]
    pub fn column_titles(&self) -> &[String] {
        &self.column_titles
    }

    /// Rows summarized per page in summary mode.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Terms emphasized wherever they occur in a value.
    #[must_use]
    pub fn highlight_terms(&self) -> &[String] {
        &self.highlight_terms
    }

    /// Number of rows in the snapshot.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Last valid page index in summary mode: `ceil(row_count / page_size) - 1`,
    /// and 0 for an empty snapshot.
    #[must_use]
    pub fn last_page_index(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).saturating_sub(1)
    }

    /// Rows on summary page `index`, clipped to the row count.
    #[must_use]
    pub fn page(&self, index: usize) -> &[Row] {
        let start = index.saturating_mul(self.page_size).min(self.rows.len());
        let end = start.saturating_add(self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }
}

/// How a toggleable view currently renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// `page_size` rows per page, one field per row
    Summary,
    /// One row per page, one field per column
    Detailed,
}

impl ViewMode {
    const fn flipped(self) -> Self {
        match self {
            Self::Summary => Self::Detailed,
            Self::Detailed => Self::Summary,
        }
    }
}

/// Navigation controls a view understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Jump to index 0
    First,
    /// Step back, clamped at 0
    Previous,
    /// Step forward, clamped at the last index
    Next,
    /// Jump to the last index
    Last,
    /// Flip between summary and detailed mode
    ToggleView,
}

impl NavAction {
    /// Every action, in button order.
    pub const ALL: [Self; 5] = [
        Self::First,
        Self::Previous,
        Self::Next,
        Self::Last,
        Self::ToggleView,
    ];

    /// Stable name used in component ids.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Previous => "prev",
            Self::Next => "next",
            Self::Last => "last",
            Self::ToggleView => "toggle",
        }
    }
}

impl fmt::Display for NavAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::invalid_input(format!("Unknown navigation action '{s}'")))
    }
}

/// Identities allowed to operate a control: the invoking user and one optional delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewAccess {
    /// User who invoked the command
    pub owner_id: u64,
    /// Second user who may also operate the control
    pub delegate_id: Option<u64>,
}

impl ViewAccess {
    /// Access for `owner_id` plus an optional delegate.
    #[must_use]
    pub const fn new(owner_id: u64, delegate_id: Option<u64>) -> Self {
        Self {
            owner_id,
            delegate_id,
        }
    }

    /// `actor == owner || actor == delegate`.
    #[must_use]
    pub fn permits(&self, actor_id: u64) -> bool {
        actor_id == self.owner_id || self.delegate_id == Some(actor_id)
    }
}

/// One named field of a display unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayField {
    /// Field heading
    pub name: String,
    /// Field body
    pub value: String,
}

/// Framework-agnostic page rendering (maps onto one embed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUnit {
    /// Heading of the page
    pub title: String,
    /// Optional text under the title
    pub description: Option<String>,
    /// Body fields
    pub fields: Vec<DisplayField>,
    /// Page indicator, e.g. `Page 2/3`
    pub footer: String,
}

/// Why an action did not change the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The actor is neither owner nor delegate
    Unauthorized,
    /// The view's timeout has elapsed
    Expired,
    /// The action does not exist for this view's layout
    Unsupported,
}

/// Result of [`PagedView::handle_action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action was applied; push this page to the user
    Render(DisplayUnit),
    /// The action was dropped and the view is unchanged
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone)]
enum Layout {
    Paged { mode: ViewMode, toggleable: bool },
    Chunked { pages: Vec<Vec<Row>>, label: String },
}

/// Stateful paginated view over a [`PageSnapshot`].
#[derive(Debug, Clone)]
pub struct PagedView {
    title: String,
    snapshot: PageSnapshot,
    layout: Layout,
    current_index: usize,
    access: ViewAccess,
    timeout: Option<Duration>,
    expires_at: Option<Instant>,
}

impl PagedView {
    /// Summary/detailed view starting in summary mode at page 0.
    #[must_use]
    pub fn toggleable(
        title: impl Into<String>,
        snapshot: PageSnapshot,
        access: ViewAccess,
        timeout: Option<Duration>,
        now: Instant,
    ) -> Self {
        Self::with_layout(
            title.into(),
            snapshot,
            Layout::Paged {
                mode: ViewMode::Summary,
                toggleable: true,
            },
            access,
            timeout,
            now,
        )
    }

    /// Summary-only view; `ToggleView` is unsupported.
    #[must_use]
    pub fn summary_only(
        title: impl Into<String>,
        snapshot: PageSnapshot,
        access: ViewAccess,
        timeout: Option<Duration>,
        now: Instant,
    ) -> Self {
        Self::with_layout(
            title.into(),
            snapshot,
            Layout::Paged {
                mode: ViewMode::Summary,
                toggleable: false,
            },
            access,
            timeout,
            now,
        )
    }

    /// Pre-chunked view: rows are split into groups of [`CHUNK_SIZE`] once, and each
    /// page lists its rows under the fixed `label`. Chunked views have no timeout.
    pub fn chunked(
        title: impl Into<String>,
        rows: Vec<Row>,
        label: impl Into<String>,
        access: ViewAccess,
        now: Instant,
    ) -> Result<Self> {
        let pages: Vec<Vec<Row>> = rows.chunks(CHUNK_SIZE).map(<[Row]>::to_vec).collect();
        let snapshot = PageSnapshot::new(rows, Vec::new(), CHUNK_SIZE, Vec::new())?;
        Ok(Self::with_layout(
            title.into(),
            snapshot,
            Layout::Chunked {
                pages,
                label: label.into(),
            },
            access,
            None,
            now,
        ))
    }

    fn with_layout(
        title: String,
        snapshot: PageSnapshot,
        layout: Layout,
        access: ViewAccess,
        timeout: Option<Duration>,
        now: Instant,
    ) -> Self {
        Self {
            title,
            snapshot,
            layout,
            current_index: 0,
            access,
            timeout,
            expires_at: timeout.map(|t| now + t),
        }
    }

    /// The underlying snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &PageSnapshot {
        &self.snapshot
    }

    /// Current cursor: page number in summary/chunked layouts, row index in detailed mode.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Current mode; chunked views always report `Summary`.
    #[must_use]
    pub const fn mode(&self) -> ViewMode {
        match self.layout {
            Layout::Paged { mode, .. } => mode,
            Layout::Chunked { .. } => ViewMode::Summary,
        }
    }

    /// Whether `ToggleView` is available.
    #[must_use]
    pub const fn supports_toggle(&self) -> bool {
        matches!(
            self.layout,
            Layout::Paged {
                toggleable: true,
                ..
            }
        )
    }

    /// Who may operate the controls.
    #[must_use]
    pub const fn access(&self) -> ViewAccess {
        self.access
    }

    /// Actions to offer as controls, in display order.
    #[must_use]
    pub fn available_actions(&self) -> Vec<NavAction> {
        NavAction::ALL
            .into_iter()
            .filter(|action| *action != NavAction::ToggleView || self.supports_toggle())
            .collect()
    }

    /// Last valid cursor value for the current layout and mode.
    #[must_use]
    pub fn last_index(&self) -> usize {
        match &self.layout {
            Layout::Paged {
                mode: ViewMode::Summary,
                ..
            } => self.snapshot.last_page_index(),
            Layout::Paged {
                mode: ViewMode::Detailed,
                ..
            } => self.snapshot.row_count().saturating_sub(1),
            Layout::Chunked { pages, .. } => pages.len().saturating_sub(1),
        }
    }

    /// Whether the inactivity timeout has elapsed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Time left before the view goes inert; `None` when it never expires.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Authorizes and applies a named action. Unknown names are reported as unsupported.
    pub fn handle_action(&mut self, actor_id: u64, action_name: &str, now: Instant) -> ActionOutcome {
        match action_name.parse::<NavAction>() {
            Ok(action) => self.apply(actor_id, action, now),
            Err(_) => ActionOutcome::Ignored(IgnoreReason::Unsupported),
        }
    }

    /// Authorizes and applies `action`, returning the page to render.
    ///
    /// Expiry is checked before authorization so an inert view rejects everyone alike.
    pub fn apply(&mut self, actor_id: u64, action: NavAction, now: Instant) -> ActionOutcome {
        if self.is_expired(now) {
            return ActionOutcome::Ignored(IgnoreReason::Expired);
        }
        if !self.access.permits(actor_id) {
            tracing::debug!(actor_id, %action, "ignoring navigation from unauthorized actor");
            return ActionOutcome::Ignored(IgnoreReason::Unauthorized);
        }

        match action {
            NavAction::First => self.current_index = 0,
            NavAction::Previous => self.current_index = self.current_index.saturating_sub(1),
            NavAction::Next => self.current_index = (self.current_index + 1).min(self.last_index()),
            NavAction::Last => self.current_index = self.last_index(),
            NavAction::ToggleView => match &mut self.layout {
                Layout::Paged {
                    mode,
                    toggleable: true,
                } => {
                    *mode = mode.flipped();
                    self.current_index = 0;
                }
                _ => return ActionOutcome::Ignored(IgnoreReason::Unsupported),
            },
        }

        self.expires_at = self.timeout.map(|t| now + t);
        ActionOutcome::Render(self.render())
    }

    /// Renders the page under the cursor.
    #[must_use]
    pub fn render(&self) -> DisplayUnit {
        let footer = format!("Page {}/{}", self.current_index + 1, self.last_index() + 1);
        let terms = self.snapshot.highlight_terms();

        match &self.layout {
            Layout::Paged {
                mode: ViewMode::Summary,
                ..
            } => {
                let first = self.current_index * self.snapshot.page_size();
                let fields = self
                    .snapshot
                    .page(self.current_index)
                    .iter()
                    .enumerate()
                    .map(|(offset, row)| DisplayField {
                        name: format!("#{}", first + offset + 1),
                        value: self.summary_line(row, terms),
                    })
                    .collect();
                self.unit(fields, footer)
            }
            Layout::Paged {
                mode: ViewMode::Detailed,
                ..
            } => {
                let fields = self
                    .snapshot
                    .rows()
                    .get(self.current_index)
                    .map(|row| {
                        self.snapshot
                            .column_titles()
                            .iter()
                            .enumerate()
                            .map(|(col, title)| DisplayField {
                                name: title.clone(),
                                value: highlight(cell_or_fallback(row, col), terms),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                self.unit(fields, footer)
            }
            Layout::Chunked { pages, label } => {
                let fields = pages
                    .get(self.current_index)
                    .map(|page| {
                        let value = page
                            .iter()
                            .map(|row| row.join(" - "))
                            .collect::<Vec<_>>()
                            .join("\n");
                        vec![DisplayField {
                            name: label.clone(),
                            value,
                        }]
                    })
                    .unwrap_or_default();
                self.unit(fields, footer)
            }
        }
    }

    fn summary_line(&self, row: &[String], terms: &[String]) -> String {
        self.snapshot
            .column_titles()
            .iter()
            .enumerate()
            .map(|(col, title)| format!("{title}: {}", highlight(cell_or_fallback(row, col), terms)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn unit(&self, fields: Vec<DisplayField>, footer: String) -> DisplayUnit {
        let description = if self.snapshot.row_count() == 0 {
            Some("No entries.".to_string())
        } else {
            None
        };
        DisplayUnit {
            title: self.title.clone(),
            description,
            fields,
            footer,
        }
    }
}

fn cell_or_fallback(row: &[String], col: usize) -> &str {
    match row.get(col).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => value,
        _ => FALLBACK_VALUE,
    }
}

/// Wraps every literal occurrence of any term in `**bold**`.
///
/// Matching is substring based and overlapping occurrences are merged into one
/// emphasized span, so the markers always balance.
#[must_use]
pub fn highlight(value: &str, terms: &[String]) -> String {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for term in terms.iter().filter(|t| !t.is_empty()) {
        let mut from = 0;
        while let Some(pos) = value[from..].find(term.as_str()) {
            let start = from + pos;
            spans.push((start, start + term.len()));
            // advance one char so overlapping occurrences are found too
            from = start + value[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    if spans.is_empty() {
        return value.to_string();
    }

    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(value.len() + merged.len() * 4);
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(&value[cursor..start]);
        out.push_str("**");
        out.push_str(&value[start..end]);
        out.push_str("**");
        cursor = end;
    }
    out.push_str(&value[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const OWNER: u64 = 1;
    const DELEGATE: u64 = 2;
    const STRANGER: u64 = 3;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| vec![format!("world{i}"), format!("mob{i}")])
            .collect()
    }

    fn titles() -> Vec<String> {
        vec!["World".to_string(), "Mob".to_string()]
    }

    fn view(n: usize, page_size: usize) -> (PagedView, Instant) {
        let now = Instant::now();
        let snapshot = PageSnapshot::new(rows(n), titles(), page_size, Vec::new()).unwrap();
        let view = PagedView::toggleable(
            "Results",
            snapshot,
            ViewAccess::new(OWNER, Some(DELEGATE)),
            Some(DEFAULT_TIMEOUT),
            now,
        );
        (view, now)
    }

    fn rendered(outcome: ActionOutcome) -> DisplayUnit {
        match outcome {
            ActionOutcome::Render(unit) => unit,
            ActionOutcome::Ignored(reason) => panic!("expected render, got {reason:?}"),
        }
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let result = PageSnapshot::new(rows(3), titles(), 0, Vec::new());
        assert!(matches!(result, Err(Error::InvalidPageSize)));
    }

    #[test]
    fn test_last_page_index_matches_ceiling_formula() {
        for row_count in 0..40 {
            for page_size in 1..12 {
                let snapshot =
                    PageSnapshot::new(rows(row_count), titles(), page_size, Vec::new()).unwrap();
                let expected = if row_count == 0 {
                    0
                } else {
                    row_count.div_ceil(page_size) - 1
                };
                assert_eq!(snapshot.last_page_index(), expected);
            }
        }
    }

    #[test]
    fn test_twelve_rows_five_per_page() {
        let (mut view, now) = view(12, 5);
        let snapshot = view.snapshot().clone();
        assert_eq!(snapshot.page(0), &snapshot.rows()[0..5]);
        assert_eq!(snapshot.page(1), &snapshot.rows()[5..10]);
        assert_eq!(snapshot.page(2), &snapshot.rows()[10..12]);
        assert_eq!(view.last_index(), 2);

        let unit = rendered(view.apply(OWNER, NavAction::Last, now));
        assert_eq!(unit.footer, "Page 3/3");
        assert_eq!(unit.fields.len(), 2);
        assert_eq!(unit.fields[0].name, "#11");
        assert_eq!(unit.fields[0].value, "World: world10\nMob: mob10");
    }

    #[test]
    fn test_next_then_previous_returns_to_interior_page() {
        let (mut view, now) = view(30, 5);
        view.apply(OWNER, NavAction::Next, now);
        view.apply(OWNER, NavAction::Next, now);
        assert_eq!(view.current_index(), 2);

        view.apply(OWNER, NavAction::Next, now);
        view.apply(OWNER, NavAction::Previous, now);
        assert_eq!(view.current_index(), 2);
    }

    #[test]
    fn test_navigation_clamps_at_boundaries() {
        let (mut view, now) = view(7, 5);
        view.apply(OWNER, NavAction::Previous, now);
        assert_eq!(view.current_index(), 0);

        view.apply(OWNER, NavAction::Next, now);
        view.apply(OWNER, NavAction::Next, now);
        assert_eq!(view.current_index(), 1);

        view.apply(DELEGATE, NavAction::First, now);
        assert_eq!(view.current_index(), 0);
        view.apply(DELEGATE, NavAction::Last, now);
        assert_eq!(view.current_index(), view.last_index());
    }

    #[test]
    fn test_unauthorized_actor_changes_nothing() {
        let (mut view, now) = view(20, 5);
        view.apply(OWNER, NavAction::Next, now);

        for action in NavAction::ALL {
            let outcome = view.apply(STRANGER, action, now);
            assert_eq!(outcome, ActionOutcome::Ignored(IgnoreReason::Unauthorized));
            assert_eq!(view.current_index(), 1);
            assert_eq!(view.mode(), ViewMode::Summary);
        }
    }

    #[test]
    fn test_view_without_delegate_only_accepts_owner() {
        let now = Instant::now();
        let snapshot = PageSnapshot::new(rows(10), titles(), 5, Vec::new()).unwrap();
        let mut view =
            PagedView::summary_only("Results", snapshot, ViewAccess::new(OWNER, None), None, now);

        assert_eq!(
            view.apply(DELEGATE, NavAction::Next, now),
            ActionOutcome::Ignored(IgnoreReason::Unauthorized)
        );
        assert_eq!(view.current_index(), 0);
        rendered(view.apply(OWNER, NavAction::Next, now));
        assert_eq!(view.current_index(), 1);
    }

    #[test]
    fn test_toggle_resets_index_and_switches_to_rows() {
        let (mut view, now) = view(12, 5);
        view.apply(OWNER, NavAction::Last, now);

        let unit = rendered(view.apply(OWNER, NavAction::ToggleView, now));
        assert_eq!(view.mode(), ViewMode::Detailed);
        assert_eq!(view.current_index(), 0);
        assert_eq!(view.last_index(), 11);
        assert_eq!(unit.footer, "Page 1/12");
        assert_eq!(unit.fields.len(), 2);
        assert_eq!(unit.fields[0].name, "World");
        assert_eq!(unit.fields[0].value, "world0");

        view.apply(OWNER, NavAction::Next, now);
        let unit = rendered(view.apply(OWNER, NavAction::ToggleView, now));
        assert_eq!(view.mode(), ViewMode::Summary);
        assert_eq!(view.current_index(), 0);
        assert_eq!(unit.fields[0].value, "World: world0\nMob: mob0");
    }

    #[test]
    fn test_empty_snapshot_is_a_single_empty_page() {
        let (mut view, now) = view(0, 5);
        assert_eq!(view.last_index(), 0);

        let unit = rendered(view.apply(OWNER, NavAction::Next, now));
        assert_eq!(unit.footer, "Page 1/1");
        assert!(unit.fields.is_empty());
        assert_eq!(unit.description.as_deref(), Some("No entries."));

        let unit = rendered(view.apply(OWNER, NavAction::ToggleView, now));
        assert_eq!(view.last_index(), 0);
        assert!(unit.fields.is_empty());
    }

    #[test]
    fn test_expired_view_is_inert() {
        let (mut view, now) = view(20, 5);
        let later = now + DEFAULT_TIMEOUT;
        assert!(view.is_expired(later));
        assert_eq!(
            view.apply(OWNER, NavAction::Next, later),
            ActionOutcome::Ignored(IgnoreReason::Expired)
        );
        assert_eq!(view.current_index(), 0);
    }

    #[test]
    fn test_accepted_action_extends_deadline() {
        let (mut view, now) = view(20, 5);
        let almost = now + DEFAULT_TIMEOUT - Duration::from_secs(1);
        rendered(view.apply(OWNER, NavAction::Next, almost));

        assert!(!view.is_expired(now + DEFAULT_TIMEOUT));
        assert_eq!(view.remaining(almost), Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_unauthorized_action_does_not_extend_deadline() {
        let (mut view, now) = view(20, 5);
        let almost = now + DEFAULT_TIMEOUT - Duration::from_secs(1);
        view.apply(STRANGER, NavAction::Next, almost);
        assert!(view.is_expired(now + DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_handle_action_parses_names() {
        let (mut view, now) = view(20, 5);
        rendered(view.handle_action(OWNER, "next", now));
        assert_eq!(view.current_index(), 1);
        assert_eq!(
            view.handle_action(OWNER, "sideways", now),
            ActionOutcome::Ignored(IgnoreReason::Unsupported)
        );
        assert_eq!(view.current_index(), 1);
    }

    #[test]
    fn test_summary_only_rejects_toggle() {
        let now = Instant::now();
        let snapshot = PageSnapshot::new(rows(10), titles(), 5, Vec::new()).unwrap();
        let mut view =
            PagedView::summary_only("Results", snapshot, ViewAccess::new(OWNER, None), None, now);
        assert!(!view.available_actions().contains(&NavAction::ToggleView));
        assert_eq!(
            view.apply(OWNER, NavAction::ToggleView, now),
            ActionOutcome::Ignored(IgnoreReason::Unsupported)
        );
        assert_eq!(view.mode(), ViewMode::Summary);
    }

    #[test]
    fn test_chunked_view_pages_by_ten() {
        let now = Instant::now();
        let mut view = PagedView::chunked(
            "Talent pools",
            rows(23),
            "Talents",
            ViewAccess::new(OWNER, None),
            now,
        )
        .unwrap();
        assert_eq!(view.last_index(), 2);
        assert!(view.remaining(now).is_none());
        assert!(!view.supports_toggle());

        let first = view.render();
        assert_eq!(first.fields.len(), 1);
        assert_eq!(first.fields[0].name, "Talents");
        assert_eq!(first.fields[0].value.lines().count(), 10);
        assert!(first.fields[0].value.starts_with("world0 - mob0\n"));

        let last = rendered(view.apply(OWNER, NavAction::Last, now + Duration::from_secs(86_400)));
        assert_eq!(last.footer, "Page 3/3");
        assert_eq!(last.fields[0].value, "world20 - mob20\nworld21 - mob21\nworld22 - mob22");
    }

    #[test]
    fn test_missing_cells_use_fallback() {
        let now = Instant::now();
        let snapshot = PageSnapshot::new(
            vec![vec!["only".to_string(), "  ".to_string()]],
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            5,
            Vec::new(),
        )
        .unwrap();
        let view =
            PagedView::toggleable("Results", snapshot, ViewAccess::new(OWNER, None), None, now);
        assert_eq!(view.render().fields[0].value, "A: only\nB: N/A\nC: N/A");
    }

    #[test]
    fn test_highlight_matches_inside_words() {
        let terms = vec!["foo".to_string()];
        assert_eq!(highlight("foobar", &terms), "**foo**bar");
        assert_eq!(highlight("a foo and foo", &terms), "a **foo** and **foo**");
        assert_eq!(highlight("bar", &terms), "bar");
    }

    #[test]
    fn test_highlight_merges_overlapping_terms() {
        let terms = vec!["aa".to_string()];
        assert_eq!(highlight("aaa", &terms), "**aaa**");

        let terms = vec!["foo".to_string(), "oba".to_string()];
        assert_eq!(highlight("foobar", &terms), "**fooba**r");
    }

    #[test]
    fn test_highlight_is_applied_in_rendering() {
        let now = Instant::now();
        let snapshot = PageSnapshot::new(
            vec![vec!["Foobar".to_string(), "foobar".to_string()]],
            titles(),
            5,
            vec!["foo".to_string(), String::new()],
        )
        .unwrap();
        assert_eq!(snapshot.highlight_terms(), ["foo".to_string()]);
        let view =
            PagedView::toggleable("Results", snapshot, ViewAccess::new(OWNER, None), None, now);
        assert_eq!(
            view.render().fields[0].value,
            "World: Foobar\nMob: **foo**bar"
        );
    }
}
