//! Discord interaction handlers
//!
//! Button-driven hosts for the views opened by commands.

/// Paginated view host (navigation and toggle buttons)
pub mod pagination;
/// Revoke control for shared files
pub mod share;

use crate::errors::Result;
use tracing::warn;

/// Combines the result of an interaction loop with the edit that strips its buttons.
///
/// The loop's error wins; when both fail the cleanup error is only logged.
pub(crate) fn settle(outcome: Result<()>, cleanup: Result<()>) -> Result<()> {
    match (outcome, cleanup) {
        (Err(e), Err(cleanup)) => {
            warn!(error = %cleanup, "failed to remove controls after an interaction error");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), cleanup) => cleanup,
    }
}
