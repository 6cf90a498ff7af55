//! Framework-agnostic logic shared by every command: row sources, the paginated view
//! state machine, retry policy and the public-access workflow.

/// Owner-gated grant/revert of public read access
pub mod access_grant;
/// Paginated view state machine and rendering model
pub mod paginator;
/// Pet talent pool lookup in the talent sheet
pub mod pool_finder;
/// Retry with exponential backoff for transient remote failures
pub mod retry;
/// Row source abstraction and shared matching helpers
pub mod rows;
/// Solo fight log stored in the database
pub mod solo_fight;
/// Trade record ledger stored in a spreadsheet
pub mod trade_record;
