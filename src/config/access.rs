//! Who besides the invoking user may drive a view.
//!
//! A single delegate (usually the bot operator) can be configured with `DELEGATE_USER_ID`.

use crate::errors::{Error, Result};

/// Environment variable naming the delegate.
pub const DELEGATE_VAR: &str = "DELEGATE_USER_ID";

/// Parses a Discord user id; blank means no delegate.
pub fn parse_delegate(value: &str) -> Result<Option<u64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| Error::Config {
        message: format!("{DELEGATE_VAR} must be a numeric Discord user id, got '{value}'"),
    })
}

/// Reads the delegate from the environment.
pub fn delegate_user_id() -> Result<Option<u64>> {
    match std::env::var(DELEGATE_VAR) {
        Ok(value) => parse_delegate(&value),
        Err(_) => Ok(None),
    }
}
