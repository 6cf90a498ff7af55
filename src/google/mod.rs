//! Thin REST clients for the Google Sheets and Drive APIs.
//!
//! Only the handful of calls the bots need are implemented. Every call goes through
//! `send`, which attaches a bearer token and turns non-success statuses into
//! [`Error::External`] so the retry policy can classify them.

/// OAuth bearer tokens
pub mod auth;
/// Drive v3 files and permissions; implements the permission store
pub mod drive;
/// Sheets v4 range reads and row appends
pub mod sheets;

pub use auth::{Credentials, GoogleAuth};
pub use drive::DriveClient;
pub use sheets::{Cell, SheetsClient};

use crate::errors::{Error, Result};
use reqwest::{RequestBuilder, Response, Url};

/// Default Sheets v4 endpoint.
pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
/// Default Drive v3 endpoint.
pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
/// Default OAuth token endpoint.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Longest error body kept in an [`Error::External`] message.
const MAX_ERROR_BODY: usize = 300;

/// Appends percent-encoded path segments to `base`.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| Error::Config {
        message: format!("Invalid API base URL '{base}': {e}"),
    })?;
    url.path_segments_mut()
        .map_err(|()| Error::Config {
            message: format!("API base URL '{base}' cannot take a path"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sends `request` with a bearer token and fails on non-success statuses.
pub(crate) async fn send(
    service: &'static str,
    auth: &GoogleAuth,
    request: RequestBuilder,
) -> Result<Response> {
    let token = auth.access_token().await?;
    let response = request.bearer_auth(token).send().await?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| message.is_char_boundary(*i))
            .unwrap_or(0);
        message.truncate(cut);
    }
    Err(Error::External {
        service,
        status: Some(status.as_u16()),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() -> Result<()> {
        let url = endpoint(
            "https://sheets.example/v4",
            &["spreadsheets", "abc", "values", "'Trade Record'!A1:H:append"],
        )?;
        assert_eq!(
            url.as_str(),
            "https://sheets.example/v4/spreadsheets/abc/values/'Trade%20Record'!A1:H:append"
        );
        Ok(())
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() -> Result<()> {
        let url = endpoint("https://drive.example/v3/", &["files"])?;
        assert_eq!(url.as_str(), "https://drive.example/v3/files");
        Ok(())
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        assert!(matches!(
            endpoint("not a url", &["files"]),
            Err(Error::Config { .. })
        ));
    }
}
