//! Drive v3 client, used as the [`PermissionStore`] behind `!share`.

use super::{GoogleAuth, endpoint, send};
use crate::core::access_grant::{ANYONE, Permission, PermissionStore};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileLink {
    web_view_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionList {
    #[serde(default)]
    permissions: Vec<PermissionEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermissionEntry {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: String,
}

/// Escapes a value for use inside a single-quoted Drive query string.
#[must_use]
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Drive API client.
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    auth: Arc<GoogleAuth>,
    base_url: String,
}

impl DriveClient {
    /// Client against `base_url` (normally [`super::DRIVE_BASE_URL`]).
    #[must_use]
    pub fn new(http: reqwest::Client, auth: Arc<GoogleAuth>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            auth,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PermissionStore for DriveClient {
    #[instrument(skip(self))]
    async fn find_resource_by_name(&self, name: &str) -> Result<Option<String>> {
        let url = endpoint(&self.base_url, &["files"])?;
        let query = format!("name = '{}' and trashed = false", escape_query_value(name));
        let request = self.http.get(url).query(&[
            ("q", query.as_str()),
            ("fields", "files(id,name)"),
            ("pageSize", "10"),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ]);
        let list: FileList = send("drive", &self.auth, request).await?.json().await?;
        if list.files.len() > 1 {
            debug!(matches = list.files.len(), "several files share this name; using the first");
        }
        Ok(list.files.into_iter().next().map(|file| file.id))
    }

    #[instrument(skip(self))]
    async fn create_public_permission(&self, resource_id: &str) -> Result<()> {
        let url = endpoint(&self.base_url, &["files", resource_id, "permissions"])?;
        let request = self
            .http
            .post(url)
            .query(&[("supportsAllDrives", "true")])
            .json(&serde_json::json!({ "type": ANYONE, "role": "reader" }));
        send("drive", &self.auth, request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_share_link(&self, resource_id: &str) -> Result<String> {
        let url = endpoint(&self.base_url, &["files", resource_id])?;
        let request = self
            .http
            .get(url)
            .query(&[("fields", "webViewLink"), ("supportsAllDrives", "true")]);
        let file: FileLink = send("drive", &self.auth, request).await?.json().await?;
        file.web_view_link.ok_or_else(|| Error::NotFound {
            what: format!("Share link for file {resource_id}"),
        })
    }

    #[instrument(skip(self))]
    async fn list_permissions(&self, resource_id: &str) -> Result<Vec<Permission>> {
        let url = endpoint(&self.base_url, &["files", resource_id, "permissions"])?;
        let mut permissions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(url.clone()).query(&[
                ("fields", "nextPageToken,permissions(id,type,role)"),
                ("supportsAllDrives", "true"),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: PermissionList = send("drive", &self.auth, request).await?.json().await?;
            permissions.extend(page.permissions.into_iter().map(|p| Permission {
                id: p.id,
                kind: p.kind,
                role: p.role,
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(permissions),
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_permission(&self, resource_id: &str, permission_id: &str) -> Result<()> {
        let url = endpoint(
            &self.base_url,
            &["files", resource_id, "permissions", permission_id],
        )?;
        let request = self
            .http
            .delete(url)
            .query(&[("supportsAllDrives", "true")]);
        match send("drive", &self.auth, request).await {
            Ok(_) => Ok(()),
            // already gone
            Err(Error::External { status: Some(status), .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
