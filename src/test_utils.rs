//! Shared test utilities.
//!
//! Helpers for an in-memory database with the schema applied, solo fight rows with
//! sensible defaults, and Sheets clients pointed at a `wiremock` server.

use crate::{
    core::solo_fight::{self, SoloEntry},
    entities,
    errors::Result,
    google::{Credentials, GoogleAuth, SheetsClient},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use wiremock::MockServer;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a solo fight with sensible defaults.
///
/// # Defaults
/// * `location`: "Test Location"
/// * `dungeon`: "Test Dungeon"
/// * `mob_types`: "Beast"
/// * `notes`: empty
pub async fn create_test_solo_fight(
    db: &DatabaseConnection,
    world: &str,
    mob_name: &str,
) -> Result<entities::SoloFightModel> {
    solo_fight::add_solo_fight(
        db,
        SoloEntry {
            world: world.to_string(),
            location: "Test Location".to_string(),
            dungeon: "Test Dungeon".to_string(),
            mob_name: mob_name.to_string(),
            mob_types: "Beast".to_string(),
            notes: String::new(),
        },
    )
    .await
}

/// Static-token auth that never contacts a token endpoint.
#[must_use]
pub fn static_auth() -> Arc<GoogleAuth> {
    Arc::new(GoogleAuth::new(
        reqwest::Client::new(),
        "http://unused.invalid/token",
        Credentials::Static("token".to_string()),
    ))
}

/// Sheets client against a mock server.
#[must_use]
pub fn mock_sheets_client(server: &MockServer) -> SheetsClient {
    SheetsClient::new(reqwest::Client::new(), static_auth(), server.uri())
}

/// `spreadsheets.get` response body holding plain text `rows`.
#[must_use]
pub fn sheet_response(rows: &[&[&str]]) -> serde_json::Value {
    let row_data: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let values: Vec<serde_json::Value> = row
                .iter()
                .map(|value| serde_json::json!({ "formattedValue": value }))
                .collect();
            serde_json::json!({ "values": values })
        })
        .collect();
    serde_json::json!({ "sheets": [{ "data": [{ "rowData": row_data }] }] })
}
