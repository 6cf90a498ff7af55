//! Database connection and schema setup.
//!
//! Tables are created from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust models. Creation is idempotent and runs on every
//! start.

use crate::entities::SoloFight;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

/// Used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/solo_ledger.sqlite?mode=rwc";

/// Gets the database URL from `DATABASE_URL` or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory that must exist before `SQLite` can create the file behind `url`.
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let path = url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}

/// Connects to `database_url`, creating the directory of a `SQLite` file if needed.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }
    tracing::debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes that do not exist yet.
pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut solo_fight_table = schema.create_table_from_entity(SoloFight);
    solo_fight_table.if_not_exists();
    db.execute(builder.build(&solo_fight_table)).await?;

    for mut index in schema.create_index_from_entity(SoloFight) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }

    Ok(())
}
