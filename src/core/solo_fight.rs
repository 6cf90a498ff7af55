//! Solo fight log business logic.
//!
//! Parses `addsolo` entries, stores them, and searches the log case-insensitively across
//! the descriptive columns. All functions are framework-agnostic.

use crate::{
    core::{
        paginator::Row,
        rows::{RowSet, RowSource},
    },
    entities::{SoloFight, solo_fight},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{
    Condition, QueryOrder, Set,
    prelude::*,
    sea_query::{Expr, Func},
};
use std::fmt;

/// Usage line shown when an entry cannot be parsed.
pub const ENTRY_USAGE: &str = "Invalid entry format. Please use: !addsolo <world> - <location> - <dungeon> - <mob name> - <mob type(s)> - <notes>";

/// Column titles of a solo fight row, in [`to_row`] order.
pub const COLUMN_TITLES: [&str; 6] = ["World", "Location", "Dungeon", "Mob", "Mob Types", "Notes"];

/// A parsed, not yet stored, solo fight entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoloEntry {
    /// Game world
    pub world: String,
    /// Location within the world
    pub location: String,
    /// Dungeon name
    pub dungeon: String,
    /// Name of the mob fought
    pub mob_name: String,
    /// Mob type(s)
    pub mob_types: String,
    /// Free-form notes, may be empty
    pub notes: String,
}

impl fmt::Display for SoloEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} - {} - {} - {}",
            self.world, self.location, self.dungeon, self.mob_name, self.mob_types, self.notes
        )
    }
}

/// Parses `world - location - dungeon - mob name - mob type(s) - notes`.
///
/// The text is split on `-` into six parts; hyphens after the fifth separator stay in
/// the notes. Every part but the notes must be non-empty.
pub fn parse_solo_entry(text: &str) -> Result<SoloEntry> {
    let parts: Vec<&str> = text.splitn(6, '-').map(str::trim).collect();
    let [world, location, dungeon, mob_name, mob_types, notes] = parts.as_slice() else {
        return Err(Error::invalid_input(ENTRY_USAGE));
    };
    if [world, location, dungeon, mob_name, mob_types]
        .iter()
        .any(|part| part.is_empty())
    {
        return Err(Error::invalid_input(ENTRY_USAGE));
    }

    Ok(SoloEntry {
        world: (*world).to_string(),
        location: (*location).to_string(),
        dungeon: (*dungeon).to_string(),
        mob_name: (*mob_name).to_string(),
        mob_types: (*mob_types).to_string(),
        notes: (*notes).to_string(),
    })
}

/// Stores a parsed entry and returns the saved model.
pub async fn add_solo_fight<C>(db: &C, entry: SoloEntry) -> Result<solo_fight::Model>
where
    C: ConnectionTrait,
{
    let model = solo_fight::ActiveModel {
        world: Set(entry.world),
        location: Set(entry.location),
        dungeon: Set(entry.dungeon),
        mob_name: Set(entry.mob_name),
        mob_types: Set(entry.mob_types),
        notes: Set(entry.notes),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Finds entries whose world, location, dungeon, mob name or mob types contain
/// `criteria`, ignoring case. Notes are not searched. Results are ordered by id.
pub async fn search_solo_fights<C>(db: &C, criteria: &str) -> Result<Vec<solo_fight::Model>>
where
    C: ConnectionTrait,
{
    let pattern = format!("%{}%", criteria.trim().to_lowercase());
    let condition = [
        solo_fight::Column::World,
        solo_fight::Column::Location,
        solo_fight::Column::Dungeon,
        solo_fight::Column::MobName,
        solo_fight::Column::MobTypes,
    ]
    .into_iter()
    .fold(Condition::any(), |condition, column| {
        condition.add(Expr::expr(Func::lower(Expr::col((SoloFight, column)))).like(pattern.clone()))
    });

    SoloFight::find()
        .filter(condition)
        .order_by_asc(solo_fight::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Flattens a model into display fields, in [`COLUMN_TITLES`] order.
#[must_use]
pub fn to_row(model: solo_fight::Model) -> Row {
    vec![
        model.world,
        model.location,
        model.dungeon,
        model.mob_name,
        model.mob_types,
        model.notes,
    ]
}

/// [`RowSource`] over the solo fight table.
#[derive(Debug, Clone)]
pub struct SoloFightSource {
    db: DatabaseConnection,
}

impl SoloFightSource {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connection used for inserts.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl RowSource for SoloFightSource {
    type Query = str;

    async fn fetch_rows(&self, criteria: &str) -> Result<RowSet> {
        let rows = search_solo_fights(&self.db, criteria)
            .await?
            .into_iter()
            .map(to_row)
            .collect();
        Ok(RowSet::new(
            COLUMN_TITLES.iter().map(ToString::to_string).collect(),
            rows,
        ))
    }
}
