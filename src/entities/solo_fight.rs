//! Solo fight entity - one logged solo encounter.
//!
//! Each entry records where the fight happened (world, location, dungeon), what was
//! fought (mob name and types) and free-form notes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Solo fight database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solo_fights")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Game world
    #[sea_orm(indexed)]
    pub world: String,
    /// Location within the world
    #[sea_orm(indexed)]
    pub location: String,
    /// Dungeon name
    #[sea_orm(indexed)]
    pub dungeon: String,
    /// Name of the mob fought
    #[sea_orm(indexed)]
    pub mob_name: String,
    /// Mob type(s), free text
    #[sea_orm(indexed)]
    pub mob_types: String,
    /// Free-form notes
    #[sea_orm(column_type = "Text")]
    pub notes: String,
}

/// Solo fights have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
