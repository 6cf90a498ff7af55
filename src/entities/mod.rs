//! Entity module - `SeaORM` entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod solo_fight;

pub use solo_fight::{Column as SoloFightColumn, Entity as SoloFight, Model as SoloFightModel};
