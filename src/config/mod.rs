/// Delegate user allowed to drive other users' views
pub mod access;

/// Database configuration and connection management
pub mod database;

/// Application settings from config.toml
pub mod settings;
