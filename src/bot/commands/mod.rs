//! Discord command implementations organized by category, plus the explicit registry
//! handed to the framework.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Pet talent pool lookup
pub mod pool;

/// Drive file sharing
pub mod share;

/// Solo fight log commands
pub mod solo;

/// Trade record commands
pub mod trade;

use crate::{
    bot::BotData,
    errors::{Error, Result},
};
use std::collections::HashSet;

/// Every command the bot serves.
#[must_use]
pub fn registry() -> Vec<poise::Command<BotData, Error>> {
    vec![
        general::ping(),
        general::help(),
        solo::addsolo(),
        solo::soloview(),
        trade::trades(),
        trade::addtrade(),
        pool::talents(),
        share::share(),
    ]
}

/// Rejects empty names and any name or alias claimed twice.
pub fn check_names<'a, I>(commands: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let mut seen = HashSet::new();
    for (name, aliases) in commands {
        if name.trim().is_empty() {
            return Err(Error::Config {
                message: "command with an empty name".to_string(),
            });
        }
        for key in std::iter::once(name).chain(aliases.iter().map(String::as_str)) {
            if !seen.insert(key) {
                return Err(Error::Config {
                    message: format!("command name or alias '{key}' is registered twice"),
                });
            }
        }
    }
    Ok(())
}

/// Validates a command list before it is handed to the framework.
pub fn validate_registry<U, E>(commands: &[poise::Command<U, E>]) -> Result<()> {
    check_names(
        commands
            .iter()
            .map(|command| (command.name.as_str(), command.aliases.as_slice())),
    )
}
