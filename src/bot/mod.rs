//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface: the command registry, the button-driven
//! view hosts and the shared context every command sees.

/// Discord command implementations (solo log, trades, talents, sharing, general)
pub mod commands;
/// Discord interaction handlers (paginated views, share controls)
pub mod handlers;

use crate::{
    config::settings::AppConfig,
    core::{
        paginator::ViewAccess, pool_finder::TalentPoolSource, solo_fight::SoloFightSource,
        trade_record::TradeRecordSource,
    },
    errors::{Error, Result},
    google::DriveClient,
};
use poise::serenity_prelude as serenity;
use tracing::{error, info, instrument};

/// Context type of every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands.
pub struct BotData {
    /// Application settings
    pub config: AppConfig,
    /// Solo fight log
    pub solo_fights: SoloFightSource,
    /// Trade record spreadsheet
    pub trades: TradeRecordSource,
    /// Talent pool spreadsheet
    pub talents: TalentPoolSource,
    /// Drive client used by `!share`
    pub drive: DriveClient,
    /// User allowed to drive anyone's views
    pub delegate: Option<u64>,
}

impl BotData {
    /// Owner/delegate pair for a view opened by `owner`.
    #[must_use]
    pub fn access_for(&self, owner: serenity::UserId) -> ViewAccess {
        ViewAccess::new(owner.get(), self.delegate)
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            let message = match &error {
                Error::InvalidInput { .. } | Error::NotFound { .. } => error.to_string(),
                _ => format!("An error occurred: {error}"),
            };
            if let Err(e) = ctx.say(message).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Validates the command registry, then connects to Discord and runs until the
/// client stops.
#[instrument(skip_all)]
pub async fn run_bot(token: &str, data: BotData) -> Result<()> {
    let commands = commands::registry();
    commands::validate_registry(&commands)?;
    let prefix = data.config.prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot client...");
    client.start().await?;
    Ok(())
}
