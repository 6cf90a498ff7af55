use dotenvy::dotenv;
use solo_ledger::{
    bot::{self, BotData},
    config::{access, database, settings},
    core::{pool_finder::TalentPoolSource, solo_fight::SoloFightSource, trade_record::TradeRecordSource},
    errors::{Error, Result},
    google::{Credentials, DriveClient, GoogleAuth, SheetsClient},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Tracing first so everything below is logged
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. .env is optional; variables may come from the environment
    dotenv().ok();

    // 3. Settings and secrets
    let config = settings::load_app_config()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    let delegate = access::delegate_user_id()?;
    let token = std::env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;
    let credentials = Credentials::from_env()
        .inspect_err(|e| error!("Google credentials missing: {e}"))?;

    // 4. Database
    let db = database::create_connection(&database::get_database_url()).await?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Google clients
    let http = reqwest::Client::new();
    let auth = Arc::new(GoogleAuth::new(
        http.clone(),
        config.google.token_url.clone(),
        credentials,
    ));
    let sheets = SheetsClient::new(
        http.clone(),
        Arc::clone(&auth),
        config.google.sheets_base_url.clone(),
    );
    let drive = DriveClient::new(http, auth, config.google.drive_base_url.clone());

    let data = BotData {
        solo_fights: SoloFightSource::new(db),
        trades: TradeRecordSource::new(
            sheets.clone(),
            config.trade_record.spreadsheet_id.clone(),
            config.trade_record.range.clone(),
        ),
        talents: TalentPoolSource::new(
            sheets,
            config.pool_finder.spreadsheet_id.clone(),
            &config.pool_finder.sheet_name,
            &config.pool_finder.range,
        ),
        drive,
        delegate,
        config,
    };

    // 6. Run the bot
    bot::run_bot(&token, data).await
}
