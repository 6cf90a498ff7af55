//! Trade record commands - `trades` and `addtrade`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::pagination},
        core::{paginator::PagedView, rows::RowSource, trade_record},
        errors::{Error, Result},
    };
    use std::time::Instant;

    /// Browses the trade record; rows matching the criteria in any column are shown.
    #[poise::command(slash_command, prefix_command)]
    pub async fn trades(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Text to look for in any column (empty shows everything)"]
        #[rest]
        criteria: Option<String>,
    ) -> Result<()> {
        let criteria = criteria.unwrap_or_default().trim().to_string();
        let data = ctx.data();
        let set = data.trades.fetch_rows(criteria.as_str()).await?;
        if set.is_empty() {
            ctx.say(format!("No trades found matching '{criteria}'"))
                .await?;
            return Ok(());
        }

        let settings = &data.config.paginator;
        let snapshot = set.into_snapshot(settings.page_size, [criteria])?;
        let view = PagedView::toggleable(
            "Trade Record",
            snapshot,
            data.access_for(ctx.author().id),
            Some(settings.timeout()),
            Instant::now(),
        );
        pagination::run_paged_view(ctx, view).await
    }

    /// Appends a trade: one `-`-separated value per sheet column.
    #[poise::command(slash_command, prefix_command)]
    pub async fn addtrade(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Values separated by '-', one per sheet column"]
        #[rest]
        entry: String,
    ) -> Result<()> {
        let values = trade_record::parse_trade_entry(&entry)?;
        ctx.data().trades.append_trade(&values).await?;
        tracing::info!(fields = values.len(), author = %ctx.author().id, "trade appended");

        ctx.say(format!("Trade added: {}", values.join(" - "))).await?;
        Ok(())
    }
}

pub use inner::*;
