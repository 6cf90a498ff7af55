//! Pet talent command - `talents`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::pagination},
        core::{
            paginator::PagedView,
            pool_finder::{FIELD_LABEL, TalentQuery},
            rows::RowSource,
        },
        errors::{Error, Result},
    };
    use std::time::Instant;

    /// Lists the pools offering either of two talent types.
    #[poise::command(slash_command, prefix_command)]
    pub async fn talents(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "First talent type"] first: String,
        #[description = "Second talent type"] second: String,
    ) -> Result<()> {
        let query = TalentQuery::new(first.trim(), second.trim());
        let data = ctx.data();
        let set = data.talents.fetch_rows(&query).await?;
        if set.is_empty() {
            ctx.say(format!(
                "No pools found for '{}' or '{}'",
                query.first, query.second
            ))
            .await?;
            return Ok(());
        }

        let view = PagedView::chunked(
            format!("Pools for {} / {}", query.first, query.second),
            set.rows,
            FIELD_LABEL,
            data.access_for(ctx.author().id),
            Instant::now(),
        )?;
        pagination::run_paged_view(ctx, view).await
    }
}

pub use inner::*;
