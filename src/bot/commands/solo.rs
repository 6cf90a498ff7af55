//! Solo fight commands - `addsolo` and `soloview`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::pagination},
        core::{
            paginator::PagedView,
            rows::RowSource,
            solo_fight::{self, SoloEntry},
        },
        errors::{Error, Result},
    };
    use std::time::Instant;

    /// Logs a solo fight: `world - location - dungeon - mob name - mob type(s) - notes`.
    #[poise::command(slash_command, prefix_command)]
    pub async fn addsolo(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "world - location - dungeon - mob name - mob type(s) - notes"]
        #[rest]
        entry: String,
    ) -> Result<()> {
        let entry: SoloEntry = solo_fight::parse_solo_entry(&entry)?;
        let db = ctx.data().solo_fights.database();
        let saved = solo_fight::add_solo_fight(db, entry.clone()).await?;
        tracing::info!(id = saved.id, author = %ctx.author().id, "solo fight logged");

        ctx.say(format!("Entry added: {entry}")).await?;
        Ok(())
    }

    /// Browses logged solo fights matching the criteria.
    #[poise::command(slash_command, prefix_command)]
    pub async fn soloview(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Text to look for in world, location, dungeon, mob or mob types"]
        #[rest]
        criteria: String,
    ) -> Result<()> {
        let criteria = criteria.trim().to_lowercase();
        let data = ctx.data();
        let set = data.solo_fights.fetch_rows(criteria.as_str()).await?;
        if set.is_empty() {
            ctx.say(format!("No entries found matching '{criteria}'"))
                .await?;
            return Ok(());
        }

        let settings = &data.config.paginator;
        let snapshot = set.into_snapshot(settings.page_size, [criteria.clone()])?;
        let view = PagedView::toggleable(
            format!("Entries matching '{criteria}'"),
            snapshot,
            data.access_for(ctx.author().id),
            Some(settings.timeout()),
            Instant::now(),
        );
        pagination::run_paged_view(ctx, view).await
    }
}

pub use inner::*;
