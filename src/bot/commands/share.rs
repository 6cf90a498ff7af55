//! Drive sharing command - `share`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::share},
        core::{access_grant, retry::RetryPolicy},
        errors::{Error, Result},
    };

    /// Makes a Drive file readable by anyone with the link, with a button to revoke it.
    #[poise::command(slash_command, prefix_command)]
    pub async fn share(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Exact name of the Drive file"]
        #[rest]
        name: String,
    ) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input("Please give the name of the file to share."));
        }

        ctx.defer().await?;
        let data = ctx.data();
        let workflow = access_grant::share_by_name(
            &data.drive,
            name,
            data.access_for(ctx.author().id),
            RetryPolicy::default(),
        )
        .await?;
        tracing::info!(resource_id = workflow.resource_id(), author = %ctx.author().id, "file shared");

        share::run_share_control(ctx, name, workflow, data.config.share.control_timeout()).await
    }
}

pub use inner::*;
