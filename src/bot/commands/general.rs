//! General Discord commands - ping and help.
//! These commands touch neither the database nor the spreadsheets.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let p = &ctx.data().config.prefix;
        let help_text = format!(
            "**Solo Ledger Help**\n\n\
            **Solo fights**\n\
            • `{p}addsolo <world> - <location> - <dungeon> - <mob name> - <mob type(s)> - <notes>` - Logs a solo fight.\n\
            • `{p}soloview <criteria>` - Browses logged fights matching the criteria.\n\n\
            **Trades**\n\
            • `{p}trades <criteria>` - Browses the trade record.\n\
            • `{p}addtrade <field> - <field> - ...` - Appends a trade.\n\n\
            **Pets**\n\
            • `{p}talents <first type> <second type>` - Lists pools offering either talent type.\n\n\
            **Sharing**\n\
            • `{p}share <file name>` - Makes a Drive file readable by link, with a revoke button.\n\n\
            **Utility**\n\
            • `{p}ping` - Checks if the bot is responsive.\n\
            • `{p}help` - Shows this help message.\n\n\
            Only you (and the configured delegate) can press the buttons on your views."
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
