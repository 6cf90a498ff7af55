//! Revoke control for a `!share` reply.
//!
//! The reply carries a single "Revoke public access" button gated by the owner/delegate
//! pair. A successful revert removes the button; a failed one keeps it and shows the
//! error. The button disappears once the control lifetime runs out.

use crate::{
    bot::{Context, handlers::settle},
    core::access_grant::{AccessGrantWorkflow, PermissionStore, RevertOutcome},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Label of the revoke button.
pub const REVOKE_LABEL: &str = "Revoke public access";

/// Message shown while the resource is public.
#[must_use]
pub fn granted_message(name: &str, link: &str) -> String {
    format!("Anyone with the link can now view '{name}': {link}")
}

fn revoke_row(custom_id: &str) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(custom_id)
            .label(REVOKE_LABEL)
            .style(serenity::ButtonStyle::Danger),
    ])]
}

/// Message shown once public access has been removed.
#[must_use]
pub fn revoked_message(name: &str) -> String {
    format!("Public access to '{name}' has been revoked.")
}

/// Replies with the share link and serves the revoke button for `lifetime`.
///
/// The button is removed when the lifetime ends, after a successful revert, and when
/// answering a press fails.
pub async fn run_share_control<S>(
    ctx: Context<'_>,
    name: &str,
    mut workflow: AccessGrantWorkflow<'_, S>,
    lifetime: Duration,
) -> Result<()>
where
    S: PermissionStore + ?Sized,
{
    let Some(link) = workflow.link().map(str::to_string) else {
        ctx.say(format!("'{name}' is not shared.")).await?;
        return Ok(());
    };
    let custom_id = format!("{}:revoke", ctx.id());
    let mut content = granted_message(name, &link);

    let handle = ctx
        .send(
            poise::CreateReply::default()
                .content(content.clone())
                .components(revoke_row(&custom_id)),
        )
        .await?;

    let control = RevokeControl {
        name,
        link: &link,
        custom_id: &custom_id,
        deadline: Instant::now() + lifetime,
    };
    let outcome = control.serve(ctx, &mut workflow, &mut content).await;
    if matches!(outcome, Ok(Closed::ButtonRemoved)) {
        return Ok(());
    }

    let cleanup = handle
        .edit(
            ctx,
            poise::CreateReply::default()
                .content(content)
                .components(Vec::new()),
        )
        .await
        .map_err(Error::from);
    settle(outcome.map(|_| ()), cleanup)
}

/// How the revoke loop ended.
enum Closed {
    /// The revert response already stripped the button
    ButtonRemoved,
    /// The lifetime ran out with the button still showing
    Expired,
}

struct RevokeControl<'a> {
    name: &'a str,
    link: &'a str,
    custom_id: &'a str,
    deadline: Instant,
}

impl RevokeControl<'_> {
    async fn serve<S>(
        &self,
        ctx: Context<'_>,
        workflow: &mut AccessGrantWorkflow<'_, S>,
        content: &mut String,
    ) -> Result<Closed>
    where
        S: PermissionStore + ?Sized,
    {
        loop {
            let remaining = self.deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Closed::Expired);
            }
            let wanted = self.custom_id.to_string();
            let press = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
                .filter(move |press| press.data.custom_id == wanted)
                .timeout(remaining)
                .await;
            let Some(press) = press else {
                return Ok(Closed::Expired);
            };

            let response = match workflow.revert(press.user.id.get()).await {
                Ok(RevertOutcome::Reverted(removed)) => {
                    info!(resource_id = workflow.resource_id(), removed, "public access revoked");
                    *content = revoked_message(self.name);
                    press
                        .create_response(
                            ctx.serenity_context(),
                            serenity::CreateInteractionResponse::UpdateMessage(
                                serenity::CreateInteractionResponseMessage::new()
                                    .content(content.clone())
                                    .components(Vec::new()),
                            ),
                        )
                        .await?;
                    return Ok(Closed::ButtonRemoved);
                }
                Ok(outcome @ (RevertOutcome::Unauthorized | RevertOutcome::AlreadyReverted)) => {
                    debug!(user = %press.user.id, ?outcome, "ignored revoke press");
                    serenity::CreateInteractionResponse::Acknowledge
                }
                Err(e) => {
                    *content = format!("{}\nRevoking failed: {e}", granted_message(self.name, self.link));
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .content(content.clone())
                            .components(revoke_row(self.custom_id)),
                    )
                }
            };
            press.create_response(ctx.serenity_context(), response).await?;
        }
    }
}
