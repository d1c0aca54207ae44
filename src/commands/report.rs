//! Implements the `?report` command (DM only).
//!
//! Same embed as the channel relay, but fed by a command so members can
//! report from DMs. One report per user per hour.

use serenity::CreateMessage;
use tracing::instrument;

use crate::data::emoji;
use crate::error::UserError;
use crate::relay;
use crate::serenity;
use crate::Context;
use crate::TaterError;

/// [DM Only] Report something to the moderators in the AaH Discord.
///
/// Usage: ?report [message...]
/// Example: ?report I ate too many strawberries!
#[instrument(skip(ctx))]
#[poise::command(prefix_command, dm_only, aliases("vent"), user_cooldown = 3600)]
pub async fn report(
    ctx: Context<'_>,
    #[description = "What to tell the moderators"]
    #[rest]
    message: Option<String>,
) -> Result<(), TaterError> {
    let Some(target) = ctx.data().config.relay_target() else {
        return Err(UserError::RelayNotConfigured.into());
    };

    let Some(content) = message else {
        let prefix = ctx.data().config.prefix();
        ctx.reply(format!(
            "Invalid report arguments! Usage: `{prefix}report [message...]`"
        ))
        .await?;
        return Ok(());
    };

    // Let the author know something is happening.
    let _ = ctx
        .channel_id()
        .broadcast_typing(&ctx.serenity_context().http)
        .await;

    let attachments = match ctx {
        poise::Context::Prefix(prefix) => prefix.msg.attachments.clone(),
        _ => Vec::new(),
    };
    let names: Vec<String> = attachments
        .iter()
        .map(|attachment| attachment.filename.clone())
        .collect();

    let embed = relay::report_embed(ctx.author(), &content, &names, true);
    let sent = target
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;

    ctx.reply(format!(
        "`{}` >> Your report has been registered {}",
        relay::formatted_now(),
        emoji::CHECK
    ))
    .await?;

    relay::forward_attachments(ctx.serenity_context(), &sent, &attachments).await;

    Ok(())
}
