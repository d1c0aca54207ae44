//! Implements the `?toggle` command.

use std::sync::atomic::Ordering;

use tracing::instrument;

use crate::commands::react_to_invocation;
use crate::data::emoji;
use crate::Context;
use crate::TaterError;

/// Toggle my NLP chat interface.
#[instrument(skip(ctx))]
#[poise::command(prefix_command, aliases("t"))]
pub async fn toggle(ctx: Context<'_>) -> Result<(), TaterError> {
    let enabled = !ctx.data().chat_enabled.fetch_xor(true, Ordering::SeqCst);

    let emote = if enabled { emoji::UNMUTE } else { emoji::MUTE };
    react_to_invocation(&ctx, emote).await?;

    let status = if enabled { "enabled" } else { "disabled" };
    tracing::info!("NLP chat interface is now {status}");

    Ok(())
}
