//! Implements the `?ping` command.

use tracing::instrument;

use crate::data::emoji;
use crate::Context;
use crate::TaterError;

/// Check my connection speed to the Discord server.
#[instrument(skip(ctx))]
#[poise::command(prefix_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), TaterError> {
    let latency = ctx.ping().await;
    ctx.reply(format!(
        "{} Pong! {}ms",
        emoji::PING_PONG,
        latency.as_millis()
    ))
    .await?;
    Ok(())
}
