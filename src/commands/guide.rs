//! Implements the `?guide` command.
//!
//! One static blurb pointing newcomers at the community guides.

use tracing::instrument;

use crate::Context;
use crate::TaterError;

/// The general guide blurb, kept in one place so it is easy to edit.
const GUIDE_ALL: &str = "\
**Almost a Hero — getting started**
> **Rings:** Lightning until you unlock Darkness, then swap once it is level 5+.
> **Heroes:** Early pushes want V and Lenny; swap in Sam once his items are rolled.
> **Artifacts:** Keep mythstones for regular slots, dust cheap artifacts for quality rerolls.
> **Runes:** Grab Energize and Surge first, the rest is comfort.
For the long-form guides, check the pins in the questions channels.";

/// Show the general guide of AaH.
#[instrument(skip(ctx))]
#[poise::command(prefix_command, aliases("guides"))]
pub async fn guide(ctx: Context<'_>) -> Result<(), TaterError> {
    ctx.reply(GUIDE_ALL).await?;
    Ok(())
}
