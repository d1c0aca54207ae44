//! Bot commands.

mod guide;
mod help;
mod intent;
mod ping;
mod report;
mod toggle;

use crate::data::emoji;
use crate::Context;
use crate::Data;
use crate::TaterError;

/// Convenient type alias for [poise::Command].
pub type Command = poise::Command<Data, TaterError>;

/// Lists all the implemented commands
pub fn list() -> Vec<Command> {
    vec![
        help::help(),
        ping::ping(),
        guide::guide(),
        report::report(),
        toggle::toggle(),
        intent::intent(),
    ]
}

/// React to the invoking message. Does nothing for non-prefix invocations.
pub(crate) async fn react_to_invocation(ctx: &Context<'_>, emoji: &str) -> Result<(), TaterError> {
    if let poise::Context::Prefix(prefix) = ctx {
        prefix.msg.react(ctx, emoji::unicode(emoji)).await?;
    }
    Ok(())
}
