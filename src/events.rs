//! Routes the raw gateway events that poise doesn't own: the relay,
//! the chat classifier, and the reaction registry.

use std::sync::atomic::Ordering;

use crate::chat;
use crate::relay;
use crate::serenity;
use crate::Data;
use crate::TaterError;

/// Wired into [poise::FrameworkOptions::event_handler].
pub async fn handle(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, TaterError>,
    data: &Data,
) -> Result<(), TaterError> {
    match event {
        serenity::FullEvent::Message { new_message } => message(ctx, data, new_message).await,
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            data.reactions.dispatch(ctx, data, add_reaction).await
        }
        _ => Ok(()),
    }
}

/// The non-command message flow: relay sources first, then the
/// enabled-channel gate, then the chat classifier.
async fn message(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), TaterError> {
    // Ignore messages sent by bots, including our own.
    if message.author.bot {
        return Ok(());
    }

    let config = &data.config;

    if config.relay_sources().contains(&message.channel_id) {
        return relay::move_message(ctx, data, message).await;
    }

    let is_dm = message.guild_id.is_none();
    if !is_dm && !config.enabled_channels().contains(&message.channel_id) {
        return Ok(());
    }

    // Anything that parses as a command is poise's business.
    let prefix = config.prefix();
    if message.content.len() > prefix.len() && message.content.starts_with(prefix) {
        return Ok(());
    }

    if data.chat_enabled.load(Ordering::Relaxed)
        && config.nlp_channels().contains(&message.channel_id)
    {
        tracing::info!(
            "Chat message \"{}\" received from {}!",
            message.content,
            message.author.name
        );
        return chat::respond(ctx, data, message).await;
    }

    Ok(())
}
