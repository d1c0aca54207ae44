//! Defines and implements custom bot functionality.

mod config;
mod framework;

use crate::data::HttpKey;
use crate::serenity;
use crate::TaterError;

pub use config::Config;

/// Constructs a [serenity::Client] with the poise framework and a shared
/// [reqwest::Client] for attachment downloads.
pub(super) async fn client(config: Config) -> Result<serenity::Client, TaterError> {
    // Get discord token from config file
    let token = config.token()?.clone();

    // Intents we wish to use. Message content is privileged but needed
    // for prefix commands, the relay, and the chat classifier.
    // See https://discord.com/developers/docs/topics/gateway#gateway-intents
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let client = serenity::ClientBuilder::new(token, intents)
        .framework(framework::framework(config))
        .type_map_insert::<HttpKey>(reqwest::Client::new())
        .await?;

    Ok(client)
}
