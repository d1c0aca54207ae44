//! A Discord bot for the Almost a Hero community: prefix commands, a
//! message relay for reports, and a small intent classifier for chat.

mod chat;
mod commands;
mod data;
mod error;
mod events;
mod log;
mod nlp;
mod reactions;
mod relay;
mod setup;
mod topics;

pub use poise::serenity_prelude as serenity;

pub use data::Data;
pub use error::TaterError;
pub use setup::Config;

/// Convenient type alias, only this [poise::Context] type is used.
pub type Context<'a> = poise::Context<'a, Data, TaterError>;

#[tokio::main]
async fn main() -> Result<(), TaterError> {
    // Read config first, it decides where logs go.
    let config = Config::read()?;

    // The guard must live until exit or buffered file logs are dropped.
    let _guard = log::install_tracing(&config);

    let mut client = setup::client(config).await?;
    client.start().await?;

    Ok(())
}
