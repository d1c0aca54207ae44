//! Error types for the bot.
//!
//! [UserError] covers failures the invoking user caused and should see.
//! Everything else bubbles up as [TaterError] and is handled in
//! [crate::log::handle_framework_error].

use std::time::Duration;

use thiserror::Error;

use crate::serenity;

/// Top level error type.
#[derive(Error, Debug)]
pub enum TaterError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Nlp(#[from] NlpError),
    #[error("Discord API error: {0}")]
    Serenity(#[from] serenity::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
    #[error("Background task died: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Command panicked: {payload:?}")]
    Panic { payload: Option<String> },
    #[error("A command check failed: {reason:?}")]
    CheckFailed { reason: Option<String> },
    #[error("Command structure mismatch: {description}")]
    CommandStructureMismatch { description: String },
}

/// Errors caused by (and shown to) the invoking user.
#[derive(Error, Debug)]
pub enum UserError {
    #[error("This command needs a subcommand: {subcmds}")]
    MissingSubcommand { subcmds: String },
    #[error("I couldn't make sense of those arguments: {input:?}")]
    BadArgs { input: Option<String> },
    #[error("This command should not be spammed. Try again in {} seconds.", remaining_cooldown.as_secs())]
    OnCooldown { remaining_cooldown: Duration },
    #[error("I'm missing permissions: {missing_permissions}")]
    MissingBotPermissions {
        missing_permissions: serenity::Permissions,
    },
    #[error("You're missing permissions: {missing_permissions:?}")]
    MissingUserPermissions {
        missing_permissions: Option<serenity::Permissions>,
    },
    #[error("Only my owners may use this command.")]
    NotOwner,
    #[error("This command only works in servers.")]
    GuildOnly,
    #[error("This command is usable in direct message (DM) channels only!")]
    DmOnly,
    #[error("This command only works in NSFW channels.")]
    NsfwOnly,
    #[error("Reporting is not set up, no relay channel is configured.")]
    RelayNotConfigured,
}

/// Errors while reading `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },
    #[error("Missing config file. {action_msg}")]
    MissingConfig { action_msg: String },
    #[error(transparent)]
    IoError(std::io::Error),
}

/// Errors from the intent dataset and classifier.
#[derive(Error, Debug)]
pub enum NlpError {
    #[error("Failed to read intent dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed intent dataset: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown intent \"{0}\"")]
    UnknownIntent(String),
    #[error("The intent dataset is empty.")]
    EmptyDataset,
}
