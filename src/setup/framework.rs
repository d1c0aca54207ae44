//! Setup for [poise::Framework]

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands;
use crate::data::Data;
use crate::events;
use crate::log;
use crate::nlp::Classifier;
use crate::nlp::Dataset;
use crate::reactions::ReactionRegistry;
use crate::serenity;
use crate::topics;
use crate::Config;
use crate::TaterError;

/// Convenient type alias, only this [poise::Framework] type is used.
type Framework = poise::Framework<Data, TaterError>;

/// Construct a [poise::Framework]
pub(super) fn framework(config: Config) -> Framework {
    let config = Arc::new(config);

    poise::Framework::builder()
        .options(framework_options(&config))
        .setup(|ctx, rdy, fw| framework_setup(ctx, rdy, fw, config))
        .build()
}

/// Configure options for the [Framework]
fn framework_options(config: &Config) -> poise::FrameworkOptions<Data, TaterError> {
    poise::FrameworkOptions {
        // Add commands to the framework
        commands: commands::list(),
        // Text commands under the configured prefix
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(config.prefix().to_string()),
            ..Default::default()
        },
        // Handle framework errors
        on_error: |e| log::handle_framework_error(e),
        // Commands only run in enabled channels, or in DMs
        command_check: Some(|ctx| {
            Box::pin(async move {
                let config = &ctx.data().config;
                let allowed = ctx.guild_id().is_none()
                    || config.enabled_channels().contains(&ctx.channel_id());
                Ok(allowed)
            })
        }),
        // Relay, chat classifier, and reaction handlers live here
        event_handler: |ctx, event, framework, data| {
            Box::pin(events::handle(ctx, event, framework, data))
        },
        // Log when commands start
        pre_command: |ctx| {
            Box::pin(async move {
                let cmd_name = &ctx.command().name;
                let user = &ctx.author();
                tracing::info!("Started '{cmd_name}' command from {user}.")
            })
        },
        // Log when finishing commands
        post_command: |ctx| {
            Box::pin(async move {
                let cmd_name = &ctx.command().name;
                let user = &ctx.author();
                tracing::info!("Finished '{cmd_name}' command from {user}.")
            })
        },
        ..Default::default()
    }
}

/// Construct future that runs on startup
fn framework_setup<'a>(
    ctx: &'a serenity::Context,
    rdy: &'a serenity::Ready,
    fw: &'a Framework,
    config: Arc<Config>,
) -> poise::BoxFuture<'a, Result<Data, TaterError>> {
    Box::pin(async move {
        // Simple message that logs when the bot has initialized
        let bot_name = &rdy.user.name;
        tracing::info!("{bot_name} is ready! Hello (happy) world!");

        ctx.set_activity(Some(serenity::ActivityData::playing("with your gold")));

        // Daily topic rotation, when a channel is configured.
        if let Some(channel) = config.topic_channel() {
            topics::start(ctx.http.clone(), channel, config.topic_cron()).await?;
        }

        // The classifier must be ready before the first chat message.
        tracing::info!("Loading intent data and training the model...");
        let dataset = Dataset::load(config.intents_path())?;
        let (hidden, epochs) = (config.hidden_size(), config.epochs());
        let train_set = dataset.clone();
        let classifier =
            tokio::task::spawn_blocking(move || Classifier::train(&train_set, hidden, epochs))
                .await??;
        tracing::info!("Training complete! The model is now ready to be used.");

        let notify_list = config.notify_list(fw);

        Ok(Data {
            chat_enabled: AtomicBool::new(config.chat_starts_enabled()),
            model_changed: AtomicBool::new(false),
            reloading: AtomicBool::new(false),
            config,
            notify_list,
            dataset: RwLock::new(dataset),
            classifier: RwLock::new(classifier),
            reactions: ReactionRegistry::default(),
        })
    })
}
