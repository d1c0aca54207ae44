//! Implements the `?intent` command family: view and modify the intent
//! dataset behind the chat classifier.

use std::sync::atomic::Ordering;

use async_trait::async_trait;
use itertools::Itertools;
use poise::CreateReply;
use serenity::ChannelId;
use serenity::CreateEmbed;
use serenity::CreateEmbedFooter;
use serenity::EditMessage;
use serenity::MessageId;
use serenity::ReactionType;
use serenity::UserId;
use tracing::instrument;

use crate::commands::react_to_invocation;
use crate::data::emoji;
use crate::nlp::Classifier;
use crate::nlp::Dataset;
use crate::reactions::PendingReaction;
use crate::reactions::ReactionAction;
use crate::serenity;
use crate::Context;
use crate::Data;
use crate::TaterError;

/// Footer shown while the dataset has edits the model hasn't seen yet.
const PENDING_FOOTER: &str =
    "* there are some pending changes to the model, reload to see them in action";

/// Command to view and modify my NLP intents.
#[instrument(skip(_ctx))]
#[poise::command(
    prefix_command,
    aliases("i", "intents"),
    subcommands("add", "info", "list", "reload"),
    subcommand_required
)]
pub async fn intent(_ctx: Context<'_>) -> Result<(), TaterError> {
    // subcommand_required means poise never runs this body.
    Ok(())
}

/// Add a new utterance to an intent. The author confirms with ✅.
///
/// Usage: ?intent add <intent_name> <utterance...>
/// Example: ?intent add greetings hi there!
#[instrument(skip(ctx))]
#[poise::command(prefix_command, aliases("a"))]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Intent to extend"] intent_name: String,
    #[description = "New example utterance"]
    #[rest]
    utterance: String,
) -> Result<(), TaterError> {
    let data = ctx.data();

    if !data.dataset.read().await.contains(&intent_name) {
        send_embed(&ctx, not_found_embed(data, &intent_name)).await?;
        return Ok(());
    }

    let embed = nlp_embed(data, "Confirm add utterance to intent").description(format!(
        "Are you sure you want to add \"{utterance}\" to intent \"{intent_name}\"? \
         This operation cannot be undone"
    ));
    let reply = ctx.send(CreateReply::default().embed(embed).reply(true)).await?;
    let message = reply.into_message().await?;

    message.react(&ctx, emoji::unicode(emoji::CHECK)).await?;
    message.react(&ctx, emoji::unicode(emoji::CROSS)).await?;

    // Locked to the author: only they can confirm a dataset edit.
    data.reactions
        .register(PendingReaction::new(
            message.id,
            message.channel_id,
            vec![emoji::unicode(emoji::CHECK), emoji::unicode(emoji::CROSS)],
            Some(ctx.author().id),
            ConfirmAdd {
                channel: message.channel_id,
                message: message.id,
                intent: intent_name,
                utterance,
            },
        ))
        .await;

    Ok(())
}

/// Show the utterances and responses of one intent.
///
/// Usage: ?intent info <intent_name>
#[instrument(skip(ctx))]
#[poise::command(prefix_command, aliases("i"))]
pub async fn info(
    ctx: Context<'_>,
    #[description = "Intent to inspect"] intent_name: String,
) -> Result<(), TaterError> {
    let data = ctx.data();

    let embed = {
        let dataset = data.dataset.read().await;
        match dataset.get(&intent_name) {
            None => not_found_embed(data, &intent_name),
            Some(entry) => nlp_embed(data, format!("Information about intent \"{intent_name}\""))
                .description(format!(
                    "There is currently a total of **{}** utterances and **{}** responses \
                     for \"{intent_name}\"",
                    entry.patterns.len(),
                    entry.responses.len()
                ))
                .field(
                    "**Utterances:**",
                    format!("> {}", quote_join(&entry.patterns)),
                    false,
                )
                .field(
                    "**Responses:**",
                    format!("> {}", quote_join(&entry.responses)),
                    false,
                ),
        }
    };

    send_embed(&ctx, embed).await?;
    Ok(())
}

/// List every intent the classifier knows.
///
/// Usage: ?intent list
#[instrument(skip(ctx))]
#[poise::command(prefix_command, aliases("l"))]
pub async fn list(ctx: Context<'_>) -> Result<(), TaterError> {
    let data = ctx.data();

    let embed = {
        let dataset = data.dataset.read().await;
        let names = dataset.intent_names().join(", ");
        nlp_embed(data, "List of intents in my NLP module")
            .description(format!(
                "There is currently a total of **{}** intents",
                dataset.len()
            ))
            .field("**Intents:**", format!("> {names}"), false)
    };

    send_embed(&ctx, embed).await?;
    Ok(())
}

/// Re-read the dataset from disk and retrain the model.
///
/// Usage: ?intent reload
#[instrument(skip(ctx))]
#[poise::command(prefix_command, aliases("r"))]
pub async fn reload(ctx: Context<'_>) -> Result<(), TaterError> {
    let data = ctx.data();

    // A reload that is already running only gets an hourglass.
    if data.reloading.swap(true, Ordering::SeqCst) {
        react_to_invocation(&ctx, emoji::HOURGLASS).await?;
        return Ok(());
    }

    let result = run_reload(&ctx).await;
    data.reloading.store(false, Ordering::SeqCst);
    result
}

/// The actual reload, separated so the flag above always resets.
async fn run_reload(ctx: &Context<'_>) -> Result<(), TaterError> {
    let data = ctx.data();
    let config = &data.config;

    let reply = ctx
        .send(CreateReply::default().embed(stage_embed(0)).reply(true))
        .await?;
    let mut message = reply.into_message().await?;

    // Stage 0: re-read the dataset from disk.
    let dataset = Dataset::load(config.intents_path())?;
    *data.dataset.write().await = dataset.clone();

    // Stage 1: retrain, off the async runtime.
    message
        .edit(
            ctx.serenity_context(),
            EditMessage::new().embed(stage_embed(1)),
        )
        .await?;

    let (hidden, epochs) = (config.hidden_size(), config.epochs());
    let classifier =
        tokio::task::spawn_blocking(move || Classifier::train(&dataset, hidden, epochs)).await??;
    *data.classifier.write().await = classifier;

    // Stage 2: done, the pending-changes flag is clear again.
    message
        .edit(
            ctx.serenity_context(),
            EditMessage::new().embed(stage_embed(2)),
        )
        .await?;
    data.model_changed.store(false, Ordering::Relaxed);

    tracing::info!("Intent data reloaded and the model retrained.");
    Ok(())
}

/// Applies or cancels a pending dataset edit when the author reacts.
struct ConfirmAdd {
    channel: ChannelId,
    message: MessageId,
    intent: String,
    utterance: String,
}

impl ConfirmAdd {
    async fn edit_to(
        &self,
        ctx: &serenity::Context,
        embed: CreateEmbed,
    ) -> Result<(), TaterError> {
        self.channel
            .edit_message(&ctx.http, self.message, EditMessage::new().embed(embed))
            .await?;
        Ok(())
    }

    fn cancelled_embed(&self, data: &Data) -> CreateEmbed {
        nlp_embed(data, "Add utterance cancelled").description(format!(
            "Cancelled adding \"{}\" to intent \"{}\"",
            self.utterance, self.intent
        ))
    }
}

#[async_trait]
impl ReactionAction for ConfirmAdd {
    async fn on_react(
        &self,
        ctx: &serenity::Context,
        data: &Data,
        _user: UserId,
        reaction: &ReactionType,
    ) -> Result<(), TaterError> {
        if *reaction != emoji::unicode(emoji::CHECK) {
            return self.edit_to(ctx, self.cancelled_embed(data)).await;
        }

        {
            let mut dataset = data.dataset.write().await;
            dataset.add_utterance(&self.intent, &self.utterance)?;
        }
        data.model_changed.store(true, Ordering::Relaxed);

        let embed = nlp_embed(data, "Add utterance successful").description(format!(
            "Successfully added \"{}\" to intent \"{}\"",
            self.utterance, self.intent
        ));
        self.edit_to(ctx, embed).await
    }

    async fn on_timeout(&self, ctx: &serenity::Context, data: &Data) -> Result<(), TaterError> {
        self.edit_to(ctx, self.cancelled_embed(data)).await
    }
}

/// Base embed for intent replies, with the pending-changes footer when
/// the dataset has un-retrained edits.
fn nlp_embed(data: &Data, title: impl Into<String>) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title(title).colour(emoji::COLOR_NLP);
    if data.model_changed.load(Ordering::Relaxed) {
        embed = embed.footer(CreateEmbedFooter::new(PENDING_FOOTER));
    }
    embed
}

fn not_found_embed(data: &Data, intent_name: &str) -> CreateEmbed {
    let prefix = data.config.prefix();
    nlp_embed(data, format!("Intent \"{intent_name}\" not found")).description(format!(
        "Try using `{prefix}intent list` to view all intents"
    ))
}

/// "Reloading Data >> Retraining Model >> Complete", active stage bold.
fn stage_embed(stage: usize) -> CreateEmbed {
    let stages = ["Reloading Data", "Retraining Model", "Complete"];
    let line = stages
        .iter()
        .enumerate()
        .map(|(index, name)| {
            if index == stage {
                format!("**{name}**")
            } else {
                (*name).to_string()
            }
        })
        .join(" >> ");

    CreateEmbed::new()
        .title("Reloading intent data and retraining the model...")
        .description(line)
        .colour(emoji::COLOR_NLP)
}

/// `["a", "b"]` -> `"a", "b"` for embed fields.
fn quote_join(items: &[String]) -> String {
    items.iter().map(|item| format!("\"{item}\"")).join(", ")
}

async fn send_embed(ctx: &Context<'_>, embed: CreateEmbed) -> Result<(), TaterError> {
    ctx.send(CreateReply::default().embed(embed).reply(true))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_join_wraps_every_item() {
        let items = vec!["hi".to_string(), "hello there".to_string()];
        assert_eq!(quote_join(&items), "\"hi\", \"hello there\"");
        assert_eq!(quote_join(&[]), "");
    }

    #[test]
    fn stage_embed_bolds_the_active_stage() {
        let embed = serde_json::to_value(stage_embed(1)).unwrap();
        let description = embed["description"].as_str().unwrap();
        assert_eq!(
            description,
            "Reloading Data >> **Retraining Model** >> Complete"
        );
    }
}
