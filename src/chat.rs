//! Discord interface for the classifier.
//!
//! Answers free text in NLP channels and hides the score breakdown
//! behind a 🔍 reaction on the reply.

use std::fmt::Write;

use async_trait::async_trait;
use serenity::ChannelId;
use serenity::CreateAllowedMentions;
use serenity::CreateEmbed;
use serenity::CreateMessage;
use serenity::EditMessage;
use serenity::Message;
use serenity::MessageId;
use serenity::ReactionType;
use serenity::UserId;

use crate::data::emoji;
use crate::reactions::PendingReaction;
use crate::reactions::ReactionAction;
use crate::serenity;
use crate::Data;
use crate::TaterError;

/// Classify a chat message and reply when confident enough.
pub async fn respond(
    ctx: &serenity::Context,
    data: &Data,
    message: &Message,
) -> Result<(), TaterError> {
    let prediction = {
        let classifier = data.classifier.read().await;
        classifier.predict(&message.content)
    };

    if prediction.confidence < data.config.confidence_threshold() {
        tracing::debug!(
            "Staying quiet, best intent \"{}\" at {:.2} is below the threshold.",
            prediction.intent,
            prediction.confidence
        );
        return Ok(());
    }

    tracing::info!(
        "Answering {} with intent \"{}\" at {:.2} confidence.",
        message.author.name,
        prediction.intent,
        prediction.confidence
    );

    let reply = CreateMessage::new()
        .content(prediction.response)
        .reference_message(message)
        .allowed_mentions(CreateAllowedMentions::new().replied_user(false));
    let sent = message.channel_id.send_message(&ctx.http, reply).await?;
    sent.react(&ctx.http, emoji::unicode(emoji::MAGNIFIER))
        .await?;

    data.reactions
        .register(PendingReaction::new(
            sent.id,
            sent.channel_id,
            vec![emoji::unicode(emoji::MAGNIFIER)],
            None,
            ShowDetails {
                channel: sent.channel_id,
                message: sent.id,
                scores: prediction.scores,
            },
        ))
        .await;

    Ok(())
}

/// Edits the reply to attach the full score breakdown.
struct ShowDetails {
    channel: ChannelId,
    message: MessageId,
    scores: Vec<(String, f32)>,
}

#[async_trait]
impl ReactionAction for ShowDetails {
    async fn on_react(
        &self,
        ctx: &serenity::Context,
        _data: &Data,
        _user: UserId,
        _emoji: &ReactionType,
    ) -> Result<(), TaterError> {
        self.channel
            .edit_message(
                &ctx.http,
                self.message,
                EditMessage::new().embed(details_embed(&self.scores)),
            )
            .await?;
        Ok(())
    }
}

/// Per-intent percentages, best first.
fn details_embed(scores: &[(String, f32)]) -> CreateEmbed {
    let (best_intent, best_score) = &scores[0];
    CreateEmbed::new()
        .title("Detailed results of this response")
        .description(format!(
            "Best matching intent is \"{best_intent}\" with {:05.2}% confidence",
            best_score * 100.0
        ))
        .colour(emoji::COLOR_NLP)
        .field("**Detailed results:**", format_scores(scores), false)
}

/// Render scores as a fixed-width code block:
///
/// ```text
/// greeting        (97.12%)
/// farewell        (01.88%)
/// ```
fn format_scores(scores: &[(String, f32)]) -> String {
    let mut block = String::from("```\n");
    for (intent, score) in scores {
        writeln!(block, "{intent:15} ({:05.2}%)", score * 100.0)
            .expect("write to string buffer can't fail");
    }
    block.push_str("```");
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_render_as_padded_percentages() {
        let scores = vec![
            ("greeting".to_string(), 0.9712),
            ("farewell".to_string(), 0.0188),
        ];
        let block = format_scores(&scores);

        assert!(block.starts_with("```\n"));
        assert!(block.ends_with("```"));
        assert!(block.contains("greeting        (97.12%)"));
        assert!(block.contains("farewell        (01.88%)"));
    }

    #[test]
    fn details_embed_names_the_best_intent() {
        let scores = vec![
            ("greeting".to_string(), 0.8),
            ("farewell".to_string(), 0.2),
        ];
        let embed = serde_json::to_value(details_embed(&scores)).unwrap();
        let description = embed["description"].as_str().unwrap();
        assert!(description.contains("\"greeting\""));
        assert!(description.contains("80.00%"));
    }
}
