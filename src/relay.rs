//! Moves messages out of watched channels into the relay target.
//!
//! Used for the vent/report flow: the original message is deleted from
//! the source channel and lands in the (moderator-only) target channel
//! as an embed, attachments re-uploaded underneath.

use chrono::Utc;
use itertools::Itertools;
use serenity::Attachment;
use serenity::CreateAttachment;
use serenity::CreateEmbed;
use serenity::CreateMessage;
use serenity::Mentionable;
use serenity::Message;
use serenity::User;

use crate::data;
use crate::data::emoji;
use crate::serenity;
use crate::Data;
use crate::TaterError;

/// Messages shorter than this get a ❓ instead of being relayed.
const MIN_RELAY_LEN: usize = 6;

/// Timestamp line used in confirmations and embed descriptions.
pub fn formatted_now() -> String {
    Utc::now().format("%-m/%-d/%Y %H:%M:%S").to_string()
}

/// Move one message out of a watched channel.
pub async fn move_message(
    ctx: &serenity::Context,
    data: &Data,
    message: &Message,
) -> Result<(), TaterError> {
    let Some(target) = data.config.relay_target() else {
        tracing::warn!("Relay source hit but no target channel is configured.");
        return Ok(());
    };

    // Spam filter
    if message.content.chars().count() < MIN_RELAY_LEN {
        message
            .react(&ctx.http, emoji::unicode(emoji::QUESTION))
            .await?;
        return Ok(());
    }

    let names: Vec<String> = message
        .attachments
        .iter()
        .map(|attachment| attachment.filename.clone())
        .collect();
    let embed = report_embed(&message.author, &message.content, &names, false);

    message.delete(&ctx.http).await?;
    message
        .channel_id
        .say(
            &ctx.http,
            format!(
                "`{}` >> Your report has been registered {}",
                formatted_now(),
                emoji::CHECK
            ),
        )
        .await?;

    let sent = target
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await?;

    forward_attachments(ctx, &sent, &message.attachments).await;

    Ok(())
}

/// Re-upload attachments as file replies under the relayed embed.
/// A failed download only skips that file, the relayed text must survive.
pub async fn forward_attachments(
    ctx: &serenity::Context,
    parent: &Message,
    attachments: &[Attachment],
) {
    if attachments.is_empty() {
        return;
    }

    let client = data::http_client(ctx).await;
    for attachment in attachments {
        let bytes = match download(&client, attachment).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Skipping attachment {}: {e}", attachment.filename);
                continue;
            }
        };

        let reply = CreateMessage::new()
            .content(format!("Attached file `{}`:", attachment.filename))
            .reference_message(parent)
            .add_file(CreateAttachment::bytes(bytes, attachment.filename.clone()));
        if let Err(e) = parent.channel_id.send_message(&ctx.http, reply).await {
            tracing::warn!("Failed to forward attachment {}: {e}", attachment.filename);
        }
    }
}

async fn download(client: &reqwest::Client, attachment: &Attachment) -> Result<Vec<u8>, TaterError> {
    let response = client
        .get(&attachment.url)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// The embed that lands in the relay channel.
pub fn report_embed(
    author: &User,
    content: &str,
    attachment_names: &[String],
    is_dm: bool,
) -> CreateEmbed {
    let mut title = format!("Message from {}", author.name);
    if is_dm {
        title = format!("[DM] {title}");
    }

    let body = if content.is_empty() {
        "*no text message*"
    } else {
        content
    };

    let mut embed = CreateEmbed::new()
        .title(title)
        .description(format!("Timestamp (UTC): {}", formatted_now()))
        .colour(emoji::COLOR_HELP)
        .field("**Message from:**", format!("> {}", author.mention()), false)
        .field("**Message details:**", format!("> {body}"), false);

    if !attachment_names.is_empty() {
        let names = attachment_names.iter().join(", ");
        embed = embed.field("**Message attachments:**", format!("> {names}"), false);
    }

    embed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed_json(embed: &CreateEmbed) -> serde_json::Value {
        serde_json::to_value(embed).unwrap()
    }

    #[test]
    fn dm_reports_are_marked_in_the_title() {
        let mut author = User::default();
        author.name = "tester".to_string();

        let embed = embed_json(&report_embed(&author, "hello there", &[], true));
        let title = embed["title"].as_str().unwrap();
        assert!(title.starts_with("[DM] Message from tester"));

        let embed = embed_json(&report_embed(&author, "hello there", &[], false));
        let title = embed["title"].as_str().unwrap();
        assert!(title.starts_with("Message from tester"));
    }

    #[test]
    fn empty_bodies_render_a_placeholder() {
        let author = User::default();
        let embed = embed_json(&report_embed(&author, "", &[], false));

        let fields = embed["fields"].as_array().unwrap();
        assert!(fields
            .iter()
            .any(|field| field["value"] == "> *no text message*"));
    }

    #[test]
    fn attachment_names_are_listed() {
        let author = User::default();
        let names = vec!["a.png".to_string(), "b.txt".to_string()];
        let embed = embed_json(&report_embed(&author, "see files", &names, false));

        let fields = embed["fields"].as_array().unwrap();
        assert!(fields.iter().any(|field| field["value"] == "> a.png, b.txt"));

        // No attachments, no attachments field.
        let embed = embed_json(&report_embed(&author, "no files", &[], false));
        assert_eq!(embed["fields"].as_array().unwrap().len(), 2);
    }
}
