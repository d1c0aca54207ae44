//! Implements the `?help` command.
//!
//! Poise ships a builtin help, but the old embeds are part of this bot's
//! look, so they are rebuilt here from the registered command list.

use itertools::Itertools;
use poise::CreateReply;
use serenity::CreateEmbed;
use serenity::CreateEmbedFooter;
use tracing::instrument;

use crate::commands::Command;
use crate::data::emoji;
use crate::serenity;
use crate::Context;
use crate::TaterError;

/// Show help for my commands.
///
/// Usage: ?help [command]
/// Example: ?help ping
#[instrument(skip(ctx))]
#[poise::command(prefix_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to explain"] command: Option<String>,
) -> Result<(), TaterError> {
    let commands = &ctx.framework().options().commands;
    let prefix = ctx.data().config.prefix();

    let embed = match command {
        None => general_embed(prefix, commands),
        Some(name) => match find(commands, &name) {
            Some(cmd) => command_embed(prefix, cmd),
            None => unknown_embed(prefix, &name),
        },
    };

    ctx.send(CreateReply::default().embed(embed).reply(true))
        .await?;
    Ok(())
}

/// Look a command up by name or alias.
fn find<'a>(commands: &'a [Command], name: &str) -> Option<&'a Command> {
    commands
        .iter()
        .find(|command| command.name == name || command.aliases.iter().any(|alias| alias == name))
}

fn general_embed(prefix: &str, commands: &[Command]) -> CreateEmbed {
    let names = commands.iter().map(|command| command.name.as_str()).join(", ");
    CreateEmbed::new()
        .title("List of available commands")
        .description(format!(
            "Here's how to use my commands: `{prefix}<command> [arguments...]`"
        ))
        .colour(emoji::COLOR_HELP)
        .field("**List of commands:**", format!("> {names}"), false)
        .footer(CreateEmbedFooter::new(format!(
            "For more information, check out '{prefix}help [command]'"
        )))
}

fn command_embed(prefix: &str, command: &Command) -> CreateEmbed {
    let description = command
        .description
        .clone()
        .unwrap_or_else(|| "No description yet.".to_string());

    let mut embed = CreateEmbed::new()
        .title(format!("Command \"{prefix}{}\"", command.name))
        .description(description)
        .colour(emoji::COLOR_HELP);

    if !command.aliases.is_empty() {
        let aliases = command.aliases.iter().join(", ");
        embed = embed.field("**Aliases:**", format!("> {aliases}"), false);
    }
    if let Some(help) = &command.help_text {
        embed = embed.field(
            "**Details:**",
            format!("> {}", help.replace('\n', "\n> ")),
            false,
        );
    }

    embed
}

fn unknown_embed(prefix: &str, name: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Unknown command \"{name}\""))
        .description(format!(
            "That is not a valid command, check out a list of commands with `{prefix}help`"
        ))
        .colour(emoji::COLOR_HELP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_found_by_name_and_alias() {
        let commands = crate::commands::list();

        assert!(find(&commands, "help").is_some());
        assert!(find(&commands, "guides").is_some());
        assert!(find(&commands, "vent").is_some());
        assert!(find(&commands, "bogus").is_none());
    }

    #[test]
    fn general_embed_lists_every_command() {
        let commands = crate::commands::list();
        let embed = serde_json::to_value(general_embed("?", &commands)).unwrap();

        let list = embed["fields"][0]["value"].as_str().unwrap();
        for command in &commands {
            assert!(list.contains(command.name.as_str()));
        }
    }

    #[test]
    fn unknown_embed_echoes_the_query() {
        let embed = serde_json::to_value(unknown_embed("?", "frobnicate")).unwrap();
        assert!(embed["title"].as_str().unwrap().contains("frobnicate"));
    }
}
