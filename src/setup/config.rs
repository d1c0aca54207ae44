//! Configuration for running this bot.

use std::collections::HashSet;
use std::marker::PhantomData;

use poise::Framework;
use serde::Deserialize;
use serde::Serialize;
use serenity::ChannelId;
use serenity::UserId;

use crate::error::ConfigError;
use crate::serenity;

/// The path to the config file
const CONFIG_PATH: &str = "config.toml";

/// Settings read from [CONFIG_PATH] that modify bot behavior.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Token needed to use a bot account.
    discord_token: String,

    /// See [ChatConfig]
    chat: ChatConfig,

    /// See [RelayConfig]
    relay: RelayConfig,

    /// See [NlpConfig]
    nlp: NlpConfig,

    /// See [TopicsConfig]
    topics: TopicsConfig,

    /// See [LoggingConfig]
    logging: LoggingConfig,

    /// Useful developer specific configs.
    dev_utils: DevConfig,
}

impl Config {
    /// Tries to read [CONFIG_PATH] to extract a [Config].
    /// If no file exists, create the default config file and return an error.
    /// If a file exists but is empty, re-write the default values and return an error.
    /// If a file exists but is malformed, return an error naming the bad field.
    /// If file existence is indeterminate (e.g. missing permissions), return an error.
    pub fn read() -> Result<Config, ConfigError> {
        let file = std::fs::read_to_string(CONFIG_PATH);

        match file {
            Ok(content) => {
                if content.trim().is_empty() {
                    write_file(Config::default())?;
                    Err(ConfigError::InvalidConfig {
                        reason: format!("Empty config file! Rewriting {CONFIG_PATH} ..."),
                    })
                } else {
                    let to_toml = toml::Deserializer::new(&content);
                    let result: Result<Config, _> = serde_path_to_error::deserialize(to_toml);

                    result.map_err(|error| ConfigError::InvalidConfig {
                        reason: error.to_string(),
                    })
                }
            }
            Err(file_error) => match file_error.kind() {
                std::io::ErrorKind::NotFound => {
                    let action = format!("Creating {CONFIG_PATH}...");
                    write_file(Config::default())?;
                    Err(ConfigError::MissingConfig { action_msg: action })
                }
                _ => Err(ConfigError::IoError(file_error)),
            },
        }
    }

    /// Basic sanity check for if a token was given.
    pub fn token(&self) -> Result<&String, ConfigError> {
        let default_token = Config::default().discord_token;
        let given_token = &self.discord_token;

        if given_token.is_empty() || given_token.contains(&default_token) {
            Err(ConfigError::InvalidConfig {
                reason: "Missing discord token".to_string(),
            })
        } else {
            Ok(given_token)
        }
    }

    /// The prefix that marks a message as a command.
    pub fn prefix(&self) -> &str {
        &self.chat.prefix
    }

    /// Channels where commands are answered. DMs are always allowed.
    pub fn enabled_channels(&self) -> &HashSet<ChannelId> {
        &self.chat.enabled_channels
    }

    /// Channels where free text is run through the classifier.
    /// Should be a subset of [enabled_channels](Config::enabled_channels).
    pub fn nlp_channels(&self) -> &HashSet<ChannelId> {
        &self.chat.nlp_channels
    }

    /// Whether the chat classifier starts enabled.
    pub fn chat_starts_enabled(&self) -> bool {
        self.chat.start_enabled
    }

    /// Channels whose messages are moved to the relay target.
    /// Must not overlap [enabled_channels](Config::enabled_channels).
    pub fn relay_sources(&self) -> &HashSet<ChannelId> {
        &self.relay.source_channels
    }

    /// Where relayed messages and DM reports end up.
    /// `None` disables the relay and the `report` command.
    pub fn relay_target(&self) -> Option<ChannelId> {
        self.relay.target_channel
    }

    /// Path of the intent dataset file.
    pub fn intents_path(&self) -> &str {
        &self.nlp.intents_path
    }

    /// Replies below this confidence are suppressed.
    pub fn confidence_threshold(&self) -> f32 {
        self.nlp.confidence_threshold
    }

    /// Width of the two hidden network layers.
    pub fn hidden_size(&self) -> usize {
        self.nlp.hidden_size
    }

    /// Training epochs for the classifier.
    pub fn epochs(&self) -> usize {
        self.nlp.epochs
    }

    /// Channel whose topic follows the daily rotation, if any.
    pub fn topic_channel(&self) -> Option<ChannelId> {
        self.topics.channel
    }

    /// Cron expression for the topic rotation job.
    pub fn topic_cron(&self) -> &str {
        &self.topics.cron
    }

    /// Getter for log_dir.
    pub fn log_dir(&self) -> &str {
        &self.logging.log_dir
    }

    /// Is debug mode enabled for console logs
    pub fn console_debug(&self) -> bool {
        self.logging.console_debug
    }

    /// Is file logging enabled.
    pub fn logs_enabled(&self) -> bool {
        self.logging.logs_enabled
    }

    /// Construct a bug notification notify list based on the config.
    /// Wrapper for [NotifyConfig::notify_list]
    pub fn notify_list<U, E>(&self, fw: &Framework<U, E>) -> HashSet<UserId> {
        self.dev_utils.notifications.notify_list(fw)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord_token: "put_token_here".to_string(),

            chat: ChatConfig {
                prefix: "?".to_string(),
                enabled_channels: HashSet::new(),
                nlp_channels: HashSet::new(),
                start_enabled: false,
            },

            relay: RelayConfig {
                source_channels: HashSet::new(),
                target_channel: None,
            },

            nlp: NlpConfig {
                intents_path: "nlp/intents.json".to_string(),
                confidence_threshold: 0.7,
                hidden_size: 8,
                epochs: 1000,
            },

            topics: TopicsConfig {
                channel: None,
                // Seconds-resolution cron: midnight every day.
                cron: "0 0 0 * * *".to_string(),
            },

            logging: LoggingConfig {
                console_debug: false,
                logs_enabled: true,
                log_dir: "logs".to_string(),
            },

            dev_utils: DevConfig {
                notifications: NotifyConfig {
                    enabled: false,
                    add_owners: true,
                    userids: vec![],
                },
            },
        }
    }
}

/// Command and chat-classifier channel wiring.
#[derive(Debug, Serialize, Deserialize)]
struct ChatConfig {
    /// Command prefix, e.g. `?`.
    prefix: String,
    /// Channels where the bot answers commands.
    enabled_channels: HashSet<ChannelId>,
    /// Channels where free text goes through the classifier.
    nlp_channels: HashSet<ChannelId>,
    /// Whether the classifier answers chat right after startup.
    start_enabled: bool,
}

/// Where messages get moved from and to.
#[derive(Debug, Serialize, Deserialize)]
struct RelayConfig {
    /// Every message posted here is moved to the target channel.
    source_channels: HashSet<ChannelId>,
    /// Target channel for moved messages and DM reports.
    #[serde(serialize_with = "serialize_opt", deserialize_with = "deserialize_opt")]
    target_channel: Option<ChannelId>,
}

/// Intent classifier knobs.
#[derive(Debug, Serialize, Deserialize)]
struct NlpConfig {
    /// Path of the intent dataset file.
    intents_path: String,
    /// Replies below this confidence are suppressed.
    confidence_threshold: f32,
    /// Width of the two hidden layers.
    hidden_size: usize,
    /// Training epochs.
    epochs: usize,
}

/// Daily channel-topic rotation.
#[derive(Debug, Serialize, Deserialize)]
struct TopicsConfig {
    /// Channel whose topic follows the rotation. Empty string disables it.
    #[serde(serialize_with = "serialize_opt", deserialize_with = "deserialize_opt")]
    channel: Option<ChannelId>,
    /// Seconds-resolution cron expression for the rotation job.
    cron: String,
}

/// Configs for log output.
#[derive(Debug, Serialize, Deserialize)]
struct LoggingConfig {
    /// Print debug traces to console?
    console_debug: bool,
    /// Enable writing to log file?
    logs_enabled: bool,
    /// Directory to store log files
    log_dir: String,
}

/// Optional configs to enable developer-specific behavior.
#[derive(Debug, Serialize, Deserialize)]
struct DevConfig {
    /// See [NotifyConfig]
    notifications: NotifyConfig,
}

/// Configs for notification behavior when encountering unexpected errors.
#[derive(Debug, Serialize, Deserialize)]
struct NotifyConfig {
    /// Enable this behavior or not. (bot sends a private message)
    enabled: bool,
    /// Whether to automatically add owners to the notify list.
    add_owners: bool,
    /// Additional users to add to the notify list.
    userids: Vec<UserId>,
}

impl NotifyConfig {
    /// Construct a bug notification notify list based on the config.
    fn notify_list<U, E>(&self, fw: &Framework<U, E>) -> HashSet<UserId> {
        let mut notify_list = HashSet::new();

        if !self.enabled {
            return notify_list;
        }

        if self.add_owners {
            let owners = &fw.options().owners;
            for userid in owners {
                notify_list.insert(*userid);
            }
        }

        for userid in &self.userids {
            notify_list.insert(*userid);
        }

        notify_list
    }
}

/// Write the given config to [CONFIG_PATH].
fn write_file(config: Config) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&config).expect("config serialization can't fail");
    std::fs::write(CONFIG_PATH, content).map_err(ConfigError::IoError)
}

/// Optional snowflake ids are stored as strings so the default file can
/// hold an empty value ("") instead of omitting the key.
fn deserialize_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: From<u64>,
{
    deserializer.deserialize_str(OptIdVisitor(PhantomData))
}

fn serialize_opt<T, S>(val: &Option<T>, ser: S) -> Result<S::Ok, S::Error>
where
    T: serde::Serialize,
    S: serde::Serializer,
{
    match val {
        Some(v) => v.serialize(ser),
        None => ser.serialize_str(""),
    }
}

struct OptIdVisitor<T>(PhantomData<T>);

impl<T: From<u64>> serde::de::Visitor<'_> for OptIdVisitor<T> {
    type Value = Option<T>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a snowflake id or an empty string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match v {
            "" => Ok(None),
            _ => {
                let num: u64 = v.parse().map_err(|_| E::custom("not u64"))?;
                Ok(Some(T::from(num)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();

        assert_eq!(parsed.prefix(), "?");
        assert_eq!(parsed.confidence_threshold(), 0.7);
        assert_eq!(parsed.hidden_size(), 8);
        assert_eq!(parsed.epochs(), 1000);
        assert!(parsed.relay_target().is_none());
        assert!(parsed.topic_channel().is_none());
        assert!(parsed.enabled_channels().is_empty());
    }

    #[test]
    fn placeholder_token_is_rejected() {
        let config = Config::default();
        assert!(config.token().is_err());
    }

    #[test]
    fn optional_ids_parse_from_strings() {
        let mut content = toml::to_string_pretty(&Config::default()).unwrap();
        content = content.replace("target_channel = \"\"", "target_channel = \"1234\"");
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.relay_target(), Some(ChannelId::new(1234)));
    }
}
