//! This module contains everything relating to [Data].

pub mod emoji;

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use reqwest::Client;
use serenity::UserId;
use tokio::sync::RwLock;

use crate::nlp::Classifier;
use crate::nlp::Dataset;
use crate::reactions::ReactionRegistry;
use crate::serenity;
use crate::Config;

/// The data kept between shards
pub struct Data {
    /// Parsed config file.
    pub config: Arc<Config>,
    /// List of users to send bug notifications
    pub notify_list: HashSet<UserId>,
    /// Whether free text currently goes through the classifier.
    pub chat_enabled: AtomicBool,
    /// Dataset edits not yet reflected in the trained network.
    pub model_changed: AtomicBool,
    /// Guards against overlapping `intent reload` runs.
    pub reloading: AtomicBool,
    /// The intent dataset, shared between the add and reload paths.
    pub dataset: RwLock<Dataset>,
    /// The trained classifier.
    pub classifier: RwLock<Classifier>,
    /// Dynamically registered, expiring reaction handlers.
    pub reactions: ReactionRegistry,
}

/// Key to store a [Client] in the serenity type map.
pub struct HttpKey;
impl serenity::prelude::TypeMapKey for HttpKey {
    type Value = Client;
}

/// Get the shared [Client] out of a raw serenity context.
pub async fn http_client(ctx: &serenity::Context) -> Client {
    ctx.data
        .read()
        .await
        .get::<HttpKey>()
        // Client internally uses an Arc, so this is cheap to clone
        .cloned()
        .expect("Expected http client")
}

