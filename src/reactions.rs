//! Dynamically registered, expiring reaction handlers.
//!
//! Commands (and the chat classifier) seed a message with reactions and
//! register a [PendingReaction] for it here. When a matching reaction
//! arrives the handler fires once and is consumed. Handlers that sit
//! around longer than [REACTION_TTL] are dropped on the next reaction
//! event, firing their timeout hook instead.

use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use serenity::ChannelId;
use serenity::MessageId;
use serenity::Reaction;
use serenity::ReactionType;
use serenity::UserId;
use tokio::sync::Mutex;

use crate::serenity;
use crate::Data;
use crate::TaterError;

/// How long a registered handler listens before timing out.
pub const REACTION_TTL: Duration = Duration::from_secs(5 * 60);

/// Something waiting for a reaction on a watched message.
#[async_trait]
pub trait ReactionAction: Send + Sync {
    /// Fired when a matching reaction arrives. The handler is consumed.
    async fn on_react(
        &self,
        ctx: &serenity::Context,
        data: &Data,
        user: UserId,
        emoji: &ReactionType,
    ) -> Result<(), TaterError>;

    /// Fired when the handler expires without a matching reaction.
    async fn on_timeout(&self, _ctx: &serenity::Context, _data: &Data) -> Result<(), TaterError> {
        Ok(())
    }
}

/// One watched message together with its accepted emojis.
pub struct PendingReaction {
    message: MessageId,
    channel: ChannelId,
    emojis: Vec<ReactionType>,
    /// When set, only this user's reactions match.
    target: Option<UserId>,
    expires_at: Instant,
    action: Box<dyn ReactionAction>,
}

impl PendingReaction {
    pub fn new(
        message: MessageId,
        channel: ChannelId,
        emojis: Vec<ReactionType>,
        target: Option<UserId>,
        action: impl ReactionAction + 'static,
    ) -> Self {
        PendingReaction {
            message,
            channel,
            emojis,
            target,
            expires_at: Instant::now() + REACTION_TTL,
            action: Box::new(action),
        }
    }
}

/// The live list of [PendingReaction]s.
#[derive(Default)]
pub struct ReactionRegistry {
    handlers: Mutex<Vec<PendingReaction>>,
}

impl ReactionRegistry {
    /// Register a handler. Do this every time the bot listens for
    /// reactions on a message it just sent.
    pub async fn register(&self, pending: PendingReaction) {
        self.handlers.lock().await.push(pending);
    }

    /// Route one gateway reaction event through the registry.
    pub async fn dispatch(
        &self,
        ctx: &serenity::Context,
        data: &Data,
        reaction: &Reaction,
    ) -> Result<(), TaterError> {
        // Ignore the bot's own seeded reactions.
        let Some(user) = reaction.user_id else {
            return Ok(());
        };
        if user == ctx.cache.current_user().id {
            return Ok(());
        }

        // Sweep and match under the lock, fire hooks outside of it so an
        // action may register new handlers.
        let outcome = {
            let mut handlers = self.handlers.lock().await;
            sweep(
                &mut handlers,
                reaction.channel_id,
                reaction.message_id,
                &reaction.emoji,
                user,
                Instant::now(),
            )
        };

        for expired in outcome.expired {
            if let Err(e) = expired.action.on_timeout(ctx, data).await {
                tracing::warn!("Reaction timeout hook failed: {e}");
            }
        }

        if let Some(hit) = outcome.matched {
            tracing::info!(
                "Reaction {} added by {user} consumed a handler on message {}.",
                reaction.emoji,
                hit.message
            );
            hit.action.on_react(ctx, data, user, &reaction.emoji).await?;
        }

        Ok(())
    }
}

/// What one scan over the handler list produced.
struct Sweep {
    expired: Vec<PendingReaction>,
    matched: Option<PendingReaction>,
}

/// Scan newest to oldest. Expired entries are removed as they are seen;
/// the first match is removed and ends the scan, so at most one handler
/// fires per event.
fn sweep(
    handlers: &mut Vec<PendingReaction>,
    channel: ChannelId,
    message: MessageId,
    emoji: &ReactionType,
    user: UserId,
    now: Instant,
) -> Sweep {
    let mut expired = Vec::new();
    let mut matched = None;

    let mut index = handlers.len();
    while index > 0 {
        index -= 1;

        if now > handlers[index].expires_at {
            expired.push(handlers.remove(index));
            continue;
        }

        let handler = &handlers[index];
        if handler.channel != channel
            || handler.message != message
            || !handler.emojis.contains(emoji)
        {
            continue;
        }
        // A locked handler ignores other users without being consumed.
        if handler.target.is_some_and(|target| target != user) {
            continue;
        }

        matched = Some(handlers.remove(index));
        break;
    }

    Sweep { expired, matched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::emoji;

    struct Noop;

    #[async_trait]
    impl ReactionAction for Noop {
        async fn on_react(
            &self,
            _ctx: &serenity::Context,
            _data: &Data,
            _user: UserId,
            _emoji: &ReactionType,
        ) -> Result<(), TaterError> {
            Ok(())
        }
    }

    fn pending(message: u64, emojis: Vec<ReactionType>, target: Option<UserId>) -> PendingReaction {
        PendingReaction::new(
            MessageId::new(message),
            ChannelId::new(1),
            emojis,
            target,
            Noop,
        )
    }

    #[test]
    fn newest_matching_handler_is_consumed_first() {
        let mut handlers = vec![
            pending(10, vec![emoji::unicode(emoji::CHECK)], None),
            pending(10, vec![emoji::unicode(emoji::CHECK)], None),
        ];

        let outcome = sweep(
            &mut handlers,
            ChannelId::new(1),
            MessageId::new(10),
            &emoji::unicode(emoji::CHECK),
            UserId::new(7),
            Instant::now(),
        );

        assert!(outcome.matched.is_some());
        assert!(outcome.expired.is_empty());
        // The older handler is still registered.
        assert_eq!(handlers.len(), 1);
    }

    #[test]
    fn expired_handlers_are_removed_without_matching() {
        let mut handlers = vec![pending(10, vec![emoji::unicode(emoji::CHECK)], None)];
        handlers[0].expires_at = Instant::now() - Duration::from_secs(1);

        let outcome = sweep(
            &mut handlers,
            ChannelId::new(1),
            MessageId::new(10),
            &emoji::unicode(emoji::CHECK),
            UserId::new(7),
            Instant::now(),
        );

        assert!(outcome.matched.is_none());
        assert_eq!(outcome.expired.len(), 1);
        assert!(handlers.is_empty());
    }

    #[test]
    fn locked_handler_ignores_other_users_and_stays() {
        let mut handlers = vec![pending(
            10,
            vec![emoji::unicode(emoji::CHECK)],
            Some(UserId::new(42)),
        )];

        let outcome = sweep(
            &mut handlers,
            ChannelId::new(1),
            MessageId::new(10),
            &emoji::unicode(emoji::CHECK),
            UserId::new(7),
            Instant::now(),
        );

        assert!(outcome.matched.is_none());
        assert_eq!(handlers.len(), 1);

        let outcome = sweep(
            &mut handlers,
            ChannelId::new(1),
            MessageId::new(10),
            &emoji::unicode(emoji::CHECK),
            UserId::new(42),
            Instant::now(),
        );

        assert!(outcome.matched.is_some());
        assert!(handlers.is_empty());
    }

    #[test]
    fn wrong_emoji_or_message_leaves_handler_registered() {
        let mut handlers = vec![pending(10, vec![emoji::unicode(emoji::CHECK)], None)];

        let outcome = sweep(
            &mut handlers,
            ChannelId::new(1),
            MessageId::new(10),
            &emoji::unicode(emoji::CROSS),
            UserId::new(7),
            Instant::now(),
        );
        assert!(outcome.matched.is_none());

        let outcome = sweep(
            &mut handlers,
            ChannelId::new(1),
            MessageId::new(11),
            &emoji::unicode(emoji::CHECK),
            UserId::new(7),
            Instant::now(),
        );
        assert!(outcome.matched.is_none());
        assert_eq!(handlers.len(), 1);
    }
}
