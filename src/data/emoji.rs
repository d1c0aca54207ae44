//! Emoji and embed colours used across replies.

use serenity::Colour;
use serenity::ReactionType;

use crate::serenity;

pub const QUESTION: &str = "❓";
pub const CHECK: &str = "✅";
pub const CROSS: &str = "❌";
pub const MAGNIFIER: &str = "🔍";
pub const PING_PONG: &str = "🏓";
pub const UNMUTE: &str = "🔊";
pub const MUTE: &str = "🔇";
pub const HOURGLASS: &str = "⏳";

/// Embed colour for help and utility replies.
pub const COLOR_HELP: Colour = Colour(0x3498DB);
/// Embed colour for classifier replies.
pub const COLOR_NLP: Colour = Colour(0x9B59B6);

/// Build a unicode [ReactionType] from one of the constants above.
pub fn unicode(emoji: &str) -> ReactionType {
    ReactionType::Unicode(emoji.to_string())
}
