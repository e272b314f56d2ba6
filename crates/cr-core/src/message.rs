//! Player-visible narration
//!
//! The rules engine only ever calls [`MessageSink::notify`]. What happens to
//! the text (a message window, a log file, nothing) is up to the caller.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{HIT_MED, HIT_STRONG, HIT_WEAK};

/// Message channel, used by front ends for colouring and filtering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum MsgChannel {
    #[default]
    Plain = 0,
    /// Speech from items or monsters
    Talk = 1,
    /// Things heard rather than seen
    Sound = 2,
    Warn = 3,
    /// Developer-facing combat detail
    Diagnostics = 4,
}

/// Receiver of narration lines. Fire and forget.
pub trait MessageSink {
    fn notify(&mut self, channel: MsgChannel, text: &str);

    fn plain(&mut self, text: &str) {
        self.notify(MsgChannel::Plain, text);
    }
}

/// One recorded line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub channel: MsgChannel,
    pub text: String,
}

/// Sink that keeps every line, in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|m| m.text.as_str())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MessageSink for MessageLog {
    fn notify(&mut self, channel: MsgChannel, text: &str) {
        tracing::trace!(%channel, text, "message");
        self.messages.push(Message {
            channel,
            text: text.to_string(),
        });
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn notify(&mut self, _channel: MsgChannel, _text: &str) {}
}

// ============================================================================
// Formatting helpers
// ============================================================================

/// `" (N)"` followed by punctuation that grows with the damage.
pub fn attack_strength_punctuation(dmg: i32) -> String {
    let exclams = if dmg < HIT_WEAK {
        ".".to_string()
    } else if dmg < HIT_MED {
        "!".to_string()
    } else if dmg < HIT_STRONG {
        "!!".to_string()
    } else {
        let extra = (dmg / HIT_STRONG).max(1).ilog2() as usize;
        "!".repeat(3 + extra)
    };
    format!(" ({dmg}){exclams}")
}

/// Adverb describing how badly an attack missed.
pub fn evasion_margin_adverb(ev_margin: i32) -> &'static str {
    if ev_margin <= -20 {
        " completely"
    } else if ev_margin <= -12 {
        ""
    } else if ev_margin <= -6 {
        " closely"
    } else {
        " barely"
    }
}

pub fn uppercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"the orc"` becomes `"the orc's"`; `"you"` becomes `"your"`.
pub fn apostrophise(name: &str) -> String {
    match name {
        "you" => "your".to_string(),
        "You" => "Your".to_string(),
        _ if name.ends_with('s') => format!("{name}'"),
        _ => format!("{name}'s"),
    }
}

/// Indefinite article for a noun.
pub fn article(noun: &str) -> &'static str {
    match noun.chars().next() {
        Some(c) if "aeiouAEIOU".contains(c) => "an",
        _ => "a",
    }
}
