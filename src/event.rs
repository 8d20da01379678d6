//! Events emitted by the session engine.

use crate::message::Message;

/// State of one IRC session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No active session.
    #[default]
    Disconnected,
    /// Transport open in progress.
    Connecting,
    /// Transport open, handshake not yet started.
    Connected,
    /// Handshake in flight, waiting for the welcome numeric.
    Registering,
    /// Received 001; the session is fully usable.
    Registered,
}

/// A decoded occurrence on the session, delivered through the
/// [`EventStream`](crate::EventStream).
///
/// Every parsed server line is yielded as [`Event::Message`]; lines the
/// engine recognizes additionally produce a specific event, emitted before
/// the raw one.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Event {
    /// The transport is open.
    Connected,
    /// Registration completed (001 received).
    Registered,
    /// The session ended; `cause` is set when it ended abnormally.
    Disconnected {
        /// Why the session ended, if it ended on an error.
        cause: Option<String>,
    },
    /// Every parsed incoming line.
    Message(Message),
    /// A PRIVMSG with target, sender, and text present.
    Privmsg {
        /// Channel or nickname the message was addressed to.
        target: String,
        /// Nickname of the sender.
        sender: String,
        /// Message body.
        text: String,
        /// The raw line.
        raw: String,
    },
    /// A NOTICE with target, sender, and text present.
    Notice {
        /// Channel or nickname the notice was addressed to.
        target: String,
        /// Nickname of the sender.
        sender: String,
        /// Notice body.
        text: String,
        /// The raw line.
        raw: String,
    },
    /// Someone joined a channel.
    Join {
        /// The channel joined.
        channel: String,
        /// Who joined.
        nick: String,
        /// The raw line.
        raw: String,
    },
    /// Someone left a channel.
    Part {
        /// The channel left.
        channel: String,
        /// Who left.
        nick: String,
        /// Part reason, if given.
        reason: Option<String>,
        /// The raw line.
        raw: String,
    },
    /// Someone quit the network.
    Quit {
        /// Who quit.
        nick: String,
        /// Quit reason, if given.
        reason: Option<String>,
        /// The raw line.
        raw: String,
    },
    /// Someone was kicked from a channel.
    Kick {
        /// The channel.
        channel: String,
        /// Who was kicked.
        kicked: String,
        /// Who issued the kick.
        by: String,
        /// Kick reason, if given.
        reason: Option<String>,
        /// The raw line.
        raw: String,
    },
    /// A nickname change.
    Nick {
        /// The previous nickname.
        old: String,
        /// The new nickname.
        new: String,
        /// The raw line.
        raw: String,
    },
    /// A channel topic change.
    Topic {
        /// The channel.
        channel: String,
        /// The new topic; empty string clears it.
        topic: Option<String>,
        /// The raw line.
        raw: String,
    },
    /// A mode change.
    Mode {
        /// Channel or nickname the modes apply to.
        target: String,
        /// Mode string and arguments, space-joined.
        modes: String,
        /// The raw line.
        raw: String,
    },
    /// A session-level error (transport failure, SASL failure, ping
    /// timeout). Fatal errors are followed by [`Event::Disconnected`].
    Error(String),
}
