//! Incoming IRC message representation.
//!
//! A [`Message`] is the decoded form of one server line: IRCv3 tags, an
//! optional prefix, the command, and its parameters, plus the original
//! line for logging and pass-through. Derived accessors expose the views
//! most handlers need (source nickname, target, trailing text, channel).
//!
//! # Example
//!
//! ```
//! use slirc_client::Message;
//!
//! let msg = Message::parse(":alice!ali@example.org PRIVMSG #rust :hello");
//! assert_eq!(msg.command, "PRIVMSG");
//! assert_eq!(msg.nick(), Some("alice"));
//! assert_eq!(msg.channel(), Some("#rust"));
//! assert_eq!(msg.text(), Some("hello"));
//! ```

mod parse;
pub mod tags;

use std::collections::HashMap;

use crate::response::numeric_name;

/// A decoded IRC protocol line.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// IRCv3 message tags, unescaped. Names are unique.
    pub tags: HashMap<String, String>,
    /// Raw message source, either `nick[!user[@host]]` or a server name.
    pub prefix: Option<String>,
    /// Uppercase command token, or the three-digit numeric as text.
    pub command: String,
    /// Ordered parameters; the last may contain spaces.
    pub params: Vec<String>,
    /// The original line without its trailing CR/LF.
    pub raw: String,
}

impl Message {
    /// Parse a single protocol line.
    ///
    /// Parsing is total: malformed input degrades to a message with fewer
    /// recognized components rather than an error. Trailing CR/LF is
    /// stripped before parsing.
    pub fn parse(line: &str) -> Message {
        let line = line.trim_end_matches(['\r', '\n']);
        let parts = parse::split_line(line);

        Message {
            tags: parts.tags.map(parse::decode_tags).unwrap_or_default(),
            prefix: parts.prefix.map(str::to_string),
            command: parts.command.to_ascii_uppercase(),
            params: parts.params.iter().map(|p| p.to_string()).collect(),
            raw: line.to_string(),
        }
    }

    /// The nickname portion of the prefix.
    ///
    /// A prefix without `!` is returned whole, so a bare server name also
    /// lands here.
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        Some(match prefix.split_once('!') {
            Some((nick, _)) => nick,
            None => prefix,
        })
    }

    /// The username portion of a `nick!user@host` prefix.
    pub fn user(&self) -> Option<&str> {
        let (_, rest) = self.prefix.as_deref()?.split_once('!')?;
        Some(match rest.split_once('@') {
            Some((user, _)) => user,
            None => rest,
        })
    }

    /// The hostname portion of a `nick!user@host` prefix.
    pub fn host(&self) -> Option<&str> {
        let (_, rest) = self.prefix.as_deref()?.split_once('!')?;
        rest.split_once('@').map(|(_, host)| host)
    }

    /// The first parameter.
    pub fn target(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }

    /// The last parameter.
    pub fn text(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// The channel this message concerns, when the command has one.
    ///
    /// Channel-scoped commands take their first parameter; PRIVMSG/NOTICE
    /// only count when the target looks like a channel (`#` or `&`).
    pub fn channel(&self) -> Option<&str> {
        match self.command.as_str() {
            "JOIN" | "PART" | "TOPIC" | "NAMES" | "MODE" | "KICK" => self.target(),
            "PRIVMSG" | "NOTICE" => self
                .target()
                .filter(|t| t.starts_with('#') || t.starts_with('&')),
            _ => None,
        }
    }

    /// The command parsed as a numeric reply code.
    pub fn numeric_code(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }

    /// The symbolic name of a numeric reply, `"unknown"` outside the table.
    pub fn numeric_name(&self) -> Option<&'static str> {
        self.numeric_code().map(numeric_name)
    }

    /// Whether the command is a numeric reply.
    pub fn is_numeric(&self) -> bool {
        self.numeric_code().is_some()
    }

    /// The value of an IRCv3 tag, if present.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}
