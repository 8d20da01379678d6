//! Multi-line query collectors.
//!
//! WHOIS, NAMES, WHO, LIST, and MOTD answers span several numeric replies.
//! A [`Collector`] accumulates the relevant numerics for one request and
//! recognizes its terminator; the engine feeds every incoming message to
//! every pending collector and resolves the caller's oneshot channel when
//! one finishes. At most one query per [`QueryKey`] is in flight at a time.

use std::fmt;
use std::time::Duration;

use crate::casemap::{irc_eq, irc_to_lower};
use crate::command::Command;
use crate::error::ClientError;
use crate::message::Message;

/// How long a query may run before `wait` reports a timeout.
pub const QUERY_DEADLINE: Duration = Duration::from_secs(30);

/// Identity of one in-flight query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// WHOIS for a nickname (case-folded).
    Whois(String),
    /// NAMES for a channel (case-folded).
    Names(String),
    /// WHO for a mask.
    Who(String),
    /// LIST of channels.
    List,
    /// Message of the day.
    Motd,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whois(nick) => write!(f, "WHOIS {}", nick),
            Self::Names(channel) => write!(f, "NAMES {}", channel),
            Self::Who(mask) => write!(f, "WHO {}", mask),
            Self::List => f.write_str("LIST"),
            Self::Motd => f.write_str("MOTD"),
        }
    }
}

/// Accumulated WHOIS information for one nickname.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WhoisReply {
    /// The nickname queried.
    pub nick: String,
    /// Username (ident) from 311.
    pub username: Option<String>,
    /// Hostname from 311.
    pub host: Option<String>,
    /// Real name from 311.
    pub realname: Option<String>,
    /// Server the user is connected to (312).
    pub server: Option<String>,
    /// Server description (312).
    pub server_info: Option<String>,
    /// Whether 313 marked the user as an operator.
    pub operator: bool,
    /// Seconds idle (317).
    pub idle_secs: Option<u64>,
    /// Sign-on time as a unix timestamp (317).
    pub signon_time: Option<u64>,
    /// Channels the user is on (319), membership sigils stripped.
    pub channels: Vec<String>,
    /// Away message (301).
    pub away: Option<String>,
    /// Services account (330).
    pub account: Option<String>,
}

/// One row of a WHO reply (352).
#[derive(Clone, Debug, PartialEq)]
pub struct WhoEntry {
    /// Channel column.
    pub channel: String,
    /// Username (ident).
    pub username: String,
    /// Hostname.
    pub host: String,
    /// Server name.
    pub server: String,
    /// Nickname.
    pub nick: String,
    /// Flags column (H/G, `*`, membership sigils).
    pub flags: String,
    /// Hop count.
    pub hops: Option<u32>,
    /// Real name.
    pub realname: String,
}

/// One row of a LIST reply (322).
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelListing {
    /// Channel name.
    pub channel: String,
    /// Visible user count.
    pub user_count: Option<u32>,
    /// Channel topic.
    pub topic: String,
}

/// The finished result of one query.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryReply {
    /// WHOIS result.
    Whois(WhoisReply),
    /// Nicknames from NAMES.
    Names(Vec<String>),
    /// Rows from WHO.
    Who(Vec<WhoEntry>),
    /// Rows from LIST.
    List(Vec<ChannelListing>),
    /// MOTD lines.
    Motd(Vec<String>),
}

/// Per-request accumulator over the numeric reply stream.
#[derive(Debug)]
pub(crate) enum Collector {
    Whois { nick: String, reply: WhoisReply },
    Names { channel: String, names: Vec<String> },
    Who { mask: String, entries: Vec<WhoEntry> },
    List { channels: Vec<ChannelListing> },
    Motd { lines: Vec<String> },
}

/// Strip membership sigils (`@`, `+`, `%`, `~`) from a channel reference
/// in a 319 or 353 reply. `&` is a channel prefix, not a sigil.
fn strip_sigils(name: &str) -> &str {
    name.trim_start_matches(['@', '+', '%', '~'])
}

impl Collector {
    pub fn whois(nick: &str) -> Self {
        Self::Whois {
            nick: nick.to_string(),
            reply: WhoisReply {
                nick: nick.to_string(),
                ..WhoisReply::default()
            },
        }
    }

    pub fn names(channel: &str) -> Self {
        Self::Names {
            channel: channel.to_string(),
            names: Vec::new(),
        }
    }

    pub fn who(mask: &str) -> Self {
        Self::Who {
            mask: mask.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn list() -> Self {
        Self::List {
            channels: Vec::new(),
        }
    }

    pub fn motd() -> Self {
        Self::Motd { lines: Vec::new() }
    }

    /// The table key this collector occupies.
    pub fn key(&self) -> QueryKey {
        match self {
            Self::Whois { nick, .. } => QueryKey::Whois(irc_to_lower(nick)),
            Self::Names { channel, .. } => QueryKey::Names(irc_to_lower(channel)),
            Self::Who { mask, .. } => QueryKey::Who(irc_to_lower(mask)),
            Self::List { .. } => QueryKey::List,
            Self::Motd { .. } => QueryKey::Motd,
        }
    }

    /// The command that starts this query.
    pub fn request(&self) -> Command {
        match self {
            Self::Whois { nick, .. } => Command::Whois(nick.clone()),
            Self::Names { channel, .. } => Command::Names(channel.clone()),
            Self::Who { mask, .. } => Command::Who(mask.clone(), false),
            Self::List { .. } => Command::List(None),
            Self::Motd { .. } => Command::Motd,
        }
    }

    /// Accumulate from one incoming message, if relevant.
    pub fn feed(&mut self, msg: &Message) {
        let Some(code) = msg.numeric_code() else {
            return;
        };

        match self {
            Self::Whois { nick, reply } => {
                let subject = msg.params.get(1).map(String::as_str).unwrap_or("");
                if !irc_eq(subject, nick) {
                    return;
                }
                match code {
                    301 => reply.away = msg.text().map(str::to_string),
                    311 => {
                        reply.username = msg.params.get(2).cloned();
                        reply.host = msg.params.get(3).cloned();
                        reply.realname = msg.text().map(str::to_string);
                    }
                    312 => {
                        reply.server = msg.params.get(2).cloned();
                        reply.server_info = msg.text().map(str::to_string);
                    }
                    313 => reply.operator = true,
                    317 => {
                        reply.idle_secs = msg.params.get(2).and_then(|p| p.parse().ok());
                        reply.signon_time = msg.params.get(3).and_then(|p| p.parse().ok());
                    }
                    319 => {
                        if let Some(list) = msg.text() {
                            reply.channels.extend(
                                list.split_whitespace()
                                    .map(|c| strip_sigils(c).to_string()),
                            );
                        }
                    }
                    330 => reply.account = msg.params.get(2).cloned(),
                    _ => {}
                }
            }
            Self::Names { channel, names } => {
                if code == 353 && msg.params.iter().any(|p| irc_eq(p, channel)) {
                    if let Some(list) = msg.text() {
                        names.extend(
                            list.split_whitespace()
                                .map(|n| strip_sigils(n).to_string()),
                        );
                    }
                }
            }
            Self::Who { entries, .. } => {
                if code == 352 && msg.params.len() >= 7 {
                    let (hops, realname) = match msg.text().and_then(|t| t.split_once(' ')) {
                        Some((hops, realname)) => (hops.parse().ok(), realname.to_string()),
                        None => (None, msg.text().unwrap_or("").to_string()),
                    };
                    entries.push(WhoEntry {
                        channel: msg.params[1].clone(),
                        username: msg.params[2].clone(),
                        host: msg.params[3].clone(),
                        server: msg.params[4].clone(),
                        nick: msg.params[5].clone(),
                        flags: msg.params[6].clone(),
                        hops,
                        realname,
                    });
                }
            }
            Self::List { channels } => {
                if code == 322 {
                    if let Some(channel) = msg.params.get(1) {
                        channels.push(ChannelListing {
                            channel: channel.clone(),
                            user_count: msg.params.get(2).and_then(|p| p.parse().ok()),
                            topic: msg.text().unwrap_or("").to_string(),
                        });
                    }
                }
            }
            Self::Motd { lines } => {
                if code == 372 {
                    lines.push(msg.text().unwrap_or("").to_string());
                }
            }
        }
    }

    /// Whether this message is the query's success terminator.
    pub fn is_done(&self, msg: &Message) -> bool {
        let Some(code) = msg.numeric_code() else {
            return false;
        };
        let subject = msg.params.get(1).map(String::as_str).unwrap_or("");

        match self {
            Self::Whois { nick, .. } => code == 318 && irc_eq(subject, nick),
            Self::Names { channel, .. } => code == 366 && irc_eq(subject, channel),
            Self::Who { mask, .. } => code == 315 && irc_eq(subject, mask),
            Self::List { .. } => code == 323,
            Self::Motd { .. } => code == 376,
        }
    }

    /// Whether this message is the query's error terminator.
    pub fn failure(&self, msg: &Message) -> Option<ClientError> {
        let code = msg.numeric_code()?;
        let subject = msg.params.get(1).map(String::as_str).unwrap_or("");

        let failed = match self {
            Self::Whois { nick, .. } => code == 401 && irc_eq(subject, nick),
            Self::Motd { .. } => code == 422,
            _ => false,
        };

        failed.then(|| ClientError::ErrorReply {
            code,
            message: msg.text().unwrap_or("").to_string(),
        })
    }

    /// Consume the collector into its result.
    pub fn finish(self) -> QueryReply {
        match self {
            Self::Whois { reply, .. } => QueryReply::Whois(reply),
            Self::Names { names, .. } => QueryReply::Names(names),
            Self::Who { entries, .. } => QueryReply::Who(entries),
            Self::List { channels } => QueryReply::List(channels),
            Self::Motd { lines } => QueryReply::Motd(lines),
        }
    }
}
