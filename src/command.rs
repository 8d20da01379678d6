//! Outbound IRC command types.
//!
//! [`Command`] is a type-safe description of one line the client can send.
//! Each variant has exactly one wire encoding, produced by the `Display`
//! implementation; the transport appends the CRLF terminator.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - IRCv3 capability negotiation and SASL: <https://ircv3.net/>

use std::fmt::{self, Write};

/// An outbound IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    // Connection registration
    /// `PASS password`
    Pass(String),
    /// `NICK nickname`
    Nick(String),
    /// `USER username mode * :realname`
    User(String, String, String),
    /// `QUIT [:reason]`
    Quit(Option<String>),

    // IRCv3 negotiation
    /// `CAP subcommand [args]`
    Cap(CapSubCommand, Option<String>),
    /// `AUTHENTICATE mechanism_or_payload`
    Authenticate(String),

    // Channel operations
    /// `JOIN channel [key]`
    Join(String, Option<String>),
    /// `PART channel [:reason]`
    Part(String, Option<String>),
    /// `TOPIC channel [:topic]` — without a topic this queries it
    Topic(String, Option<String>),
    /// `NAMES channel`
    Names(String),
    /// `LIST [channel]`
    List(Option<String>),
    /// `INVITE nickname channel`
    Invite(String, String),
    /// `KICK channel nickname [:reason]`
    Kick(String, String, Option<String>),

    // Messaging
    /// `PRIVMSG target :text`
    Privmsg(String, String),
    /// `NOTICE target :text`
    Notice(String, String),

    // Modes
    /// `MODE target [args...]` — without args this queries the modes
    Mode(String, Vec<String>),

    // User queries
    /// `WHOIS nickmask`
    Whois(String),
    /// `WHOWAS nickname [count]`
    Whowas(String, Option<u32>),
    /// `WHO mask [o]`
    Who(String, bool),
    /// `ISON nicknames...`
    Ison(Vec<String>),
    /// `USERHOST nicknames...`
    Userhost(Vec<String>),

    // Server queries
    /// `PING :token`
    Ping(String),
    /// `PONG :token`
    Pong(String),
    /// `MOTD`
    Motd,
    /// `VERSION`
    Version,
    /// `TIME`
    Time,
    /// `ADMIN`
    Admin,
    /// `INFO`
    Info,
    /// `STATS [query]`
    Stats(Option<String>),

    // Presence
    /// `AWAY [:message]` — without a message this clears away status
    Away(Option<String>),

    /// A raw line sent verbatim.
    Raw(String),
}

/// Subcommands of the `CAP` capability negotiation command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapSubCommand {
    /// Request the server's capability list.
    Ls,
    /// List currently enabled capabilities.
    List,
    /// Request capabilities.
    Req,
    /// Server acknowledgement.
    Ack,
    /// Server rejection.
    Nak,
    /// End capability negotiation.
    End,
    /// Server advertises new capabilities (cap-notify).
    New,
    /// Server withdraws capabilities (cap-notify).
    Del,
}

impl CapSubCommand {
    /// The wire form of this subcommand.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ls => "LS",
            Self::List => "LIST",
            Self::Req => "REQ",
            Self::Ack => "ACK",
            Self::Nak => "NAK",
            Self::End => "END",
            Self::New => "NEW",
            Self::Del => "DEL",
        }
    }
}

/// Write a command whose last argument is a bare token.
///
/// The colon prefix is only added when the last argument would otherwise be
/// ambiguous (empty, contains a space, or starts with `:`).
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    if args.is_empty() {
        return f.write_str(cmd);
    }

    let (middle, last) = args.split_at(args.len() - 1);
    let last = last[0];

    f.write_str(cmd)?;
    for arg in middle {
        f.write_char(' ')?;
        f.write_str(arg)?;
    }
    f.write_char(' ')?;
    if last.is_empty() || last.contains(' ') || last.starts_with(':') {
        f.write_char(':')?;
    }
    f.write_str(last)
}

/// Write a command whose last argument is freeform text, always introduced
/// by `:` even when it is a single token or empty.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    match args.split_last() {
        Some((trailing, middle)) => {
            f.write_str(cmd)?;
            for arg in middle {
                f.write_char(' ')?;
                f.write_str(arg)?;
            }
            f.write_str(" :")?;
            f.write_str(trailing)
        }
        None => f.write_str(cmd),
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pass(p) => write_cmd(f, "PASS", &[p]),
            Command::Nick(n) => write_cmd(f, "NICK", &[n]),
            Command::User(u, m, r) => write_cmd_freeform(f, "USER", &[u, m, "*", r]),
            Command::Quit(Some(reason)) => write_cmd_freeform(f, "QUIT", &[reason]),
            Command::Quit(None) => write_cmd(f, "QUIT", &[]),
            Command::Cap(sub, Some(args)) => match sub {
                // REQ argument lists are freeform; LS takes its version as
                // a bare token (`CAP LS 302`).
                CapSubCommand::Req => write_cmd_freeform(f, "CAP", &[sub.as_str(), args]),
                _ => write_cmd(f, "CAP", &[sub.as_str(), args]),
            },
            Command::Cap(sub, None) => write_cmd(f, "CAP", &[sub.as_str()]),
            Command::Authenticate(data) => write_cmd(f, "AUTHENTICATE", &[data]),
            Command::Join(c, Some(key)) => write_cmd(f, "JOIN", &[c, key]),
            Command::Join(c, None) => write_cmd(f, "JOIN", &[c]),
            Command::Part(c, Some(reason)) => write_cmd_freeform(f, "PART", &[c, reason]),
            Command::Part(c, None) => write_cmd(f, "PART", &[c]),
            Command::Topic(c, Some(topic)) => write_cmd_freeform(f, "TOPIC", &[c, topic]),
            Command::Topic(c, None) => write_cmd(f, "TOPIC", &[c]),
            Command::Names(c) => write_cmd(f, "NAMES", &[c]),
            Command::List(Some(c)) => write_cmd(f, "LIST", &[c]),
            Command::List(None) => write_cmd(f, "LIST", &[]),
            Command::Invite(n, c) => write_cmd(f, "INVITE", &[n, c]),
            Command::Kick(c, n, Some(reason)) => write_cmd_freeform(f, "KICK", &[c, n, reason]),
            Command::Kick(c, n, None) => write_cmd(f, "KICK", &[c, n]),
            Command::Privmsg(t, text) => write_cmd_freeform(f, "PRIVMSG", &[t, text]),
            Command::Notice(t, text) => write_cmd_freeform(f, "NOTICE", &[t, text]),
            Command::Mode(target, args) => {
                f.write_str("MODE ")?;
                f.write_str(target)?;
                for arg in args {
                    f.write_char(' ')?;
                    f.write_str(arg)?;
                }
                Ok(())
            }
            Command::Whois(mask) => write_cmd(f, "WHOIS", &[mask]),
            Command::Whowas(n, Some(count)) => write_cmd(f, "WHOWAS", &[n, &count.to_string()]),
            Command::Whowas(n, None) => write_cmd(f, "WHOWAS", &[n]),
            Command::Who(mask, true) => write_cmd(f, "WHO", &[mask, "o"]),
            Command::Who(mask, false) => write_cmd(f, "WHO", &[mask]),
            Command::Ison(nicks) => {
                f.write_str("ISON")?;
                for nick in nicks {
                    f.write_char(' ')?;
                    f.write_str(nick)?;
                }
                Ok(())
            }
            Command::Userhost(nicks) => {
                f.write_str("USERHOST")?;
                for nick in nicks {
                    f.write_char(' ')?;
                    f.write_str(nick)?;
                }
                Ok(())
            }
            Command::Ping(token) => write_cmd_freeform(f, "PING", &[token]),
            Command::Pong(token) => write_cmd_freeform(f, "PONG", &[token]),
            Command::Motd => write_cmd(f, "MOTD", &[]),
            Command::Version => write_cmd(f, "VERSION", &[]),
            Command::Time => write_cmd(f, "TIME", &[]),
            Command::Admin => write_cmd(f, "ADMIN", &[]),
            Command::Info => write_cmd(f, "INFO", &[]),
            Command::Stats(Some(query)) => write_cmd(f, "STATS", &[query]),
            Command::Stats(None) => write_cmd(f, "STATS", &[]),
            Command::Away(Some(msg)) => write_cmd_freeform(f, "AWAY", &[msg]),
            Command::Away(None) => write_cmd(f, "AWAY", &[]),
            Command::Raw(line) => f.write_str(line),
        }
    }
}
