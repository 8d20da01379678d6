//! Property-based tests for parsing and serialization.
//!
//! Verifies that:
//! 1. Parsing never panics, whatever the input line
//! 2. Serialized commands re-parse to the same command and params
//! 3. Tag values round-trip through escape/unescape

use proptest::prelude::*;
use slirc_client::message::tags::{escape_tag_value, unescape_tag_value};
use slirc_client::{Command, Message};

/// Valid IRC nickname per RFC 2812, up to 9 chars.
fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,8}")
        .expect("valid regex")
}

/// Channel name: `#` or `&` followed by ordinary channel characters.
fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Message text without CR/LF/NUL, which the wire format cannot carry.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n\0]{0,200}").expect("valid regex")
}

/// Arbitrary single-line input for the total-parse property.
fn line_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\r\n]{0,300}").expect("valid regex")
}

proptest! {
    #[test]
    fn parse_is_total(line in line_strategy()) {
        let msg = Message::parse(&line);
        prop_assert_eq!(msg.raw, line);
    }

    #[test]
    fn privmsg_round_trips(target in channel_strategy(), text in text_strategy()) {
        let wire = Command::Privmsg(target.clone(), text.clone()).to_string();
        let parsed = Message::parse(&wire);
        prop_assert_eq!(&parsed.command, "PRIVMSG");
        prop_assert_eq!(&parsed.params, &vec![target, text]);
    }

    #[test]
    fn nick_round_trips(nick in nickname_strategy()) {
        let wire = Command::Nick(nick.clone()).to_string();
        let parsed = Message::parse(&wire);
        prop_assert_eq!(&parsed.command, "NICK");
        prop_assert_eq!(&parsed.params, &vec![nick]);
    }

    #[test]
    fn kick_reason_round_trips(
        channel in channel_strategy(),
        nick in nickname_strategy(),
        reason in text_strategy(),
    ) {
        let wire = Command::Kick(channel.clone(), nick.clone(), Some(reason.clone())).to_string();
        let parsed = Message::parse(&wire);
        prop_assert_eq!(&parsed.command, "KICK");
        prop_assert_eq!(&parsed.params, &vec![channel, nick, reason]);
    }

    #[test]
    fn tag_values_round_trip(value in "[ -~\r\n]{0,100}") {
        let escaped = escape_tag_value(&value);
        prop_assert_eq!(unescape_tag_value(&escaped), value);
    }
}
