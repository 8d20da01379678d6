//! Wire-format parsing for incoming IRC lines.
//!
//! The head of a line (`@tags`, `:prefix`, command) is recognized with nom
//! combinators; the parameter list is consumed by a hand-rolled loop so the
//! lenient forms produced by real servers (runs of spaces, empty trailing
//! parameters) are accepted. Parsing is total: every input yields a
//! [`Message`](super::Message), with the empty line producing an empty
//! command and no parameters.

use std::collections::HashMap;

use nom::{
    bytes::complete::{take_till, take_till1},
    character::complete::char,
    combinator::opt,
    sequence::preceded,
    IResult,
};

use super::tags::unescape_tag_value;

/// Raw tags segment: the text between `@` and the next space.
fn tags_part(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_till(|c| c == ' '))(input)
}

/// Raw prefix segment: the text between `:` and the next space.
fn prefix_part(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_till1(|c| c == ' '))(input)
}

/// The command token.
fn command_part(input: &str) -> IResult<&str, &str> {
    take_till1(|c| c == ' ')(input)
}

/// The borrowed pieces of one line, before tag decoding.
pub(super) struct RawParts<'a> {
    pub tags: Option<&'a str>,
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
}

/// Split a line (already stripped of CR/LF) into its raw components.
pub(super) fn split_line(line: &str) -> RawParts<'_> {
    let mut rest = line;

    let tags = match opt(tags_part)(rest) {
        Ok((remaining, tags)) => {
            rest = remaining;
            tags
        }
        Err(_) => None,
    };
    rest = rest.trim_start_matches(' ');

    let prefix = match opt(prefix_part)(rest) {
        Ok((remaining, prefix)) => {
            rest = remaining;
            prefix
        }
        Err(_) => None,
    };
    rest = rest.trim_start_matches(' ');

    let command = match opt(command_part)(rest) {
        Ok((remaining, Some(command))) => {
            rest = remaining;
            command
        }
        _ => "",
    };

    let mut params = Vec::new();
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        if let Some(trailing) = rest.strip_prefix(':') {
            // Trailing parameter: the remainder of the line, spaces and all,
            // possibly empty.
            params.push(trailing);
            break;
        }
        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    RawParts {
        tags,
        prefix,
        command,
        params,
    }
}

/// Decode a raw tags segment into a name/value map.
///
/// A pair without `=` carries an empty value; duplicate names keep the
/// last occurrence. Values are unescaped exactly once.
pub(super) fn decode_tags(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.to_string(), unescape_tag_value(value)),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_command() {
        let parts = split_line("PING");
        assert_eq!(parts.command, "PING");
        assert!(parts.tags.is_none());
        assert!(parts.prefix.is_none());
        assert!(parts.params.is_empty());
    }

    #[test]
    fn test_split_with_prefix_and_trailing() {
        let parts = split_line(":nick!user@host PRIVMSG #channel :Hello, world!");
        assert_eq!(parts.prefix, Some("nick!user@host"));
        assert_eq!(parts.command, "PRIVMSG");
        assert_eq!(parts.params, vec!["#channel", "Hello, world!"]);
    }

    #[test]
    fn test_split_with_tags() {
        let parts = split_line("@time=2023-01-01T00:00:00Z :nick PRIVMSG #ch :Hi");
        assert_eq!(parts.tags, Some("time=2023-01-01T00:00:00Z"));
        assert_eq!(parts.prefix, Some("nick"));
        assert_eq!(parts.command, "PRIVMSG");
        assert_eq!(parts.params, vec!["#ch", "Hi"]);
    }

    #[test]
    fn test_split_runs_of_spaces() {
        let parts = split_line("MODE    #c    +o    x");
        assert_eq!(parts.command, "MODE");
        assert_eq!(parts.params, vec!["#c", "+o", "x"]);
    }

    #[test]
    fn test_split_empty_trailing() {
        let parts = split_line("PRIVMSG #channel :");
        assert_eq!(parts.params, vec!["#channel", ""]);
    }

    #[test]
    fn test_split_empty_line() {
        let parts = split_line("");
        assert_eq!(parts.command, "");
        assert!(parts.params.is_empty());
    }

    #[test]
    fn test_split_trailing_with_colons() {
        let parts = split_line("PRIVMSG #c ::-) still one param");
        assert_eq!(parts.params, vec!["#c", ":-) still one param"]);
    }

    #[test]
    fn test_decode_tags_pairs() {
        let tags = decode_tags("msgid=abc123;time=2023-01-01");
        assert_eq!(tags.get("msgid").map(String::as_str), Some("abc123"));
        assert_eq!(tags.get("time").map(String::as_str), Some("2023-01-01"));
    }

    #[test]
    fn test_decode_tags_flag_without_value() {
        let tags = decode_tags("bot;account=alice");
        assert_eq!(tags.get("bot").map(String::as_str), Some(""));
        assert_eq!(tags.get("account").map(String::as_str), Some("alice"));
    }

    #[test]
    fn test_decode_tags_unescapes_once() {
        let tags = decode_tags("key=value\\swith\\sspace");
        assert_eq!(
            tags.get("key").map(String::as_str),
            Some("value with space")
        );
    }
}
