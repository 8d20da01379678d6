//! Wire-format compliance tests for the codec: lenient parsing, the
//! serialize/parse round trip, tag escaping, and the numeric name table.

use slirc_client::message::tags::{escape_tag_value, unescape_tag_value};
use slirc_client::response::numeric_name;
use slirc_client::{CapSubCommand, Command, Message};

mod parsing {
    use super::*;

    #[test]
    fn raw_preserves_wellformed_lines() {
        let lines = [
            "PING :irc.example.com",
            ":nick!user@host PRIVMSG #channel :Hello, world!",
            ":server 001 nick :Welcome",
            "PRIVMSG #c :",
        ];
        for line in lines {
            assert_eq!(Message::parse(line).raw, line);
        }
    }

    #[test]
    fn empty_trailing_param() {
        let msg = Message::parse("PRIVMSG #c :");
        assert_eq!(msg.params, vec!["#c", ""]);
    }

    #[test]
    fn runs_of_spaces_are_skipped() {
        let msg = Message::parse("MODE    #c    +o    x");
        assert_eq!(msg.params, vec!["#c", "+o", "x"]);
    }

    #[test]
    fn server_prefix_without_bang() {
        let msg = Message::parse(":server 001 nick :Welcome");
        assert_eq!(msg.nick(), Some("server"));
        assert_eq!(msg.user(), None);
        assert_eq!(msg.host(), None);
    }

    #[test]
    fn prefix_without_host() {
        let msg = Message::parse(":n!u PRIVMSG x :y");
        assert_eq!(msg.nick(), Some("n"));
        assert_eq!(msg.user(), Some("u"));
        assert_eq!(msg.host(), None);
    }

    #[test]
    fn privmsg_to_user_has_no_channel() {
        let msg = Message::parse("PRIVMSG user :hi");
        assert_eq!(msg.target(), Some("user"));
        assert_eq!(msg.channel(), None);
    }

    #[test]
    fn join_ampersand_channel() {
        let msg = Message::parse("JOIN &local");
        assert_eq!(msg.channel(), Some("&local"));
    }

    #[test]
    fn tags_decode_once_and_keep_unknown_escapes() {
        let msg = Message::parse("@a=x\\sy;b;c=\\q :n PRIVMSG #c :hi");
        assert_eq!(msg.tag("a"), Some("x y"));
        assert_eq!(msg.tag("b"), Some(""));
        assert_eq!(msg.tag("c"), Some("q"));
    }
}

mod round_trip {
    use super::*;

    /// Serialize each command and re-parse it; command and params must
    /// match the normative wire values.
    #[test]
    fn serialize_then_parse_matches_normative_forms() {
        let cases: Vec<(Command, &str, Vec<&str>)> = vec![
            (Command::Pass("p".into()), "PASS", vec!["p"]),
            (Command::Nick("n".into()), "NICK", vec!["n"]),
            (
                Command::User("u".into(), "0".into(), "real name".into()),
                "USER",
                vec!["u", "0", "*", "real name"],
            ),
            (Command::Quit(Some("out".into())), "QUIT", vec!["out"]),
            (
                Command::Cap(CapSubCommand::Ls, Some("302".into())),
                "CAP",
                vec!["LS", "302"],
            ),
            (
                Command::Cap(CapSubCommand::Req, Some("sasl".into())),
                "CAP",
                vec!["REQ", "sasl"],
            ),
            (Command::Cap(CapSubCommand::End, None), "CAP", vec!["END"]),
            (
                Command::Authenticate("PLAIN".into()),
                "AUTHENTICATE",
                vec!["PLAIN"],
            ),
            (
                Command::Join("#c".into(), Some("k".into())),
                "JOIN",
                vec!["#c", "k"],
            ),
            (
                Command::Part("#c".into(), Some("bye now".into())),
                "PART",
                vec!["#c", "bye now"],
            ),
            (
                Command::Privmsg("t".into(), "".into()),
                "PRIVMSG",
                vec!["t", ""],
            ),
            (
                Command::Notice("t".into(), "a note".into()),
                "NOTICE",
                vec!["t", "a note"],
            ),
            (
                Command::Topic("#c".into(), Some("new topic".into())),
                "TOPIC",
                vec!["#c", "new topic"],
            ),
            (Command::Names("#c".into()), "NAMES", vec!["#c"]),
            (Command::List(None), "LIST", vec![]),
            (
                Command::Invite("n".into(), "#c".into()),
                "INVITE",
                vec!["n", "#c"],
            ),
            (
                Command::Kick("#c".into(), "n".into(), None),
                "KICK",
                vec!["#c", "n"],
            ),
            (
                Command::Mode("#c".into(), vec!["+o".into(), "n".into()]),
                "MODE",
                vec!["#c", "+o", "n"],
            ),
            (Command::Whois("n".into()), "WHOIS", vec!["n"]),
            (
                Command::Whowas("n".into(), Some(3)),
                "WHOWAS",
                vec!["n", "3"],
            ),
            (Command::Who("mask".into(), true), "WHO", vec!["mask", "o"]),
            (
                Command::Ison(vec!["a".into(), "b".into()]),
                "ISON",
                vec!["a", "b"],
            ),
            (
                Command::Userhost(vec!["a".into()]),
                "USERHOST",
                vec!["a"],
            ),
            (Command::Ping("tok".into()), "PING", vec!["tok"]),
            (Command::Pong("tok".into()), "PONG", vec!["tok"]),
            (Command::Motd, "MOTD", vec![]),
            (Command::Version, "VERSION", vec![]),
            (Command::Time, "TIME", vec![]),
            (Command::Admin, "ADMIN", vec![]),
            (Command::Info, "INFO", vec![]),
            (Command::Stats(Some("u".into())), "STATS", vec!["u"]),
            (Command::Away(Some("afk".into())), "AWAY", vec!["afk"]),
            (Command::Away(None), "AWAY", vec![]),
        ];

        for (command, name, params) in cases {
            let wire = command.to_string();
            let parsed = Message::parse(&wire);
            assert_eq!(parsed.command, name, "command mismatch for {}", wire);
            assert_eq!(parsed.params, params, "params mismatch for {}", wire);
        }
    }
}

mod tag_escaping {
    use super::*;

    #[test]
    fn special_characters_round_trip() {
        let value = "semi;colon space\\back\rcr\nlf";
        assert_eq!(unescape_tag_value(&escape_tag_value(value)), value);
    }

    #[test]
    fn escaped_value_survives_a_full_message() {
        let line = format!("@k={} PRIVMSG #c :x", escape_tag_value("a b;c"));
        assert_eq!(Message::parse(&line).tag("k"), Some("a b;c"));
    }
}

mod numerics {
    use super::*;

    #[test]
    fn documented_codes_have_names() {
        let documented = [
            (1, "RPL_WELCOME"),
            (5, "RPL_ISUPPORT"),
            (251, "RPL_LUSERCLIENT"),
            (259, "RPL_ADMINEMAIL"),
            (301, "RPL_AWAY"),
            (311, "RPL_WHOISUSER"),
            (312, "RPL_WHOISSERVER"),
            (313, "RPL_WHOISOPERATOR"),
            (315, "RPL_ENDOFWHO"),
            (317, "RPL_WHOISIDLE"),
            (318, "RPL_ENDOFWHOIS"),
            (319, "RPL_WHOISCHANNELS"),
            (322, "RPL_LIST"),
            (323, "RPL_LISTEND"),
            (330, "RPL_WHOISACCOUNT"),
            (353, "RPL_NAMREPLY"),
            (366, "RPL_ENDOFNAMES"),
            (372, "RPL_MOTD"),
            (376, "RPL_ENDOFMOTD"),
            (401, "ERR_NOSUCHNICK"),
            (422, "ERR_NOMOTD"),
            (433, "ERR_NICKNAMEINUSE"),
            (502, "ERR_USERSDONTMATCH"),
            (900, "RPL_LOGGEDIN"),
            (903, "RPL_SASLSUCCESS"),
            (904, "ERR_SASLFAIL"),
            (907, "ERR_SASLALREADY"),
        ];
        for (code, name) in documented {
            assert_eq!(numeric_name(code), name);
        }
    }

    #[test]
    fn message_numeric_name_view() {
        let msg = Message::parse(":s 376 me :End of /MOTD command");
        assert_eq!(msg.numeric_name(), Some("RPL_ENDOFMOTD"));

        let msg = Message::parse(":s 777 me :???");
        assert_eq!(msg.numeric_name(), Some("unknown"));
    }
}
