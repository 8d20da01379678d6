//! IRC numeric reply names.
//!
//! Servers report command results as three-digit numerics. This module
//! maps the documented set to its symbolic names so callers can log and
//! match replies without memorizing codes.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>
//! - IRCv3 SASL numerics: <https://ircv3.net/specs/extensions/sasl-3.1>

/// Look up the symbolic name for a numeric reply code.
///
/// Returns `"unknown"` for codes outside the documented set.
///
/// # Example
///
/// ```
/// use slirc_client::response::numeric_name;
///
/// assert_eq!(numeric_name(1), "RPL_WELCOME");
/// assert_eq!(numeric_name(433), "ERR_NICKNAMEINUSE");
/// assert_eq!(numeric_name(999), "unknown");
/// ```
pub const fn numeric_name(code: u16) -> &'static str {
    match code {
        // Connection registration
        1 => "RPL_WELCOME",
        2 => "RPL_YOURHOST",
        3 => "RPL_CREATED",
        4 => "RPL_MYINFO",
        5 => "RPL_ISUPPORT",

        // LUSERS / ADMIN
        251 => "RPL_LUSERCLIENT",
        252 => "RPL_LUSEROP",
        253 => "RPL_LUSERUNKNOWN",
        254 => "RPL_LUSERCHANNELS",
        255 => "RPL_LUSERME",
        256 => "RPL_ADMINME",
        257 => "RPL_ADMINLOC1",
        258 => "RPL_ADMINLOC2",
        259 => "RPL_ADMINEMAIL",
        263 => "RPL_TRYAGAIN",
        265 => "RPL_LOCALUSERS",
        266 => "RPL_GLOBALUSERS",

        // Command replies
        300 => "RPL_NONE",
        301 => "RPL_AWAY",
        302 => "RPL_USERHOST",
        303 => "RPL_ISON",
        305 => "RPL_UNAWAY",
        306 => "RPL_NOWAWAY",
        311 => "RPL_WHOISUSER",
        312 => "RPL_WHOISSERVER",
        313 => "RPL_WHOISOPERATOR",
        314 => "RPL_WHOWASUSER",
        315 => "RPL_ENDOFWHO",
        317 => "RPL_WHOISIDLE",
        318 => "RPL_ENDOFWHOIS",
        319 => "RPL_WHOISCHANNELS",
        321 => "RPL_LISTSTART",
        322 => "RPL_LIST",
        323 => "RPL_LISTEND",
        324 => "RPL_CHANNELMODEIS",
        329 => "RPL_CREATIONTIME",
        330 => "RPL_WHOISACCOUNT",
        331 => "RPL_NOTOPIC",
        332 => "RPL_TOPIC",
        333 => "RPL_TOPICWHOTIME",
        341 => "RPL_INVITING",
        346 => "RPL_INVITELIST",
        347 => "RPL_ENDOFINVITELIST",
        348 => "RPL_EXCEPTLIST",
        349 => "RPL_ENDOFEXCEPTLIST",
        351 => "RPL_VERSION",
        352 => "RPL_WHOREPLY",
        353 => "RPL_NAMREPLY",
        364 => "RPL_LINKS",
        365 => "RPL_ENDOFLINKS",
        366 => "RPL_ENDOFNAMES",
        367 => "RPL_BANLIST",
        368 => "RPL_ENDOFBANLIST",
        369 => "RPL_ENDOFWHOWAS",
        371 => "RPL_INFO",
        372 => "RPL_MOTD",
        374 => "RPL_ENDOFINFO",
        375 => "RPL_MOTDSTART",
        376 => "RPL_ENDOFMOTD",
        381 => "RPL_YOUREOPER",
        382 => "RPL_REHASHING",
        391 => "RPL_TIME",

        // Error replies
        401 => "ERR_NOSUCHNICK",
        402 => "ERR_NOSUCHSERVER",
        403 => "ERR_NOSUCHCHANNEL",
        404 => "ERR_CANNOTSENDTOCHAN",
        405 => "ERR_TOOMANYCHANNELS",
        406 => "ERR_WASNOSUCHNICK",
        407 => "ERR_TOOMANYTARGETS",
        409 => "ERR_NOORIGIN",
        411 => "ERR_NORECIPIENT",
        412 => "ERR_NOTEXTTOSEND",
        421 => "ERR_UNKNOWNCOMMAND",
        422 => "ERR_NOMOTD",
        431 => "ERR_NONICKNAMEGIVEN",
        432 => "ERR_ERRONEUSNICKNAME",
        433 => "ERR_NICKNAMEINUSE",
        436 => "ERR_NICKCOLLISION",
        441 => "ERR_USERNOTINCHANNEL",
        442 => "ERR_NOTONCHANNEL",
        443 => "ERR_USERONCHANNEL",
        451 => "ERR_NOTREGISTERED",
        461 => "ERR_NEEDMOREPARAMS",
        462 => "ERR_ALREADYREGISTRED",
        464 => "ERR_PASSWDMISMATCH",
        465 => "ERR_YOUREBANNEDCREEP",
        471 => "ERR_CHANNELISFULL",
        472 => "ERR_UNKNOWNMODE",
        473 => "ERR_INVITEONLYCHAN",
        474 => "ERR_BANNEDFROMCHAN",
        475 => "ERR_BADCHANNELKEY",
        476 => "ERR_BADCHANMASK",
        481 => "ERR_NOPRIVILEGES",
        482 => "ERR_CHANOPRIVSNEEDED",
        483 => "ERR_CANTKILLSERVER",
        491 => "ERR_NOOPERHOST",
        501 => "ERR_UMODEUNKNOWNFLAG",
        502 => "ERR_USERSDONTMATCH",

        // SASL (IRCv3)
        900 => "RPL_LOGGEDIN",
        901 => "RPL_LOGGEDOUT",
        902 => "ERR_NICKLOCKED",
        903 => "RPL_SASLSUCCESS",
        904 => "ERR_SASLFAIL",
        905 => "ERR_SASLTOOLONG",
        906 => "ERR_SASLABORTED",
        907 => "ERR_SASLALREADY",

        _ => "unknown",
    }
}
