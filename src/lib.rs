//! # slirc-client
//!
//! An async IRC client library covering RFC 1459/2812 plus the IRCv3
//! extensions for capability negotiation, SASL authentication, and
//! message tags.
//!
//! ## Features
//!
//! - Total, lenient parsing of server lines into [`Message`] values
//! - Typed outbound [`Command`]s with deterministic wire encodings
//! - CAP LS/REQ/ACK/NAK negotiation and SASL PLAIN/EXTERNAL
//! - Aggregated WHOIS/NAMES/WHO/LIST/MOTD queries with one-shot results
//! - Token-bucket outbound rate limiting and PING/PONG liveness
//! - Pluggable [`Transport`](transport::Transport) with TLS and an
//!   in-memory mock for tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use slirc_client::{Client, Event, SessionConfig};
//!
//! # async fn run() -> Result<(), slirc_client::ClientError> {
//! let config = SessionConfig::new("irc.libera.chat", "rustybot");
//! let (client, mut events) = Client::new(config);
//!
//! client.connect().await?;
//! client.await_registered().await?;
//! client.join("#rust", None).await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         Event::Privmsg { sender, text, .. } => println!("<{}> {}", sender, text),
//!         Event::Disconnected { cause } => {
//!             eprintln!("session ended: {:?}", cause);
//!             break;
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
mod client;
mod command;
mod config;
mod error;
mod event;
mod limiter;
pub mod message;
pub mod query;
pub mod response;
pub mod sasl;
pub mod transport;

pub use self::client::{Client, EventStream};
pub use self::command::{CapSubCommand, Command};
pub use self::config::{RateLimitConfig, SaslConfig, SessionConfig};
pub use self::error::ClientError;
pub use self::event::{Event, SessionState};
pub use self::message::Message;
pub use self::query::{ChannelListing, QueryKey, WhoEntry, WhoisReply};
pub use self::transport::{MockTransport, TcpTransport, Transport};
