//! The public client façade.
//!
//! [`Client`] wraps the session engine with typed command helpers and the
//! aggregated query entry points. All entry points except the handshake
//! primitives wait for registration before enqueuing their command, so
//! callers can fire helpers immediately after [`Client::connect`].

mod engine;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::command::Command;
use crate::config::SessionConfig;
use crate::error::ClientError;
use crate::event::{Event, SessionState};
use crate::query::{
    ChannelListing, Collector, QueryReply, WhoEntry, WhoisReply, QUERY_DEADLINE,
};
use crate::transport::Transport;

use self::engine::Engine;

/// Capacity of the event channel; the engine blocks emission when the
/// consumer falls this far behind.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The stream of [`Event`]s for one session.
///
/// Dropping the stream does not end the session; it only discards future
/// events.
pub struct EventStream {
    rx: mpsc::Receiver<Event>,
}

impl EventStream {
    /// Receive the next event, or `None` once the session's engine is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// An IRC client session.
///
/// One `Client` drives one session; construct a new one per connection.
///
/// # Example
///
/// ```no_run
/// use slirc_client::{Client, Event, SessionConfig};
///
/// # async fn run() -> Result<(), slirc_client::ClientError> {
/// let mut config = SessionConfig::new("irc.libera.chat", "rustybot");
/// config.requested_caps = vec!["multi-prefix".into()];
///
/// let (client, mut events) = Client::new(config);
/// client.connect().await?;
/// client.join("#rust", None).await?;
///
/// while let Some(event) = events.recv().await {
///     if let Event::Privmsg { sender, text, .. } = event {
///         println!("<{}> {}", sender, text);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client {
    engine: Arc<Engine>,
}

impl Client {
    /// Create a client and the event stream for its session.
    pub fn new(config: SessionConfig) -> (Self, EventStream) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (
            Self {
                engine: Engine::new(config, tx),
            },
            EventStream { rx },
        )
    }

    /// Open the configured transport and start the session.
    ///
    /// Returns once the background tasks are running; use
    /// [`await_registered`](Self::await_registered) to wait for the
    /// welcome numeric.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.engine.connect().await
    }

    /// Start the session over a caller-provided transport.
    ///
    /// This is how tests drive the engine through a
    /// [`MockTransport`](crate::transport::MockTransport); it also admits
    /// custom tunnels.
    pub async fn connect_with_transport(
        &self,
        transport: Arc<dyn Transport>,
    ) -> Result<(), ClientError> {
        self.engine.connect_with_transport(transport).await
    }

    /// End the session, sending a best-effort QUIT first. Idempotent.
    pub async fn disconnect(&self, reason: Option<&str>) {
        self.engine.disconnect(reason).await;
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.engine.state()
    }

    /// The nickname the server currently knows us by.
    pub fn current_nick(&self) -> String {
        self.engine.current_nick()
    }

    /// Wait until registration completes.
    ///
    /// Returns [`ClientError::NotConnected`] when no session was started
    /// and [`ClientError::Disconnected`] when the session ends before the
    /// welcome numeric arrives.
    pub async fn await_registered(&self) -> Result<(), ClientError> {
        let mut rx = self.engine.subscribe_state();
        let mut entered = false;
        loop {
            let state = *rx.borrow_and_update();
            match state {
                SessionState::Registered => return Ok(()),
                SessionState::Disconnected if !entered => return Err(ClientError::NotConnected),
                SessionState::Disconnected => return Err(ClientError::Disconnected),
                _ => {}
            }
            entered = true;
            if rx.changed().await.is_err() {
                return Err(ClientError::Disconnected);
            }
        }
    }

    async fn ready(&self) -> Result<(), ClientError> {
        match self.state() {
            SessionState::Disconnected => Err(ClientError::NotConnected),
            SessionState::Registered => Ok(()),
            _ => self.await_registered().await,
        }
    }

    /// Send a typed command after registration.
    pub async fn send(&self, command: Command) -> Result<(), ClientError> {
        self.ready().await?;
        self.engine.enqueue_command(&command)
    }

    /// Send a raw protocol line after registration.
    pub async fn send_raw(&self, line: &str) -> Result<(), ClientError> {
        self.ready().await?;
        self.engine.enqueue_raw(line)
    }

    /// Join a channel, with an optional key.
    pub async fn join(&self, channel: &str, key: Option<&str>) -> Result<(), ClientError> {
        self.send(Command::Join(channel.into(), key.map(Into::into)))
            .await
    }

    /// Leave a channel, with an optional reason.
    pub async fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), ClientError> {
        self.send(Command::Part(channel.into(), reason.map(Into::into)))
            .await
    }

    /// Send a message to a channel or nickname.
    pub async fn privmsg(&self, target: &str, text: &str) -> Result<(), ClientError> {
        self.send(Command::Privmsg(target.into(), text.into())).await
    }

    /// Send a notice to a channel or nickname.
    pub async fn notice(&self, target: &str, text: &str) -> Result<(), ClientError> {
        self.send(Command::Notice(target.into(), text.into())).await
    }

    /// Request a nickname change. `current_nick` updates when the server
    /// confirms it.
    pub async fn set_nick(&self, nick: &str) -> Result<(), ClientError> {
        self.send(Command::Nick(nick.into())).await
    }

    /// Set a channel topic.
    pub async fn set_topic(&self, channel: &str, topic: &str) -> Result<(), ClientError> {
        self.send(Command::Topic(channel.into(), Some(topic.into())))
            .await
    }

    /// Ask for a channel's topic; the reply arrives as numeric events.
    pub async fn get_topic(&self, channel: &str) -> Result<(), ClientError> {
        self.send(Command::Topic(channel.into(), None)).await
    }

    /// Kick a user from a channel.
    pub async fn kick(
        &self,
        channel: &str,
        nick: &str,
        reason: Option<&str>,
    ) -> Result<(), ClientError> {
        self.send(Command::Kick(
            channel.into(),
            nick.into(),
            reason.map(Into::into),
        ))
        .await
    }

    /// Invite a user to a channel.
    pub async fn invite(&self, nick: &str, channel: &str) -> Result<(), ClientError> {
        self.send(Command::Invite(nick.into(), channel.into())).await
    }

    /// Change modes on a channel or on ourselves.
    pub async fn set_mode(&self, target: &str, modes: &[&str]) -> Result<(), ClientError> {
        self.send(Command::Mode(
            target.into(),
            modes.iter().map(|m| m.to_string()).collect(),
        ))
        .await
    }

    /// Set the away message, or clear it with `None`.
    pub async fn away(&self, message: Option<&str>) -> Result<(), ClientError> {
        self.send(Command::Away(message.map(Into::into))).await
    }

    /// WHOIS a nickname and collect the reply.
    pub async fn whois(&self, nick: &str) -> Result<WhoisReply, ClientError> {
        match self.run_query(Collector::whois(nick)).await? {
            QueryReply::Whois(reply) => Ok(reply),
            _ => unreachable!("collector resolves to its own reply variant"),
        }
    }

    /// NAMES for a channel.
    pub async fn names(&self, channel: &str) -> Result<Vec<String>, ClientError> {
        match self.run_query(Collector::names(channel)).await? {
            QueryReply::Names(names) => Ok(names),
            _ => unreachable!("collector resolves to its own reply variant"),
        }
    }

    /// WHO for a mask.
    pub async fn who(&self, mask: &str) -> Result<Vec<WhoEntry>, ClientError> {
        match self.run_query(Collector::who(mask)).await? {
            QueryReply::Who(entries) => Ok(entries),
            _ => unreachable!("collector resolves to its own reply variant"),
        }
    }

    /// LIST the network's channels.
    pub async fn list(&self) -> Result<Vec<ChannelListing>, ClientError> {
        match self.run_query(Collector::list()).await? {
            QueryReply::List(rows) => Ok(rows),
            _ => unreachable!("collector resolves to its own reply variant"),
        }
    }

    /// Fetch the message of the day.
    pub async fn motd(&self) -> Result<Vec<String>, ClientError> {
        match self.run_query(Collector::motd()).await? {
            QueryReply::Motd(lines) => Ok(lines),
            _ => unreachable!("collector resolves to its own reply variant"),
        }
    }

    async fn run_query(&self, collector: Collector) -> Result<QueryReply, ClientError> {
        self.ready().await?;
        let (key, rx) = self.engine.start_query(collector)?;

        match tokio::time::timeout(QUERY_DEADLINE, rx).await {
            Ok(Ok(result)) => result,
            // The sender is dropped without a result only when the engine
            // is torn down between insert and resolve.
            Ok(Err(_)) => Err(ClientError::Disconnected),
            Err(_) => {
                self.engine.cancel_query(&key);
                Err(ClientError::QueryTimeout)
            }
        }
    }
}
