//! The session engine.
//!
//! The engine is the sole owner of mutable session state: the registration
//! state machine, CAP/SASL negotiation, the pending-query table, and
//! liveness bookkeeping. Three background tasks — reader, writer, and
//! keepalive — share it through an `Arc` and coordinate exclusively
//! through its locked state; the lock is never held across an await.
//!
//! Outbound lines flow through an unbounded queue drained by the writer
//! task, which gates each line on the token bucket so rate-limit backoff
//! never stalls the reader.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::casemap::irc_eq;
use crate::command::{CapSubCommand, Command};
use crate::config::{SaslConfig, SessionConfig};
use crate::error::ClientError;
use crate::event::{Event, SessionState};
use crate::limiter::TokenBucket;
use crate::message::Message;
use crate::query::{Collector, QueryKey, QueryReply};
use crate::sasl;
use crate::transport::{TcpTransport, Transport};

type QueryResult = Result<QueryReply, ClientError>;

/// Per-connection handles, present while a session is active.
struct Conn {
    transport: Arc<dyn Transport>,
    out_tx: mpsc::UnboundedSender<String>,
    shutdown: CancellationToken,
}

/// IRCv3 capability negotiation state.
#[derive(Default)]
struct CapState {
    available: HashSet<String>,
    enabled: HashSet<String>,
    ls_complete: bool,
    sasl_ok: bool,
}

struct PendingQuery {
    collector: Collector,
    tx: oneshot::Sender<QueryResult>,
}

/// State guarded by the engine's lock.
struct Shared {
    conn: Option<Conn>,
    current_nick: String,
    caps: CapState,
    sasl_started: bool,
    sasl_payload_sent: bool,
    registration_sent: bool,
    pending: HashMap<QueryKey, PendingQuery>,
    last_pong: Option<Instant>,
    last_ping_sent: Option<Instant>,
}

pub(crate) struct Engine {
    config: SessionConfig,
    st: Mutex<Shared>,
    state_tx: watch::Sender<SessionState>,
    events: mpsc::Sender<Event>,
}

impl Engine {
    pub fn new(config: SessionConfig, events: mpsc::Sender<Event>) -> Arc<Self> {
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        let current_nick = config.nick.clone();
        Arc::new(Self {
            config,
            st: Mutex::new(Shared {
                conn: None,
                current_nick,
                caps: CapState::default(),
                sasl_started: false,
                sasl_payload_sent: false,
                registration_sent: false,
                pending: HashMap::new(),
                last_pong: None,
                last_ping_sent: None,
            }),
            state_tx,
            events,
        })
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn current_nick(&self) -> String {
        self.lock().current_nick.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // A panic while holding the lock poisons it; the state itself is
        // still coherent enough to tear down, so recover the guard.
        self.st.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open the configured TCP/TLS transport and start the session.
    pub async fn connect(self: &Arc<Self>) -> Result<(), ClientError> {
        self.claim_connecting()?;
        debug!(server = %self.config.server, port = self.config.port, tls = self.config.use_tls, "connecting");

        match TcpTransport::open(&self.config.server, self.config.port, self.config.use_tls).await {
            Ok(transport) => {
                self.start(Arc::new(transport)).await;
                Ok(())
            }
            Err(e) => {
                self.state_tx.send_replace(SessionState::Disconnected);
                Err(ClientError::ConnectFailed(e))
            }
        }
    }

    /// Start the session over an already-open transport.
    pub async fn connect_with_transport(
        self: &Arc<Self>,
        transport: Arc<dyn Transport>,
    ) -> Result<(), ClientError> {
        self.claim_connecting()?;
        self.start(transport).await;
        Ok(())
    }

    fn claim_connecting(&self) -> Result<(), ClientError> {
        let st = self.lock();
        if st.conn.is_some() || self.state() != SessionState::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }
        self.state_tx.send_replace(SessionState::Connecting);
        Ok(())
    }

    /// Install the connection, run the handshake enqueues, and spawn the
    /// background tasks. Returns once the tasks are running; registration
    /// completes asynchronously.
    async fn start(self: &Arc<Self>, transport: Arc<dyn Transport>) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        {
            let mut st = self.lock();
            st.conn = Some(Conn {
                transport: transport.clone(),
                out_tx,
                shutdown: shutdown.clone(),
            });
            st.current_nick = self.config.nick.clone();
            st.caps = CapState::default();
            st.sasl_started = false;
            st.sasl_payload_sent = false;
            st.registration_sent = false;
            st.last_pong = None;
            st.last_ping_sent = None;
        }

        self.state_tx.send_replace(SessionState::Connected);
        self.emit(Event::Connected).await;

        {
            let mut st = self.lock();
            if !self.config.requested_caps.is_empty() {
                enqueue(&st, &Command::Cap(CapSubCommand::Ls, Some("302".into())));
            }
            if let Some(pass) = &self.config.password {
                enqueue(&st, &Command::Pass(pass.clone()));
            }
            if self.config.sasl_active() {
                // NICK/USER are withheld until SASL resolves so the server
                // never registers us under an unauthenticated identity.
                debug!("delaying NICK/USER until SASL resolves");
            } else {
                self.flush_registration(&mut st);
            }
        }
        self.state_tx.send_replace(SessionState::Registering);

        tokio::spawn(reader_task(
            self.clone(),
            transport.clone(),
            shutdown.clone(),
        ));
        tokio::spawn(writer_task(self.clone(), transport, out_rx, shutdown.clone()));
        tokio::spawn(keepalive_task(self.clone(), shutdown));
    }

    /// Best-effort QUIT, then tear the session down.
    pub async fn disconnect(self: &Arc<Self>, reason: Option<&str>) {
        let transport = self.lock().conn.as_ref().map(|c| c.transport.clone());
        let Some(transport) = transport else {
            return;
        };

        if matches!(
            self.state(),
            SessionState::Registering | SessionState::Registered
        ) {
            let quit = Command::Quit(reason.map(str::to_string));
            let _ = transport.write_line(&quit.to_string()).await;
        }
        self.cleanup(None).await;
    }

    /// Enqueue one command for the writer. Fails when no session is active.
    pub fn enqueue_command(&self, command: &Command) -> Result<(), ClientError> {
        self.enqueue_raw(&command.to_string())
    }

    pub fn enqueue_raw(&self, line: &str) -> Result<(), ClientError> {
        let st = self.lock();
        let conn = st.conn.as_ref().ok_or(ClientError::NotConnected)?;
        conn.out_tx
            .send(line.to_string())
            .map_err(|_| ClientError::NotConnected)
    }

    /// Register a collector and enqueue its request.
    ///
    /// The table entry is inserted before the request line goes out so no
    /// reply can race past the collector.
    pub fn start_query(
        &self,
        collector: Collector,
    ) -> Result<(QueryKey, oneshot::Receiver<QueryResult>), ClientError> {
        let mut st = self.lock();
        if st.conn.is_none() {
            return Err(ClientError::NotConnected);
        }

        let key = collector.key();
        if st.pending.contains_key(&key) {
            return Err(ClientError::QueryInFlight(key.to_string()));
        }

        let request = collector.request();
        let (tx, rx) = oneshot::channel();
        st.pending.insert(key.clone(), PendingQuery { collector, tx });
        enqueue(&st, &request);
        Ok((key, rx))
    }

    /// Drop a pending query, e.g. after its deadline expired.
    pub fn cancel_query(&self, key: &QueryKey) {
        self.lock().pending.remove(key);
    }

    /// Process one incoming line: query routing first, then protocol
    /// handling and event emission.
    async fn handle_line(self: &Arc<Self>, line: &str) {
        trace!(line, "<-");
        let msg = Message::parse(line);

        let mut events = Vec::new();
        let mut completions = Vec::new();
        {
            let mut st = self.lock();
            if st.conn.is_none() {
                return;
            }
            route_queries(&mut st, &msg, &mut completions);
            self.handle_message(&mut st, &msg, &mut events);
        }

        for (tx, result) in completions {
            let _ = tx.send(result);
        }
        for event in events {
            self.emit(event).await;
        }
        self.emit(Event::Message(msg)).await;
    }

    fn handle_message(&self, st: &mut Shared, msg: &Message, events: &mut Vec<Event>) {
        match msg.command.as_str() {
            "CAP" => self.on_cap(st, msg),
            "AUTHENTICATE" => self.on_authenticate(st, msg),
            "PING" => {
                let token = msg.text().unwrap_or("").to_string();
                enqueue(st, &Command::Pong(token));
            }
            "PONG" => st.last_pong = Some(Instant::now()),
            "PRIVMSG" => {
                if let (Some(sender), Some(target), Some(text), true) =
                    (msg.nick(), msg.target(), msg.text(), msg.params.len() >= 2)
                {
                    events.push(Event::Privmsg {
                        target: target.to_string(),
                        sender: sender.to_string(),
                        text: text.to_string(),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "NOTICE" => {
                if let (Some(sender), Some(target), Some(text), true) =
                    (msg.nick(), msg.target(), msg.text(), msg.params.len() >= 2)
                {
                    events.push(Event::Notice {
                        target: target.to_string(),
                        sender: sender.to_string(),
                        text: text.to_string(),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "JOIN" => {
                if let (Some(nick), Some(channel)) = (msg.nick(), msg.target()) {
                    events.push(Event::Join {
                        channel: channel.to_string(),
                        nick: nick.to_string(),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "PART" => {
                if let (Some(nick), Some(channel)) = (msg.nick(), msg.target()) {
                    events.push(Event::Part {
                        channel: channel.to_string(),
                        nick: nick.to_string(),
                        reason: msg.params.get(1).cloned(),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "QUIT" => {
                if let Some(nick) = msg.nick() {
                    events.push(Event::Quit {
                        nick: nick.to_string(),
                        reason: msg.params.first().cloned(),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "KICK" => {
                if let (Some(by), true) = (msg.nick(), msg.params.len() >= 2) {
                    events.push(Event::Kick {
                        channel: msg.params[0].clone(),
                        kicked: msg.params[1].clone(),
                        by: by.to_string(),
                        reason: msg.params.get(2).cloned(),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "NICK" => {
                if let (Some(old), Some(new)) = (msg.nick(), msg.text()) {
                    if irc_eq(old, &st.current_nick) {
                        debug!(old = %st.current_nick, new, "own nick changed");
                        st.current_nick = new.to_string();
                    }
                    events.push(Event::Nick {
                        old: old.to_string(),
                        new: new.to_string(),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "TOPIC" => {
                if let Some(channel) = msg.target() {
                    events.push(Event::Topic {
                        channel: channel.to_string(),
                        topic: msg.params.get(1).cloned(),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "MODE" => {
                if let Some(target) = msg.target() {
                    events.push(Event::Mode {
                        target: target.to_string(),
                        modes: msg.params[1..].join(" "),
                        raw: msg.raw.clone(),
                    });
                }
            }
            "ERROR" => {
                events.push(Event::Error(format!(
                    "server error: {}",
                    msg.text().unwrap_or("")
                )));
            }
            _ => {
                if let Some(code) = msg.numeric_code() {
                    self.on_numeric(st, code, msg, events);
                }
            }
        }
    }

    fn on_numeric(&self, st: &mut Shared, code: u16, msg: &Message, events: &mut Vec<Event>) {
        match code {
            // RPL_WELCOME: registration is complete.
            1 => {
                if let Some(nick) = msg.params.first().filter(|n| !n.is_empty() && *n != "*") {
                    st.current_nick = nick.clone();
                }
                st.last_pong = Some(Instant::now());
                self.state_tx.send_replace(SessionState::Registered);
                events.push(Event::Registered);
                debug!(nick = %st.current_nick, "registered");
            }
            // ERR_NICKNAMEINUSE during registration: retry with a suffix.
            433 if self.state() == SessionState::Registering => {
                st.current_nick.push('_');
                debug!(nick = %st.current_nick, "nickname in use, retrying");
                enqueue(st, &Command::Nick(st.current_nick.clone()));
            }
            // RPL_SASLSUCCESS
            903 if st.sasl_started && !st.caps.sasl_ok => {
                st.caps.sasl_ok = true;
                debug!("SASL authentication succeeded");
                self.flush_registration(st);
                enqueue(st, &Command::Cap(CapSubCommand::End, None));
            }
            // SASL failures: surface the error but keep registering; the
            // server may still accept us unauthenticated.
            904 | 905 | 906 if st.sasl_started => {
                warn!(code, "SASL authentication failed");
                events.push(Event::Error(format!(
                    "SASL authentication failed: {}",
                    msg.raw
                )));
                self.flush_registration(st);
                enqueue(st, &Command::Cap(CapSubCommand::End, None));
            }
            _ => {}
        }
    }

    fn on_cap(&self, st: &mut Shared, msg: &Message) {
        let sub = msg
            .params
            .get(1)
            .map(|s| s.to_ascii_uppercase())
            .unwrap_or_default();
        match sub.as_str() {
            "LS" => {
                if st.caps.ls_complete {
                    return;
                }
                // An extra `*` between the subcommand and the list marks a
                // continuation line.
                let more = msg.params.len() >= 4 && msg.params[2] == "*";
                for cap in msg.text().unwrap_or("").split_whitespace() {
                    let name = cap.split('=').next().unwrap_or(cap);
                    st.caps.available.insert(name.to_string());
                }
                if more {
                    return;
                }

                let wanted: Vec<String> = self
                    .config
                    .requested_caps
                    .iter()
                    .filter(|c| st.caps.available.contains(*c))
                    .cloned()
                    .collect();
                if wanted.is_empty() {
                    st.caps.ls_complete = true;
                    enqueue(st, &Command::Cap(CapSubCommand::End, None));
                    self.flush_registration(st);
                } else {
                    enqueue(st, &Command::Cap(CapSubCommand::Req, Some(wanted.join(" "))));
                }
            }
            "ACK" => {
                for cap in msg.text().unwrap_or("").split_whitespace() {
                    st.caps.enabled.insert(cap.to_string());
                }

                let start_sasl = st.caps.enabled.contains("sasl")
                    && self.config.sasl.is_some()
                    && !st.caps.sasl_ok
                    && !st.sasl_started;
                if start_sasl {
                    st.sasl_started = true;
                    match self.config.sasl.as_ref() {
                        Some(SaslConfig::Plain { .. }) => {
                            enqueue(st, &Command::Authenticate("PLAIN".into()));
                        }
                        Some(SaslConfig::External) => {
                            enqueue(st, &Command::Authenticate("EXTERNAL".into()));
                            enqueue(st, &Command::Authenticate("+".into()));
                        }
                        None => {}
                    }
                } else {
                    enqueue(st, &Command::Cap(CapSubCommand::End, None));
                    self.flush_registration(st);
                }
            }
            "NAK" => {
                st.caps.ls_complete = true;
                enqueue(st, &Command::Cap(CapSubCommand::End, None));
                self.flush_registration(st);
            }
            _ => {}
        }
    }

    fn on_authenticate(&self, st: &mut Shared, msg: &Message) {
        // `AUTHENTICATE +` is the server's go-ahead for the credential
        // payload. Only PLAIN has one; EXTERNAL already answered.
        if msg.target() != Some("+") || !st.sasl_started || st.sasl_payload_sent {
            return;
        }
        if let Some(SaslConfig::Plain { username, password }) = self.config.sasl.as_ref() {
            st.sasl_payload_sent = true;
            let payload = sasl::encode_plain(username, password);
            enqueue(st, &Command::Authenticate(payload));
        }
    }

    /// Send NICK/USER once per session.
    fn flush_registration(&self, st: &mut Shared) {
        if st.registration_sent {
            return;
        }
        st.registration_sent = true;
        enqueue(st, &Command::Nick(st.current_nick.clone()));
        enqueue(
            st,
            &Command::User(
                self.config.username().to_string(),
                "0".into(),
                self.config.realname().to_string(),
            ),
        );
    }

    /// Tear down the session: stop the tasks, close the transport, fail
    /// every pending query, and reset negotiation state. Idempotent.
    pub async fn cleanup(self: &Arc<Self>, cause: Option<String>) {
        let (conn, waiters) = {
            let mut st = self.lock();
            let Some(conn) = st.conn.take() else {
                return;
            };
            conn.shutdown.cancel();
            let waiters: Vec<_> = st.pending.drain().map(|(_, p)| p.tx).collect();
            st.caps = CapState::default();
            st.sasl_started = false;
            st.sasl_payload_sent = false;
            st.registration_sent = false;
            st.last_pong = None;
            st.last_ping_sent = None;
            (conn, waiters)
        };

        debug!(?cause, "session cleanup");
        self.state_tx.send_replace(SessionState::Disconnected);
        for tx in waiters {
            let _ = tx.send(Err(ClientError::Disconnected));
        }
        if let Err(e) = conn.transport.close().await {
            warn!("transport close failed: {}", e);
        }
        self.emit(Event::Disconnected { cause }).await;
    }

    /// Deliver one event, blocking while the consumer lags. A dropped
    /// consumer turns emission into a no-op.
    async fn emit(&self, event: Event) {
        let _ = self.events.send(event).await;
    }
}

/// Push one serialized command onto the outbound queue.
fn enqueue(st: &Shared, command: &Command) {
    if let Some(conn) = &st.conn {
        let line = command.to_string();
        trace!(line = %line, "enqueue");
        let _ = conn.out_tx.send(line);
    }
}

/// Feed the message to every pending query; finished ones are removed and
/// their waiters resolved exactly once.
fn route_queries(
    st: &mut Shared,
    msg: &Message,
    completions: &mut Vec<(oneshot::Sender<QueryResult>, QueryResult)>,
) {
    let mut finished: Vec<(QueryKey, Option<ClientError>)> = Vec::new();
    for (key, pending) in st.pending.iter_mut() {
        pending.collector.feed(msg);
        if let Some(err) = pending.collector.failure(msg) {
            finished.push((key.clone(), Some(err)));
        } else if pending.collector.is_done(msg) {
            finished.push((key.clone(), None));
        }
    }

    for (key, err) in finished {
        if let Some(pending) = st.pending.remove(&key) {
            let result = match err {
                Some(e) => Err(e),
                None => Ok(pending.collector.finish()),
            };
            completions.push((pending.tx, result));
        }
    }
}

async fn reader_task(
    engine: Arc<Engine>,
    transport: Arc<dyn Transport>,
    shutdown: CancellationToken,
) {
    loop {
        let read = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = transport.read_line() => read,
        };
        match read {
            Ok(Some(line)) => engine.handle_line(&line).await,
            Ok(None) => {
                debug!("server closed the connection");
                engine.cleanup(Some("connection closed".into())).await;
                break;
            }
            Err(e) => {
                let text = format!("read failed: {}", e);
                engine.emit(Event::Error(text.clone())).await;
                engine.cleanup(Some(text)).await;
                break;
            }
        }
    }
}

async fn writer_task(
    engine: Arc<Engine>,
    transport: Arc<dyn Transport>,
    mut out_rx: mpsc::UnboundedReceiver<String>,
    shutdown: CancellationToken,
) {
    let mut bucket = TokenBucket::new(engine.config.rate_limit);
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = out_rx.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = bucket.acquire() => {}
        }

        trace!(line = %line, "->");
        if let Err(e) = transport.write_line(&line).await {
            let text = format!("write failed: {}", e);
            warn!("{}", text);
            engine.emit(Event::Error(text.clone())).await;
            engine.cleanup(Some(text)).await;
            break;
        }
    }
}

async fn keepalive_task(engine: Arc<Engine>, shutdown: CancellationToken) {
    let period = engine.config.ping_timeout / 2;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(period) => {}
        }

        let timed_out = {
            let mut st = engine.lock();
            if st.conn.is_none() {
                return;
            }
            let registered = engine.state() == SessionState::Registered;
            let expired = registered
                && st
                    .last_pong
                    .is_some_and(|t| t.elapsed() > engine.config.ping_timeout);
            if expired {
                debug!(
                    since_ping = ?st.last_ping_sent.map(|t| t.elapsed()),
                    "pong overdue"
                );
            } else {
                let token = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default()
                    .to_string();
                enqueue(&st, &Command::Ping(token));
                st.last_ping_sent = Some(Instant::now());
            }
            expired
        };

        if timed_out {
            engine.emit(Event::Error("ping timeout".into())).await;
            engine.cleanup(Some("ping timeout".into())).await;
            return;
        }
    }
}
