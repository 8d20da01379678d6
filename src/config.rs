//! Session configuration.

use std::time::Duration;

/// SASL credentials for authentication during registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaslConfig {
    /// PLAIN mechanism with a username and password.
    Plain {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
    /// EXTERNAL mechanism: identity from the TLS client certificate.
    External,
}

/// Outbound rate-limit parameters.
///
/// The writer allows bursts up to `messages_per_window` lines and a
/// sustained rate of `messages_per_window / window`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum number of lines per window.
    pub messages_per_window: u32,
    /// The refill window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            messages_per_window: 5,
            window: Duration::from_secs(2),
        }
    }
}

/// Configuration for one IRC session.
///
/// Immutable once the session is started; build one per connection.
///
/// # Example
///
/// ```
/// use slirc_client::SessionConfig;
///
/// let config = SessionConfig::new("irc.libera.chat", "rustybot");
/// assert_eq!(config.port, 6697);
/// assert!(config.use_tls);
/// ```
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Server hostname.
    pub server: String,
    /// Server port.
    pub port: u16,
    /// Whether to connect with TLS.
    pub use_tls: bool,
    /// Desired nickname.
    pub nick: String,
    /// Username (ident); defaults to the nickname when unset.
    pub username: Option<String>,
    /// Real name / GECOS; defaults to the nickname when unset.
    pub realname: Option<String>,
    /// Server password sent as `PASS` before registration.
    pub password: Option<String>,
    /// SASL credentials; only used when `sasl` is among the requested caps.
    pub sasl: Option<SaslConfig>,
    /// IRCv3 capabilities to request, in request order.
    pub requested_caps: Vec<String>,
    /// Liveness window: the session drops when no PONG arrives within it.
    pub ping_timeout: Duration,
    /// Outbound rate limit.
    pub rate_limit: RateLimitConfig,
}

impl SessionConfig {
    /// Create a configuration with the crate defaults: port 6697, TLS on,
    /// 120 second ping timeout, 5 messages per 2 seconds outbound.
    pub fn new(server: impl Into<String>, nick: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: 6697,
            use_tls: true,
            nick: nick.into(),
            username: None,
            realname: None,
            password: None,
            sasl: None,
            requested_caps: Vec::new(),
            ping_timeout: Duration::from_secs(120),
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// The username, falling back to the nickname.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nick)
    }

    /// The real name, falling back to the nickname.
    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }

    /// Whether SASL should run during registration: credentials are set
    /// and the `sasl` capability is requested.
    pub fn sasl_active(&self) -> bool {
        self.sasl.is_some() && self.requested_caps.iter().any(|c| c == "sasl")
    }
}
