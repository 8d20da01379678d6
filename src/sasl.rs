//! SASL authentication helpers.
//!
//! Credentials are tunneled through `AUTHENTICATE` lines during capability
//! negotiation. The client supports the PLAIN (RFC 4616) and EXTERNAL
//! mechanisms.
//!
//! # Reference
//! - IRCv3 SASL: <https://ircv3.net/specs/extensions/sasl-3.2>
//! - RFC 4616 (PLAIN): <https://tools.ietf.org/html/rfc4616>

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// SASL mechanisms supported by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SaslMechanism {
    /// PLAIN mechanism (RFC 4616): username and password.
    Plain,
    /// EXTERNAL mechanism: identity from the TLS client certificate.
    External,
}

impl SaslMechanism {
    /// The canonical wire name of this mechanism.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::External => "EXTERNAL",
        }
    }
}

impl std::fmt::Display for SaslMechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode credentials for the PLAIN mechanism.
///
/// The payload is `authzid NUL authcid NUL password` with an empty authzid,
/// base64-encoded.
pub fn encode_plain(username: &str, password: &str) -> String {
    let payload = format!("\0{}\0{}", username, password);
    BASE64.encode(payload.as_bytes())
}

/// Encode an EXTERNAL mechanism response.
///
/// The response is `+` (empty) unless an explicit authorization identity
/// is given.
pub fn encode_external(authzid: Option<&str>) -> String {
    match authzid {
        Some(id) if !id.is_empty() => BASE64.encode(id.as_bytes()),
        _ => "+".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_plain() {
        let encoded = encode_plain("testuser", "testpass");
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, b"\0testuser\0testpass");
    }

    #[test]
    fn test_encode_plain_known_vector() {
        assert_eq!(
            encode_plain("authuser", "authpass"),
            "AGF1dGh1c2VyAGF1dGhwYXNz"
        );
    }

    #[test]
    fn test_encode_external_empty() {
        assert_eq!(encode_external(None), "+");
        assert_eq!(encode_external(Some("")), "+");
    }

    #[test]
    fn test_encode_external_with_authzid() {
        let encoded = encode_external(Some("myuser"));
        let decoded = BASE64.decode(&encoded).unwrap();
        assert_eq!(decoded, b"myuser");
    }

    #[test]
    fn test_mechanism_names() {
        assert_eq!(SaslMechanism::Plain.as_str(), "PLAIN");
        assert_eq!(SaslMechanism::External.to_string(), "EXTERNAL");
    }
}
