//! TCP and TLS transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rustls::pki_types::ServerName;
use rustls::RootCertStore;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::warn;

use super::{LineCodec, Transport, TransportError};

enum ReadSide {
    Plain(FramedRead<ReadHalf<TcpStream>, LineCodec>),
    Tls(FramedRead<ReadHalf<TlsStream<TcpStream>>, LineCodec>),
}

enum WriteSide {
    Plain(FramedWrite<WriteHalf<TcpStream>, LineCodec>),
    Tls(FramedWrite<WriteHalf<TlsStream<TcpStream>>, LineCodec>),
}

/// Production transport over TCP, optionally wrapped in TLS.
///
/// The read and write sides are split so the engine's reader and writer
/// tasks operate concurrently without contending on one lock.
pub struct TcpTransport {
    read: Mutex<ReadSide>,
    write: Mutex<WriteSide>,
}

impl TcpTransport {
    /// Connect to `host:port`, performing the TLS handshake when asked.
    ///
    /// TLS validates against the bundled webpki roots with SNI from
    /// `host`.
    pub async fn open(host: &str, port: u16, use_tls: bool) -> Result<Self, TransportError> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true).ok();
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        if use_tls {
            let connector = tls_connector();
            let server_name = ServerName::try_from(host.to_string())
                .map_err(|_| TransportError::Tls(format!("invalid server name: {}", host)))?;
            let tls = connector
                .connect(server_name, stream)
                .await
                .map_err(|e| TransportError::Tls(e.to_string()))?;
            let (read, write) = tokio::io::split(tls);
            Ok(Self {
                read: Mutex::new(ReadSide::Tls(FramedRead::new(read, LineCodec::new()))),
                write: Mutex::new(WriteSide::Tls(FramedWrite::new(write, LineCodec::new()))),
            })
        } else {
            let (read, write) = tokio::io::split(stream);
            Ok(Self {
                read: Mutex::new(ReadSide::Plain(FramedRead::new(read, LineCodec::new()))),
                write: Mutex::new(WriteSide::Plain(FramedWrite::new(write, LineCodec::new()))),
            })
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));
        sock.set_tcp_keepalive(&keepalive)
    }
}

fn tls_connector() -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

#[async_trait]
impl Transport for TcpTransport {
    async fn read_line(&self) -> Result<Option<String>, TransportError> {
        let mut side = self.read.lock().await;
        let next = match &mut *side {
            ReadSide::Plain(framed) => framed.next().await,
            ReadSide::Tls(framed) => framed.next().await,
        };
        match next {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    async fn write_line(&self, line: &str) -> Result<(), TransportError> {
        let mut side = self.write.lock().await;
        match &mut *side {
            WriteSide::Plain(framed) => framed.send(line.to_string()).await,
            WriteSide::Tls(framed) => framed.send(line.to_string()).await,
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut side = self.write.lock().await;
        match &mut *side {
            WriteSide::Plain(framed) => framed.close().await,
            WriteSide::Tls(framed) => framed.close().await,
        }
    }
}
