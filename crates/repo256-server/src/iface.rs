//! # Datagram Interfaces
//!
//! A thin, uniform wrapper over the transports the repository serves on:
//! UDP/IPv4 and UNIX datagram sockets. An interface yields
//! `(payload, peer address)` records and can transmit to a peer address;
//! everything above this module is transport-agnostic.
//!
//! UNIX sockets get their stale socket file unlinked before bind and their
//! own file unlinked again on drop. Anonymous UNIX peers cannot be replied
//! to, so their datagrams surface with no peer address.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::{UdpSocket, UnixDatagram};
use tracing::info;

use repo256_core::RepoError;

/// Largest datagram the loop will receive or queue.
pub const MAX_DATAGRAM: usize = 64 * 1024;

/// A replyable peer address on some interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeerAddr {
    Udp(SocketAddr),
    Unix(PathBuf),
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udp(addr) => write!(f, "udp:{addr}"),
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

#[derive(Debug)]
enum Transport {
    Udp(UdpSocket),
    Unix(UnixDatagram),
}

/// One bound datagram socket the event loop serves.
#[derive(Debug)]
pub struct Interface {
    label: String,
    transport: Transport,
    unix_path: Option<PathBuf>,
}

impl Interface {
    /// Bind a UDP interface on `0.0.0.0:port`. Port 0 asks the kernel for
    /// an ephemeral port (used by tests).
    pub async fn udp(port: u16) -> Result<Self, RepoError> {
        let socket = UdpSocket::bind(("0.0.0.0", port)).await?;
        let label = format!("udp/{}", socket.local_addr()?);
        info!(%label, "UDP interface configured");
        Ok(Self {
            label,
            transport: Transport::Udp(socket),
            unix_path: None,
        })
    }

    /// Bind a UNIX datagram interface at `path`, replacing a stale socket
    /// file from a previous run.
    pub fn unix(path: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let path = path.into();
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        let socket = UnixDatagram::bind(&path)?;
        let label = format!("unix/{}", path.display());
        info!(%label, "UNIX interface configured");
        Ok(Self {
            label,
            transport: Transport::Unix(socket),
            unix_path: Some(path),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The bound UDP address, if this is a UDP interface.
    pub fn local_udp_addr(&self) -> Option<SocketAddr> {
        match &self.transport {
            Transport::Udp(socket) => socket.local_addr().ok(),
            Transport::Unix(_) => None,
        }
    }

    /// Receive one datagram. The peer address is `None` for peers that
    /// cannot be replied to (anonymous UNIX sockets).
    pub async fn recv(&self, buf: &mut [u8]) -> io::Result<(usize, Option<PeerAddr>)> {
        match &self.transport {
            Transport::Udp(socket) => {
                let (len, addr) = socket.recv_from(buf).await?;
                Ok((len, Some(PeerAddr::Udp(addr))))
            }
            Transport::Unix(socket) => {
                let (len, addr) = socket.recv_from(buf).await?;
                let peer = addr.as_pathname().map(|p| PeerAddr::Unix(p.to_path_buf()));
                Ok((len, peer))
            }
        }
    }

    /// Transmit one datagram to a peer of this interface.
    pub async fn send(&self, bytes: &[u8], peer: &PeerAddr) -> io::Result<usize> {
        match (&self.transport, peer) {
            (Transport::Udp(socket), PeerAddr::Udp(addr)) => socket.send_to(bytes, addr).await,
            (Transport::Unix(socket), PeerAddr::Unix(path)) => socket.send_to(bytes, path).await,
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "peer address does not match transport",
            )),
        }
    }
}

impl Drop for Interface {
    fn drop(&mut self) {
        if let Some(path) = &self.unix_path {
            let _ = std::fs::remove_file(path);
        }
    }
}
