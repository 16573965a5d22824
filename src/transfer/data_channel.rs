//! Module `data_channel`
//!
//! Owns the lifecycle of the listener opened by PASV and the single
//! data connection accepted on it. Every session holds its own
//! `DataChannel`; nothing here is shared between sessions, which is
//! what lets concurrent clients transfer independently.

use log::{debug, warn};
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::time;

use crate::config::ServerConfig;
use crate::error::FtpError;

/// How many poll intervals a data command waits for the client to
/// connect after PASV, and how long each interval is. The product is
/// the total wall-clock budget (500 ms).
pub const PEER_WAIT_ATTEMPTS: u32 = 10;
pub const PEER_WAIT_INTERVAL: Duration = Duration::from_millis(50);

/// Passive-mode data channel for one session.
///
/// At most one is live per session; a new PASV supersedes the previous
/// channel. The accepted peer connection is consumed by exactly one
/// transfer, after which the listener is already gone.
#[derive(Default)]
pub struct DataChannel {
    listener: Option<TcpListener>,
    opened_at: Option<Instant>,
}

impl DataChannel {
    /// Whether a PASV listener is currently live.
    pub fn is_open(&self) -> bool {
        self.listener.is_some()
    }

    /// Open a fresh listener for this session, closing any prior one.
    ///
    /// Scans the configured data port range and binds the first free
    /// port; the scan is the bounded retry policy, so a fully occupied
    /// range yields `BindFailed` rather than an unhandled bind error.
    pub async fn open(&mut self, config: &ServerConfig) -> Result<u16, FtpError> {
        self.close();

        for port in config.data_ports() {
            match TcpListener::bind((config.bind_address.as_str(), port)).await {
                Ok(listener) => {
                    debug!("PASV listener bound to port {}", port);
                    self.listener = Some(listener);
                    self.opened_at = Some(Instant::now());
                    return Ok(port);
                }
                Err(e) => {
                    debug!("PASV bind to port {} failed: {}", port, e);
                }
            }
        }

        warn!(
            "No free PASV port in {}..={}",
            config.data_port_min, config.data_port_max
        );
        Err(FtpError::BindFailed)
    }

    /// Wait for the client to connect to the PASV listener.
    ///
    /// The wait is a single bounded timeout of `attempts * interval`.
    /// On success the listener is dropped so no further connections are
    /// accepted and the stream is handed to exactly one transfer.
    pub async fn await_peer(
        &mut self,
        attempts: u32,
        interval: Duration,
    ) -> Result<TcpStream, FtpError> {
        let listener = self.listener.take().ok_or(FtpError::NoDataConnection)?;
        self.opened_at = None;

        match time::timeout(interval * attempts, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                debug!("Data connection accepted from {}", peer);
                Ok(stream)
            }
            Ok(Err(e)) => Err(FtpError::Io(e)),
            Err(_) => Err(FtpError::NoDataConnection),
        }
    }

    /// Close the listener if one is live. Safe to call when nothing is
    /// open; PASV calls this to supersede the prior channel.
    pub fn close(&mut self) {
        if let Some(listener) = self.listener.take() {
            if let Some(opened_at) = self.opened_at.take() {
                debug!(
                    "Closing PASV listener after {:?} without a transfer",
                    opened_at.elapsed()
                );
            }
            drop(listener);
        }
        self.opened_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test gets a disjoint port range so parallel tests never
    // contend for the same ports.
    fn loopback_config(base: u16) -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1".into(),
            control_port: 0,
            data_port_min: base,
            data_port_max: base + 9,
        }
    }

    #[tokio::test]
    async fn open_binds_port_in_configured_range() {
        let config = loopback_config(42120);
        let mut channel = DataChannel::default();
        let port = channel.open(&config).await.unwrap();
        assert!(config.data_ports().contains(&port));
        assert!(channel.is_open());
    }

    #[tokio::test]
    async fn reopen_supersedes_prior_listener() {
        let config = loopback_config(42130);
        let mut channel = DataChannel::default();
        let first = channel.open(&config).await.unwrap();
        // The prior listener is released before rebinding, so the scan
        // finds the same lowest free port again.
        let second = channel.open(&config).await.unwrap();
        assert_eq!(first, second);

        // A second session scans past the port the live listener holds.
        let mut other = DataChannel::default();
        let third = other.open(&config).await.unwrap();
        assert_ne!(second, third);
    }

    #[tokio::test]
    async fn await_peer_hands_over_accepted_connection() {
        let config = loopback_config(42140);
        let mut channel = DataChannel::default();
        let port = channel.open(&config).await.unwrap();

        let client = tokio::spawn(async move {
            TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        });

        let stream = channel
            .await_peer(PEER_WAIT_ATTEMPTS, PEER_WAIT_INTERVAL)
            .await
            .unwrap();
        assert!(stream.peer_addr().is_ok());
        assert!(!channel.is_open());
        client.await.unwrap();
    }

    #[tokio::test]
    async fn await_peer_times_out_without_client() {
        let config = loopback_config(42150);
        let mut channel = DataChannel::default();
        channel.open(&config).await.unwrap();

        let result = channel.await_peer(2, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(FtpError::NoDataConnection)));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let config = loopback_config(42160);
        let mut channel = DataChannel::default();
        channel.close();
        channel.open(&config).await.unwrap();
        channel.close();
        channel.close();
        assert!(!channel.is_open());
    }
}
