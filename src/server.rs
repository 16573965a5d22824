//! Server core
//!
//! Binds the control listener and spawns one session task per accepted
//! connection. Sessions share nothing; each owns its own data channel,
//! so concurrent clients transfer independently.

use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::session::Session;

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Bind the control listener. The data-port range is bound lazily,
    /// one port per PASV command.
    pub async fn bind(config: ServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.control_socket()).await?;
        info!("Control listener bound to {}", listener.local_addr()?);

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    /// Address the control listener is bound to. Useful when the
    /// configured control port is 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept control connections forever. Dropping the `Server` (or
    /// aborting the task running this) releases the control listener;
    /// live sessions own their resources and clean up on their own.
    pub async fn run(&self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Control connection from {}", addr);
                    let config = Arc::clone(&self.config);

                    // One task per client so the accept loop never blocks.
                    tokio::spawn(async move {
                        if let Err(e) = Session::run(stream, addr, config).await {
                            warn!("Session {} ended with error: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}
