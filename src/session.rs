//! Module `session`
//!
//! One session per accepted control connection. Parses one command
//! line at a time, enforces ordering invariants (RNFR before RNTO,
//! PASV before data commands) and drives the transfer engine over the
//! session's private data channel.
//!
//! Commands are processed strictly sequentially: the next control line
//! is not read until the previous command's full reply, including any
//! data transfer, has completed.

use log::{debug, info, warn};
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::config::ServerConfig;
use crate::error::FtpError;
use crate::paths;
use crate::protocol::responses::{self, format_pasv, format_pwd};
use crate::protocol::{Command, parse_command};
use crate::transfer::data_channel::{DataChannel, PEER_WAIT_ATTEMPTS, PEER_WAIT_INTERVAL};
use crate::transfer::engine;

const MAX_COMMAND_LENGTH: usize = 512;

/// State of one FTP control connection.
pub struct Session {
    addr: SocketAddr,
    local_ip: Ipv4Addr,
    config: Arc<ServerConfig>,
    cwd: String,
    rename_from: Option<String>,
    data: DataChannel,
}

impl Session {
    /// Serve one control connection to completion.
    ///
    /// Returns an error only for control-connection I/O failures; all
    /// command-level failures are answered with a status reply and the
    /// session continues. The data channel is torn down on every exit.
    pub async fn run(
        stream: TcpStream,
        addr: SocketAddr,
        config: Arc<ServerConfig>,
    ) -> std::io::Result<()> {
        // The address the client reached us on is what PASV advertises.
        // Embedded deployments are IPv4-only; an IPv6 control connection
        // gets an unusable 0.0.0.0 advertisement.
        let local_ip = match stream.local_addr()?.ip() {
            IpAddr::V4(ip) => ip,
            IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
        };

        let (read_half, mut ctrl) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut session = Session {
            addr,
            local_ip,
            config,
            cwd: "/".to_string(),
            rename_from: None,
            data: DataChannel::default(),
        };

        ctrl.write_all(responses::WELCOME.as_bytes()).await?;
        let result = session.serve(&mut reader, &mut ctrl).await;
        session.data.close();
        info!("Client {} disconnected", addr);
        result
    }

    async fn serve(
        &mut self,
        reader: &mut BufReader<OwnedReadHalf>,
        ctrl: &mut OwnedWriteHalf,
    ) -> std::io::Result<()> {
        let mut line = String::new();

        loop {
            line.clear();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                debug!("Connection closed by client {}", self.addr);
                return Ok(());
            }

            if line.len() > MAX_COMMAND_LENGTH {
                ctrl.write_all(responses::COMMAND_TOO_LONG.as_bytes())
                    .await?;
                continue;
            }

            let command = parse_command(&line);
            debug!("{} -> {:?}", self.addr, command);

            if !self.dispatch(command, ctrl).await? {
                return Ok(());
            }
        }
    }

    /// Execute one command. Returns `false` when the session should end.
    async fn dispatch(
        &mut self,
        command: Command,
        ctrl: &mut OwnedWriteHalf,
    ) -> std::io::Result<bool> {
        match command {
            // No credential check: anything logs in.
            Command::USER | Command::PASS => {
                ctrl.write_all(responses::LOGGED_IN.as_bytes()).await?
            }
            Command::SYST => ctrl.write_all(responses::SYST_UNIX.as_bytes()).await?,
            Command::FEAT => ctrl.write_all(responses::FEATURES.as_bytes()).await?,
            Command::TYPE => ctrl.write_all(responses::TYPE_OK.as_bytes()).await?,
            Command::PWD => ctrl.write_all(format_pwd(&self.cwd).as_bytes()).await?,
            Command::CWD(path) => self.handle_cwd(&path, ctrl).await?,
            Command::PASV => self.handle_pasv(ctrl).await?,
            Command::LIST => self.handle_list(ctrl).await?,
            Command::RETR(name) => self.handle_retr(&name, ctrl).await?,
            Command::STOR(name) => self.handle_stor(&name, ctrl).await?,
            Command::DELE(name) => self.handle_dele(&name, ctrl).await?,
            Command::RNFR(name) => self.handle_rnfr(&name, ctrl).await?,
            Command::RNTO(name) => self.handle_rnto(&name, ctrl).await?,
            Command::QUIT => {
                ctrl.write_all(responses::GOODBYE.as_bytes()).await?;
                self.data.close();
                return Ok(false);
            }
            Command::UNKNOWN => ctrl.write_all(responses::NOT_IMPLEMENTED.as_bytes()).await?,
        }

        Ok(true)
    }

    async fn handle_cwd(&mut self, path: &str, ctrl: &mut OwnedWriteHalf) -> std::io::Result<()> {
        let target = paths::resolve(&self.cwd, path);

        match fs::metadata(&target).await {
            Ok(_) => {
                info!("Client {} changed directory to {}", self.addr, target);
                self.cwd = target;
                ctrl.write_all(responses::CWD_OK.as_bytes()).await
            }
            Err(e) => {
                debug!("CWD to {} failed: {}", target, e);
                ctrl.write_all(responses::FAILED.as_bytes()).await
            }
        }
    }

    async fn handle_pasv(&mut self, ctrl: &mut OwnedWriteHalf) -> std::io::Result<()> {
        // open() supersedes any prior channel for this session.
        match self.data.open(&self.config).await {
            Ok(port) => {
                info!("Client {} entering passive mode on port {}", self.addr, port);
                ctrl.write_all(format_pasv(self.local_ip, port).as_bytes())
                    .await
            }
            Err(e) => {
                warn!("PASV failed for {}: {}", self.addr, e);
                ctrl.write_all(responses::CANT_OPEN_DATA.as_bytes()).await
            }
        }
    }

    async fn handle_list(&mut self, ctrl: &mut OwnedWriteHalf) -> std::io::Result<()> {
        let Some(mut data) = self.open_data_stream(ctrl).await? else {
            return Ok(());
        };

        ctrl.write_all(responses::LISTING_FOLLOWS.as_bytes()).await?;

        let result = engine::send_listing(&self.cwd, &mut data).await;
        let _ = data.shutdown().await;
        drop(data);
        self.data.close();

        match result {
            Ok(()) => ctrl.write_all(responses::DIR_SEND_OK.as_bytes()).await,
            Err(e) => {
                warn!("LIST in {} failed for {}: {}", self.cwd, self.addr, e);
                ctrl.write_all(responses::FAILED.as_bytes()).await
            }
        }
    }

    async fn handle_retr(&mut self, name: &str, ctrl: &mut OwnedWriteHalf) -> std::io::Result<()> {
        let Some(mut data) = self.open_data_stream(ctrl).await? else {
            return Ok(());
        };

        ctrl.write_all(responses::OPENING_DATA.as_bytes()).await?;

        let path = paths::resolve(&self.cwd, name);
        let result = engine::send_file(&path, &mut data).await;
        let _ = data.shutdown().await;
        drop(data);
        self.data.close();

        match result {
            Ok(()) => ctrl.write_all(responses::TRANSFER_COMPLETE.as_bytes()).await,
            Err(e) => {
                warn!("RETR {} failed for {}: {}", path, self.addr, e);
                ctrl.write_all(responses::FAILED.as_bytes()).await
            }
        }
    }

    async fn handle_stor(&mut self, name: &str, ctrl: &mut OwnedWriteHalf) -> std::io::Result<()> {
        let Some(mut data) = self.open_data_stream(ctrl).await? else {
            return Ok(());
        };

        ctrl.write_all(responses::OK_TO_SEND.as_bytes()).await?;

        let path = paths::resolve(&self.cwd, name);
        let result = engine::receive_file(&path, &mut data).await;
        drop(data);
        self.data.close();

        match result {
            Ok(()) => ctrl.write_all(responses::TRANSFER_COMPLETE.as_bytes()).await,
            Err(e) => {
                warn!("STOR {} failed for {}: {}", path, self.addr, e);
                ctrl.write_all(responses::FAILED.as_bytes()).await
            }
        }
    }

    async fn handle_dele(&mut self, name: &str, ctrl: &mut OwnedWriteHalf) -> std::io::Result<()> {
        let path = paths::resolve(&self.cwd, name);

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Client {} deleted {}", self.addr, path);
                ctrl.write_all(responses::FILE_DELETED.as_bytes()).await
            }
            Err(e) => {
                debug!("DELE {} failed: {}", path, e);
                ctrl.write_all(responses::FAILED.as_bytes()).await
            }
        }
    }

    async fn handle_rnfr(&mut self, name: &str, ctrl: &mut OwnedWriteHalf) -> std::io::Result<()> {
        match self.rename_source(name).await {
            Ok(path) => {
                debug!("Rename source for {}: {}", self.addr, path);
                self.rename_from = Some(path);
                ctrl.write_all(responses::RENAME_READY.as_bytes()).await
            }
            Err(FtpError::NotFound) => {
                ctrl.write_all(responses::FILE_NOT_FOUND.as_bytes()).await
            }
            Err(e) => {
                debug!("RNFR {} failed: {}", name, e);
                ctrl.write_all(responses::FAILED.as_bytes()).await
            }
        }
    }

    /// Resolve and stat the rename source; a fresh RNFR supersedes any
    /// pending one, and the source must exist at the time RNFR succeeds.
    async fn rename_source(&mut self, name: &str) -> Result<String, FtpError> {
        self.rename_from = None;
        let path = paths::resolve(&self.cwd, name);

        match fs::metadata(&path).await {
            Ok(_) => Ok(path),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FtpError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn handle_rnto(&mut self, name: &str, ctrl: &mut OwnedWriteHalf) -> std::io::Result<()> {
        match self.perform_rename(name).await {
            Ok(to) => {
                info!("Client {} renamed to {}", self.addr, to);
                ctrl.write_all(responses::FILE_RENAMED.as_bytes()).await
            }
            Err(FtpError::SequenceError) => {
                debug!("RNTO from {} without a pending RNFR", self.addr);
                ctrl.write_all(responses::BAD_SEQUENCE.as_bytes()).await
            }
            Err(e) => {
                warn!("RNTO {} failed for {}: {}", name, self.addr, e);
                ctrl.write_all(responses::RENAME_FAILED.as_bytes()).await
            }
        }
    }

    /// RNTO must follow RNFR in the same session; the pending source is
    /// consumed whether or not the rename succeeds.
    async fn perform_rename(&mut self, name: &str) -> Result<String, FtpError> {
        let from = self.rename_from.take().ok_or(FtpError::SequenceError)?;
        let to = paths::resolve(&self.cwd, name);
        fs::rename(&from, &to).await?;
        Ok(to)
    }

    /// Establish the data connection for a data-bearing command.
    ///
    /// Replies 425 and returns `None` when no PASV channel is open or
    /// the client never connected within the wait budget; the channel
    /// is closed on timeout so the next command starts clean.
    async fn open_data_stream(
        &mut self,
        ctrl: &mut OwnedWriteHalf,
    ) -> std::io::Result<Option<TcpStream>> {
        if !self.data.is_open() {
            ctrl.write_all(responses::USE_PASV_FIRST.as_bytes()).await?;
            return Ok(None);
        }

        match self.data.await_peer(PEER_WAIT_ATTEMPTS, PEER_WAIT_INTERVAL).await {
            Ok(stream) => Ok(Some(stream)),
            Err(e) => {
                warn!("No data connection from {}: {}", self.addr, e);
                self.data.close();
                ctrl.write_all(responses::DATA_CONN_FAILED.as_bytes())
                    .await?;
                Ok(None)
            }
        }
    }
}
