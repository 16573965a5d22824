//! Minimal passive-mode FTP server for memory-constrained hosts.
//!
//! Serves a subset of RFC 959 over TCP: one control connection per
//! client, a private PASV data channel per session, and chunked
//! LIST/RETR/STOR transfers with a small fixed buffer so peak memory
//! stays bounded.
//!
//! Security caveat: credentials are accepted unconditionally and path
//! arguments are not confined to a served root. `..` segments and
//! absolute paths reach the whole filesystem. Deploy only on trusted
//! networks.

pub mod config;
pub mod error;
pub mod paths;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transfer;

pub use config::ServerConfig;
pub use error::FtpError;
pub use server::Server;
