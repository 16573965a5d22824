//! Data-transfer layer
//!
//! Passive-mode data channel lifecycle and the chunked transfer engine
//! used by LIST, RETR and STOR.

pub mod data_channel;
pub mod engine;

pub use data_channel::{DataChannel, PEER_WAIT_ATTEMPTS, PEER_WAIT_INTERVAL};
pub use engine::{CHUNK_SIZE, receive_file, send_file, send_listing};
