//! FTP protocol surface
//!
//! Command parsing and the exact reply lines the server emits.

pub mod commands;
pub mod responses;

pub use commands::{Command, parse_command};
