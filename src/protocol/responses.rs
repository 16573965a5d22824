//! FTP reply lines
//!
//! Exact status lines sent on the control channel. Standard FTP clients
//! match on the three-digit codes, so these are fixed byte-for-byte.

use std::net::Ipv4Addr;

pub const WELCOME: &str = "220 Welcome.\r\n";
pub const LOGGED_IN: &str = "230 Logged in.\r\n";
pub const SYST_UNIX: &str = "215 UNIX Type: L8\r\n";
pub const FEATURES: &str = "211-Features:\r\n211 End\r\n";
pub const TYPE_OK: &str = "200 OK.\r\n";
pub const CWD_OK: &str = "250 OK.\r\n";
pub const FILE_DELETED: &str = "250 File deleted.\r\n";
pub const FILE_RENAMED: &str = "250 File renamed.\r\n";
pub const RENAME_READY: &str = "350 Ready for destination name.\r\n";
pub const GOODBYE: &str = "221 Goodbye.\r\n";

pub const LISTING_FOLLOWS: &str = "150 Here comes the directory listing.\r\n";
pub const OPENING_DATA: &str = "150 Opening data connection.\r\n";
pub const OK_TO_SEND: &str = "150 Ok to send data.\r\n";
pub const DIR_SEND_OK: &str = "226 Directory send OK.\r\n";
pub const TRANSFER_COMPLETE: &str = "226 Transfer complete.\r\n";

pub const USE_PASV_FIRST: &str = "425 Use PASV first.\r\n";
pub const DATA_CONN_FAILED: &str = "425 Data connection failed.\r\n";
pub const CANT_OPEN_DATA: &str = "425 Can't open data connection.\r\n";
pub const NOT_IMPLEMENTED: &str = "502 Command not implemented.\r\n";
pub const BAD_SEQUENCE: &str = "503 Bad sequence of commands.\r\n";
pub const COMMAND_TOO_LONG: &str = "500 Command too long.\r\n";
pub const FAILED: &str = "550 Failed.\r\n";
pub const FILE_NOT_FOUND: &str = "550 File not found.\r\n";
pub const RENAME_FAILED: &str = "550 Rename failed.\r\n";

/// PWD reply with the working directory quoted.
pub fn format_pwd(cwd: &str) -> String {
    format!("257 \"{}\"\r\n", cwd)
}

/// PASV reply encoding the data endpoint as `(a1,a2,a3,a4,p1,p2)`
/// where `port = p1 * 256 + p2`.
pub fn format_pasv(ip: Ipv4Addr, port: u16) -> String {
    let [a1, a2, a3, a4] = ip.octets();
    format!(
        "227 Entering Passive Mode ({},{},{},{},{},{})\r\n",
        a1,
        a2,
        a3,
        a4,
        port >> 8,
        port & 0xFF
    )
}
