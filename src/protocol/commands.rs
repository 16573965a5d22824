//! Module `commands`
//!
//! Parses raw control-channel lines into the `Command` enum.

/// Represents an FTP command parsed from client input.
///
/// Commands that require arguments store them as `String` variants.
#[derive(Debug, PartialEq)]
pub enum Command {
    QUIT,
    SYST,
    FEAT,
    TYPE,
    PWD,
    PASV,
    LIST,
    USER,         // Argument ignored, login is unconditional
    PASS,         // Argument ignored, login is unconditional
    CWD(String),  // Change working directory
    RETR(String), // Retrieve/download file
    STOR(String), // Store/upload file
    DELE(String), // Delete file
    RNFR(String), // Rename source
    RNTO(String), // Rename target
    UNKNOWN,      // Unknown or unsupported command
}

/// Parses a raw command line received from a client into the `Command` enum.
///
/// Verbs are case-insensitive. Verbs that require an argument map to
/// `UNKNOWN` when the argument is missing; `CWD` without an argument
/// targets the root directory.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "QUIT" => Command::QUIT,
        "SYST" => Command::SYST,
        "FEAT" => Command::FEAT,
        "TYPE" => Command::TYPE,
        "PWD" => Command::PWD,
        "PASV" => Command::PASV,
        "LIST" => Command::LIST,
        "USER" => Command::USER,
        "PASS" => Command::PASS,
        "CWD" if arg.is_empty() => Command::CWD("/".to_string()),
        "CWD" => Command::CWD(arg.to_string()),
        "RETR" if !arg.is_empty() => Command::RETR(arg.to_string()),
        "STOR" if !arg.is_empty() => Command::STOR(arg.to_string()),
        "DELE" if !arg.is_empty() => Command::DELE(arg.to_string()),
        "RNFR" if !arg.is_empty() => Command::RNFR(arg.to_string()),
        "RNTO" if !arg.is_empty() => Command::RNTO(arg.to_string()),
        _ => Command::UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_verbs() {
        assert_eq!(parse_command("QUIT\r\n"), Command::QUIT);
        assert_eq!(parse_command("PASV"), Command::PASV);
        assert_eq!(parse_command("LIST\r\n"), Command::LIST);
        assert_eq!(parse_command("PWD"), Command::PWD);
    }

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(parse_command("pasv"), Command::PASV);
        assert_eq!(parse_command("retr file.txt"), Command::RETR("file.txt".into()));
    }

    #[test]
    fn arguments_are_trimmed() {
        assert_eq!(
            parse_command("STOR  data.bin \r\n"),
            Command::STOR("data.bin".into())
        );
    }

    #[test]
    fn login_verbs_ignore_arguments() {
        assert_eq!(parse_command("USER anonymous"), Command::USER);
        assert_eq!(parse_command("PASS"), Command::PASS);
    }

    #[test]
    fn cwd_without_argument_targets_root() {
        assert_eq!(parse_command("CWD"), Command::CWD("/".into()));
        assert_eq!(parse_command("CWD sub"), Command::CWD("sub".into()));
    }

    #[test]
    fn missing_required_argument_is_unknown() {
        assert_eq!(parse_command("RETR"), Command::UNKNOWN);
        assert_eq!(parse_command("DELE "), Command::UNKNOWN);
        assert_eq!(parse_command("RNTO\r\n"), Command::UNKNOWN);
    }

    #[test]
    fn unrecognized_verb_is_unknown() {
        assert_eq!(parse_command("MKD newdir"), Command::UNKNOWN);
        assert_eq!(parse_command(""), Command::UNKNOWN);
    }
}
