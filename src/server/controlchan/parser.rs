//! Parses raw control channel lines into [`Command`]s.

use super::command::{Command, Password};
use crate::BoxError;
use derive_more::Display;
use std::str;
use thiserror::Error;

/// Result type of the line parser.
pub(crate) type Result<T> = std::result::Result<T, ParseError>;

/// The error returned when a received line cannot be turned into a command.
#[derive(Debug, Error)]
#[error("parse error: {kind}")]
pub(crate) struct ParseError {
    kind: ParseErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> ParseError {
        ParseError { kind, source: None }
    }
}

impl From<str::Utf8Error> for ParseError {
    fn from(err: str::Utf8Error) -> ParseError {
        ParseError {
            kind: ParseErrorKind::InvalidUtf8,
            source: Some(Box::new(err)),
        }
    }
}

impl PartialEq for ParseError {
    fn eq(&self, other: &ParseError) -> bool {
        self.kind == other.kind
    }
}

/// What exactly was wrong with the line.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub(crate) enum ParseErrorKind {
    /// The line did not end in a line feed.
    #[display("invalid end of line")]
    InvalidEol,
    /// The line contained a byte outside printable ASCII.
    #[display("invalid character in command")]
    InvalidToken,
    /// The line was not valid UTF-8.
    #[display("invalid UTF-8 in command")]
    InvalidUtf8,
    /// A known verb came with a missing or malformed argument.
    #[display("invalid command (invalid parameter)")]
    InvalidCommand,
}

/// Parses one received line, terminator included, into a [`Command`].
///
/// The grammar is `VERB [ SP ARGUMENT ] CRLF`: a single-space split limited to
/// two parts, verb matched case-insensitively. A second space therefore
/// belongs to the argument, which allows arguments with leading spaces.
pub(crate) fn parse<T: AsRef<[u8]>>(line: T) -> Result<Command> {
    let line = strip_eol(line.as_ref())?;
    for b in line {
        if !is_valid_token_char(*b) {
            return Err(ParseErrorKind::InvalidToken.into());
        }
    }
    let line = str::from_utf8(line)?;
    let (verb, argument) = match line.split_once(' ') {
        Some((verb, argument)) => (verb, argument),
        None => (line, ""),
    };
    let verb = verb.to_uppercase();

    let cmd = match verb.as_str() {
        "USER" => Command::User {
            username: required(argument)?.to_string(),
        },
        "PASS" => Command::Pass {
            password: Password::new(argument),
        },
        "QUIT" => no_arguments(argument, Command::Quit)?,
        "NOOP" => no_arguments(argument, Command::Noop)?,
        "SYST" => no_arguments(argument, Command::Syst)?,
        "TYPE" => Command::Type {
            param: required(argument)?.to_string(),
        },
        "PWD" | "XPWD" => no_arguments(argument, Command::Pwd)?,
        "CWD" | "XCWD" => Command::Cwd {
            path: required(argument)?.to_string(),
        },
        "CDUP" => no_arguments(argument, Command::Cdup)?,
        "MKD" | "XMKD" => Command::Mkd {
            path: required(argument)?.to_string(),
        },
        "RMD" => Command::Rmd {
            path: required(argument)?.to_string(),
        },
        "DELE" => Command::Dele {
            path: required(argument)?.to_string(),
        },
        "SIZE" => Command::Size {
            path: required(argument)?.to_string(),
        },
        "MDTM" => Command::Mdtm {
            path: required(argument)?.to_string(),
        },
        "RNFR" => Command::Rnfr {
            path: required(argument)?.to_string(),
        },
        "RNTO" => Command::Rnto {
            path: required(argument)?.to_string(),
        },
        "PORT" => Command::Port {
            addr: required(argument)?.to_string(),
        },
        "PASV" => no_arguments(argument, Command::Pasv)?,
        "REST" => {
            let offset = required(argument)?.parse::<u64>().map_err(|_| ParseErrorKind::InvalidCommand)?;
            Command::Rest { offset }
        }
        "LIST" => Command::List {
            // Clients habitually pass ls flags like -la; skip them.
            path: argument.split(' ').find(|s| !s.is_empty() && !s.starts_with('-')).map(str::to_string),
        },
        "NLST" => Command::Nlst {
            path: if argument.is_empty() { None } else { Some(argument.to_string()) },
        },
        "RETR" => Command::Retr {
            path: required(argument)?.to_string(),
        },
        "STOR" => Command::Stor {
            path: required(argument)?.to_string(),
        },
        "APPE" => Command::Appe {
            path: required(argument)?.to_string(),
        },
        _ => Command::Other {
            command_name: verb,
            arguments: argument.to_string(),
        },
    };

    Ok(cmd)
}

// Lines must end in '\n'; not all clients send the (actually mandatory) '\r'.
fn strip_eol(line: &[u8]) -> Result<&[u8]> {
    match line {
        [rest @ .., b'\r', b'\n'] => Ok(rest),
        [rest @ .., b'\n'] => Ok(rest),
        _ => Err(ParseErrorKind::InvalidEol.into()),
    }
}

fn required(argument: &str) -> Result<&str> {
    if argument.is_empty() {
        Err(ParseErrorKind::InvalidCommand.into())
    } else {
        Ok(argument)
    }
}

fn no_arguments(argument: &str, cmd: Command) -> Result<Command> {
    if argument.is_empty() {
        Ok(cmd)
    } else {
        Err(ParseErrorKind::InvalidCommand.into())
    }
}

fn is_valid_token_char(b: u8) -> bool {
    b > 0x1F && b < 0x7F
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_user_cmd_crnl() {
        let input = "USER Dolores\r\n";
        assert_eq!(parse(input).unwrap(), Command::User { username: "Dolores".into() });
    }

    #[test]
    fn parse_user_cmd_mixed_case() {
        let input = "uSeR Dolores\r\n";
        assert_eq!(parse(input).unwrap(), Command::User { username: "Dolores".into() });
    }

    #[test]
    // Not all clients include the (actually mandatory) '\r'
    fn parse_user_cmd_nl() {
        let input = "USER Dolores\n";
        assert_eq!(parse(input).unwrap(), Command::User { username: "Dolores".into() });
    }

    #[test]
    // Although we accept lines ending in only '\n', we won't accept lines ending only in '\r'
    fn parse_user_cmd_cr() {
        let input = "USER Dolores\r";
        assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidEol)));
    }

    #[test]
    fn parse_user_cmd_no_eol() {
        let input = "USER Dolores";
        assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidEol)));
    }

    #[test]
    // We split off only one space after the verb, to allow for arguments starting with a space.
    fn parse_user_cmd_double_space() {
        let input = "USER  Dolores\r\n";
        assert_eq!(parse(input).unwrap(), Command::User { username: " Dolores".into() });
    }

    #[test]
    fn parse_user_cmd_whitespace() {
        let input = "USER Dolores Abernathy\r\n";
        assert_eq!(
            parse(input).unwrap(),
            Command::User {
                username: "Dolores Abernathy".into()
            }
        );
    }

    #[test]
    fn parse_pass_cmd_crnl() {
        let input = "PASS s3cr3t\r\n";
        assert_eq!(parse(input).unwrap(), Command::Pass { password: "s3cr3t".into() });
    }

    #[test]
    fn parse_pass_cmd_whitespace() {
        let input = "PASS s3cr#t p@S$w0rd\r\n";
        assert_eq!(
            parse(input).unwrap(),
            Command::Pass {
                password: "s3cr#t p@S$w0rd".into()
            }
        );
    }

    #[test]
    fn parse_quit_rejects_arguments() {
        assert_eq!(parse("QUIT\r\n").unwrap(), Command::Quit);
        assert_eq!(parse("QUIT now\r\n"), Err(ParseError::from(ParseErrorKind::InvalidCommand)));
    }

    #[test]
    fn parse_type_keeps_raw_param() {
        assert_eq!(parse("TYPE I\r\n").unwrap(), Command::Type { param: "I".into() });
        assert_eq!(parse("TYPE a\r\n").unwrap(), Command::Type { param: "a".into() });
        assert_eq!(parse("TYPE\r\n"), Err(ParseError::from(ParseErrorKind::InvalidCommand)));
    }

    #[test]
    fn parse_port_keeps_raw_addr() {
        assert_eq!(
            parse("PORT 127,0,0,1,7,208\r\n").unwrap(),
            Command::Port {
                addr: "127,0,0,1,7,208".into()
            }
        );
    }

    #[test]
    fn parse_rest_wants_a_number() {
        assert_eq!(parse("REST 42\r\n").unwrap(), Command::Rest { offset: 42 });
        assert_eq!(parse("REST fourty-two\r\n"), Err(ParseError::from(ParseErrorKind::InvalidCommand)));
        assert_eq!(parse("REST -1\r\n"), Err(ParseError::from(ParseErrorKind::InvalidCommand)));
    }

    #[test]
    fn parse_list_skips_ls_flags() {
        assert_eq!(parse("LIST\r\n").unwrap(), Command::List { path: None });
        assert_eq!(parse("LIST -la\r\n").unwrap(), Command::List { path: None });
        assert_eq!(parse("LIST -la sub\r\n").unwrap(), Command::List { path: Some("sub".into()) });
    }

    #[test]
    fn parse_xpwd_alias() {
        assert_eq!(parse("XPWD\r\n").unwrap(), Command::Pwd);
        assert_eq!(parse("xmkd stuff\r\n").unwrap(), Command::Mkd { path: "stuff".into() });
    }

    #[test]
    fn parse_unknown_verb_is_other() {
        assert_eq!(
            parse("MLSD /tmp\r\n").unwrap(),
            Command::Other {
                command_name: "MLSD".into(),
                arguments: "/tmp".into()
            }
        );
    }

    #[test]
    fn parse_rejects_control_characters() {
        let input = b"USER Dol\x01ores\r\n";
        assert_eq!(parse(input), Err(ParseError::from(ParseErrorKind::InvalidToken)));
    }
}
