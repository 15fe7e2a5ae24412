//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Textual multiplexer configuration commands

use crate::config::{DEFAULT_BUFFER_SIZE, validate_buffer_size};
use crate::error::{MuxError, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed configuration command
///
/// Keywords may be abbreviated to any prefix; the first keyword in table
/// order that the argument is a prefix of wins.
///
/// ```
/// use linemux::MuxCommand;
///
/// assert_eq!("2323".parse::<MuxCommand>().unwrap(), MuxCommand::Listen(2323));
/// assert_eq!("buf".parse::<MuxCommand>().unwrap(), MuxCommand::Buffered(32768));
/// assert_eq!(
///     "ORDER=1;3".parse::<MuxCommand>().unwrap(),
///     MuxCommand::LineOrder("1;3".to_string())
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxCommand {
    /// Open the master socket on a port
    Listen(u16),
    /// Log every line using a name template
    Log(String),
    /// Close every line log
    NoLog,
    /// Buffered mode with the given ring size
    Buffered(usize),
    /// Unbuffered mode
    Unbuffered,
    /// Connection order range list
    LineOrder(String),
    /// Operator disconnect of a line
    Disconnect(usize),
    /// Close the master socket
    Close,
}

#[derive(Clone, Copy)]
enum Keyword {
    Log,
    NoLog,
    Buffered,
    Unbuffered,
    LineOrder,
    Disconnect,
    Close,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("LOG", Keyword::Log),
    ("NOLOG", Keyword::NoLog),
    ("BUFFERED", Keyword::Buffered),
    ("UNBUFFERED", Keyword::Unbuffered),
    ("NOBUFFERED", Keyword::Unbuffered),
    ("LINEORDER", Keyword::LineOrder),
    ("ORDER", Keyword::LineOrder),
    ("DISCONNECT", Keyword::Disconnect),
    ("NOTELNET", Keyword::Close),
    ("CLOSE", Keyword::Close),
];

/// Find the first entry of `table` that `word` abbreviates.
pub fn match_keyword<T: Copy>(table: &[(&str, T)], word: &str) -> Option<T> {
    let word = word.trim().to_ascii_uppercase();
    if word.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(name, _)| name.starts_with(word.as_str()))
        .map(|(_, value)| *value)
}

/// Split `KEYWORD=value` into its parts; the value is `None` when absent or empty.
pub fn split_argument(argument: &str) -> (&str, Option<&str>) {
    match argument.split_once('=') {
        Some((keyword, value)) => {
            let value = value.trim();
            (keyword.trim(), (!value.is_empty()).then_some(value))
        }
        None => (argument.trim(), None),
    }
}

fn no_value(keyword: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => Err(MuxError::UnexpectedArgument(format!("{keyword}={value}"))),
        None => Ok(()),
    }
}

impl FromStr for MuxCommand {
    type Err = MuxError;

    fn from_str(argument: &str) -> Result<Self> {
        let argument = argument.trim();
        if argument.starts_with(|c: char| c.is_ascii_digit()) {
            return match argument.parse::<u16>() {
                Ok(port) if port > 0 => Ok(MuxCommand::Listen(port)),
                _ => Err(MuxError::validation(format!("invalid port '{argument}'"))),
            };
        }

        let (keyword, value) = split_argument(argument);
        let Some(matched) = match_keyword(KEYWORDS, keyword) else {
            return Err(MuxError::UnknownKeyword(keyword.to_string()));
        };
        match matched {
            Keyword::Log => value
                .map(|template| MuxCommand::Log(template.to_string()))
                .ok_or(MuxError::MissingValue("LOG")),
            Keyword::NoLog => no_value(keyword, value).map(|()| MuxCommand::NoLog),
            Keyword::Buffered => match value {
                None => Ok(MuxCommand::Buffered(DEFAULT_BUFFER_SIZE)),
                Some(size) => {
                    let size = size.parse::<usize>().map_err(|_| {
                        MuxError::validation(format!("invalid buffer size '{size}'"))
                    })?;
                    Ok(MuxCommand::Buffered(validate_buffer_size(size)?))
                }
            },
            Keyword::Unbuffered => no_value(keyword, value).map(|()| MuxCommand::Unbuffered),
            Keyword::LineOrder => value
                .map(|spec| MuxCommand::LineOrder(spec.to_string()))
                .ok_or(MuxError::MissingValue("LINEORDER")),
            Keyword::Disconnect => {
                let line = value.ok_or(MuxError::MissingValue("DISCONNECT"))?;
                line.parse::<usize>()
                    .map(MuxCommand::Disconnect)
                    .map_err(|_| MuxError::validation(format!("invalid line '{line}'")))
            }
            Keyword::Close => no_value(keyword, value).map(|()| MuxCommand::Close),
        }
    }
}

impl fmt::Display for MuxCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuxCommand::Listen(port) => write!(f, "{port}"),
            MuxCommand::Log(template) => write!(f, "LOG={template}"),
            MuxCommand::NoLog => f.write_str("NOLOG"),
            MuxCommand::Buffered(size) => write!(f, "BUFFERED={size}"),
            MuxCommand::Unbuffered => f.write_str("UNBUFFERED"),
            MuxCommand::LineOrder(spec) => write!(f, "LINEORDER={spec}"),
            MuxCommand::Disconnect(line) => write!(f, "DISCONNECT={line}"),
            MuxCommand::Close => f.write_str("NOTELNET"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<MuxCommand> {
        text.parse()
    }

    #[test]
    fn port_numbers() {
        assert_eq!(parse("23").unwrap(), MuxCommand::Listen(23));
        assert!(parse("0").is_err());
        assert!(parse("65536").is_err());
        assert!(parse("12ab").is_err());
    }

    #[test]
    fn abbreviations_take_first_match() {
        assert_eq!(parse("no").unwrap(), MuxCommand::NoLog);
        assert_eq!(parse("nob").unwrap(), MuxCommand::Unbuffered);
        assert_eq!(parse("unb").unwrap(), MuxCommand::Unbuffered);
        assert_eq!(parse("L=tty").unwrap(), MuxCommand::Log("tty".into()));
        assert_eq!(parse("LI=2").unwrap(), MuxCommand::LineOrder("2".into()));
        assert_eq!(parse("notel").unwrap(), MuxCommand::Close);
        assert_eq!(parse("close").unwrap(), MuxCommand::Close);
    }

    #[test]
    fn buffered_sizes() {
        assert_eq!(parse("BUFFERED").unwrap(), MuxCommand::Buffered(DEFAULT_BUFFER_SIZE));
        assert_eq!(parse("BUFFERED=").unwrap(), MuxCommand::Buffered(DEFAULT_BUFFER_SIZE));
        assert_eq!(parse("buffered=4096").unwrap(), MuxCommand::Buffered(4096));
        assert!(parse("BUFFERED=0").is_err());
        assert!(parse("BUFFERED=2000000").is_err());
        assert!(parse("BUFFERED=lots").is_err());
    }

    #[test]
    fn value_rules() {
        assert!(matches!(parse("LOG"), Err(MuxError::MissingValue("LOG"))));
        assert!(matches!(parse("NOLOG=x"), Err(MuxError::UnexpectedArgument(_))));
        assert!(matches!(parse("DISCONNECT"), Err(MuxError::MissingValue(_))));
        assert_eq!(parse("DISC=3").unwrap(), MuxCommand::Disconnect(3));
        assert!(parse("DISC=x").is_err());
    }

    #[test]
    fn unknown_keyword() {
        assert!(matches!(parse("SPEED=9600"), Err(MuxError::UnknownKeyword(k)) if k == "SPEED"));
        assert!(matches!(parse(""), Err(MuxError::UnknownKeyword(_))));
    }

    #[test]
    fn display_round_trips() {
        for command in [
            MuxCommand::Listen(2323),
            MuxCommand::Log("tty.log".into()),
            MuxCommand::Buffered(512),
            MuxCommand::LineOrder("1;5;2-4".into()),
            MuxCommand::Disconnect(4),
            MuxCommand::Close,
        ] {
            assert_eq!(parse(&command.to_string()).unwrap(), command);
        }
    }
}
