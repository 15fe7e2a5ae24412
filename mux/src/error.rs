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

//! Error types for the line multiplexer

use std::io;
use thiserror::Error;

/// Result type for multiplexer operations
pub type Result<T> = std::result::Result<T, MuxError>;

/// Multiplexer error types
#[derive(Debug, Error)]
pub enum MuxError {
    /// Write attempted on a disconnected, unbuffered line
    #[error("Line connection lost")]
    Lost,

    /// Transmit buffer is full; retry after the next transmit poll
    #[error("Transmit buffer full")]
    Stall,

    /// Configuration value rejected before any state was changed
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// Line index outside the multiplexer
    #[error("Line {line} out of range (0-{})", lines.saturating_sub(1))]
    LineOutOfRange {
        /// Requested line
        line: usize,
        /// Number of lines in the multiplexer
        lines: usize,
    },

    /// Keyword requires a value
    #[error("Missing value for {0}")]
    MissingValue(&'static str),

    /// Keyword does not take a value
    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    /// Keyword not recognized
    #[error("Unknown keyword: {0}")]
    UnknownKeyword(String),

    /// Log file or listening socket could not be created
    #[error("Unable to open {target}: {source}")]
    Open {
        /// File name or socket address
        target: String,
        /// Underlying failure
        source: io::Error,
    },

    /// Operation needs an open master socket
    #[error("Not listening for connections")]
    NotListening,

    /// I/O error outside of polling
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MuxError {
    /// Check if the error is recoverable
    ///
    /// Only a stalled write is expected to succeed when simply retried later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MuxError::Stall)
    }

    /// Check if the error was caused by a rejected configuration request
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MuxError::Validation(_)
                | MuxError::LineOutOfRange { .. }
                | MuxError::MissingValue(_)
                | MuxError::UnexpectedArgument(_)
                | MuxError::UnknownKeyword(_)
        )
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        MuxError::Validation(message.into())
    }

    pub(crate) fn open(target: impl Into<String>, source: io::Error) -> Self {
        MuxError::Open {
            target: target.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_recoverable() {
        assert!(MuxError::Stall.is_recoverable());
        assert!(!MuxError::Lost.is_recoverable());
        assert!(!MuxError::NotListening.is_recoverable());
    }

    #[test]
    fn test_error_is_configuration_error() {
        assert!(MuxError::validation("bad").is_configuration_error());
        assert!(MuxError::UnknownKeyword("FOO".into()).is_configuration_error());
        assert!(MuxError::LineOutOfRange { line: 9, lines: 4 }.is_configuration_error());
        assert!(!MuxError::Stall.is_configuration_error());
        assert!(!MuxError::open("x.log", io::Error::other("denied")).is_configuration_error());
    }

    #[test]
    fn test_error_display() {
        let err = MuxError::LineOutOfRange { line: 9, lines: 4 };
        assert_eq!(err.to_string(), "Line 9 out of range (0-3)");

        let err = MuxError::MissingValue("LOG");
        assert_eq!(err.to_string(), "Missing value for LOG");

        let err = MuxError::open("trace.log", io::Error::other("denied"));
        assert_eq!(err.to_string(), "Unable to open trace.log: denied");
    }
}
