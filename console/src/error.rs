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

//! Error types for the console terminal

use linemux::MuxError;
use std::io;
use thiserror::Error;

/// Result type for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Console error types
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Failure inside the console multiplexer
    #[error(transparent)]
    Mux(#[from] MuxError),

    /// Stop requested from the keyboard or by the caller
    #[error("Stopped")]
    Stopped,

    /// No Telnet connection arrived in time
    #[error("Timed out waiting for console Telnet connection")]
    TimedOut,

    /// Telnet console is disconnected and unbuffered
    #[error("Console connection lost")]
    Lost,

    /// Console output is backed up
    #[error("Console output stalled")]
    Stall,

    /// Console setting rejected
    #[error("Invalid argument: {0}")]
    Validation(String),

    /// Console keyword not recognized
    #[error("Unknown keyword: {0}")]
    UnknownKeyword(String),

    /// Local window I/O failed
    #[error("Console I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConsoleError {
    /// Lift a line output error, keeping lost and stalled distinct.
    pub(crate) fn from_output(error: MuxError) -> Self {
        match error {
            MuxError::Lost => ConsoleError::Lost,
            MuxError::Stall => ConsoleError::Stall,
            other => ConsoleError::Mux(other),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_errors_stay_distinct() {
        assert!(matches!(ConsoleError::from_output(MuxError::Lost), ConsoleError::Lost));
        assert!(matches!(ConsoleError::from_output(MuxError::Stall), ConsoleError::Stall));
        assert!(matches!(
            ConsoleError::from_output(MuxError::NotListening),
            ConsoleError::Mux(MuxError::NotListening)
        ));
    }

    #[test]
    fn mux_errors_display_transparently() {
        let error: ConsoleError = MuxError::UnknownKeyword("FOO".into()).into();
        assert_eq!(error.to_string(), "Unknown keyword: FOO");
    }
}
