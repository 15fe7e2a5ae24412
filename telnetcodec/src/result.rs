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

use std::io;

/// Result of a framed codec operation
pub type CodecResult<T> = Result<T, CodecError>;

/// Failure surfaced through the `tokio_util` codec traits.
///
/// The state machine itself accepts every byte, so the transport carrying
/// the stream is the only thing that can fail.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The stream under the codec failed
    #[error("telnet transport failed: {0}")]
    Transport(#[from] io::Error),
}

impl CodecError {
    /// Kind of the underlying transport failure
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            CodecError::Transport(err) => err.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_keeps_kind_and_message() {
        let err = CodecError::from(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"));
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(err.to_string(), "telnet transport failed: peer went away");
    }
}
