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

//! Human readable rendering of raw wire bytes for trace output

use crate::consts;
use std::fmt;

/// Renders a slice of wire bytes with protocol bytes spelled out.
///
/// Commands appear as `_IAC_`, `_WILL_` and so on; the byte following a
/// `WILL`, `WONT`, `DO` or `DONT` is rendered as an option name when one is
/// known. `CR` and `LF` are named, other printable ASCII is shown as is and
/// everything else as a `\xNN` escape.
///
/// ```
/// use linemux_telnetcodec::{WireBytes, consts};
///
/// let bytes = [b'o', b'k', consts::IAC, consts::WILL, consts::option::BINARY];
/// assert_eq!(WireBytes(&bytes).to_string(), "ok_IAC__WILL__BIN_");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct WireBytes<'a>(pub &'a [u8]);

impl fmt::Display for WireBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut option_follows = false;
        for &byte in self.0 {
            if option_follows {
                option_follows = false;
                if let Some(name) = consts::option_name(byte) {
                    write!(f, "_{name}_")?;
                    continue;
                }
            }
            if let Some(name) = consts::command_name(byte) {
                option_follows = matches!(
                    byte,
                    consts::WILL | consts::WONT | consts::DO | consts::DONT
                );
                write!(f, "_{name}_")?;
                continue;
            }
            match byte {
                consts::CR => f.write_str("_CR_")?,
                consts::LF => f.write_str("_LF_")?,
                0x20..=0x7E => write!(f, "{}", char::from(byte))?,
                _ => write!(f, "\\x{byte:02X}")?,
            }
        }
        Ok(())
    }
}
