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

//! Character conversion for emulated terminal devices
//!
//! Emulated terminals run in one of four modes. Input and output characters
//! are masked to 7 bits in every mode but [`TerminalMode::EightBit`]; the
//! upper-case and printable modes additionally suppress control characters
//! that are not in the printable mask.

/// Default printable control characters: BEL, BS, TAB, LF, CR and ESC
pub const DEFAULT_PCHAR: u32 = 0x0000_2780;

/// Printable mask bits of which at least one must be set, LF and CR
pub const REQUIRED_PCHAR: u32 = 0x0000_2400;

/// Character handling mode of a terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TerminalMode {
    /// Strip the high bit
    #[default]
    SevenBit,
    /// Pass all 8 bits
    EightBit,
    /// Strip the high bit, fold to upper case, printable characters only
    UpperCase,
    /// Strip the high bit, printable characters only
    SevenPrintable,
}

/// Terminal mode plus the KSR (keyboard send-receive) flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalFlags {
    /// Character mode
    pub mode: TerminalMode,
    /// Teletype style: input gets the high bit, lower-case output is dropped
    pub ksr: bool,
}

impl TerminalFlags {
    /// Flags for `mode` without KSR
    pub fn new(mode: TerminalMode) -> Self {
        Self { mode, ksr: false }
    }

    /// Set the KSR flag
    pub fn with_ksr(mut self, ksr: bool) -> Self {
        self.ksr = ksr;
        self
    }
}

impl From<TerminalMode> for TerminalFlags {
    fn from(mode: TerminalMode) -> Self {
        Self::new(mode)
    }
}

/// Convert a character typed by the user.
pub fn input_convert(byte: u8, flags: TerminalFlags) -> u8 {
    match flags.mode {
        TerminalMode::EightBit => byte,
        TerminalMode::UpperCase => {
            let byte = (byte & 0x7F).to_ascii_uppercase();
            if flags.ksr { byte | 0x80 } else { byte }
        }
        TerminalMode::SevenBit | TerminalMode::SevenPrintable => byte & 0x7F,
    }
}

/// Convert a character for display, `None` when it is suppressed.
///
/// `pchar` holds one bit per control character (bit n for code n) that may
/// still be printed in the upper-case and printable modes.
pub fn output_convert(byte: u8, flags: TerminalFlags, pchar: u32) -> Option<u8> {
    if flags.mode == TerminalMode::EightBit {
        return Some(byte);
    }
    let mut byte = byte & 0x7F;
    if flags.mode == TerminalMode::UpperCase {
        byte = byte.to_ascii_uppercase();
        if flags.ksr && byte >= 0o140 {
            return None;
        }
    }
    let filtered = matches!(
        flags.mode,
        TerminalMode::UpperCase | TerminalMode::SevenPrintable
    );
    if filtered && (byte == 0x7F || (byte < 0x20 && (pchar >> byte) & 1 == 0)) {
        return None;
    }
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_masks_and_folds() {
        assert_eq!(input_convert(0xE1, TerminalMode::EightBit.into()), 0xE1);
        assert_eq!(input_convert(0xE1, TerminalMode::SevenBit.into()), b'a');
        assert_eq!(input_convert(0xE1, TerminalMode::SevenPrintable.into()), b'a');
        assert_eq!(input_convert(b'a', TerminalMode::UpperCase.into()), b'A');
        let ksr = TerminalFlags::new(TerminalMode::UpperCase).with_ksr(true);
        assert_eq!(input_convert(b'a', ksr), b'A' | 0x80);
    }

    #[test]
    fn output_passes_plain_characters() {
        assert_eq!(output_convert(0x81, TerminalMode::EightBit.into(), DEFAULT_PCHAR), Some(0x81));
        assert_eq!(output_convert(0x81, TerminalMode::SevenBit.into(), DEFAULT_PCHAR), Some(0x01));
        assert_eq!(output_convert(b'q', TerminalMode::UpperCase.into(), DEFAULT_PCHAR), Some(b'Q'));
        assert_eq!(output_convert(0x7F, TerminalMode::SevenBit.into(), DEFAULT_PCHAR), Some(0x7F));
    }

    #[test]
    fn output_filters_controls_by_mask() {
        let printable = TerminalMode::SevenPrintable.into();
        assert_eq!(output_convert(b'\r', printable, DEFAULT_PCHAR), Some(b'\r'));
        assert_eq!(output_convert(b'\n', printable, DEFAULT_PCHAR), Some(b'\n'));
        assert_eq!(output_convert(0x07, printable, DEFAULT_PCHAR), Some(0x07));
        assert_eq!(output_convert(0x01, printable, DEFAULT_PCHAR), None);
        assert_eq!(output_convert(0x7F, printable, DEFAULT_PCHAR), None);
        assert_eq!(output_convert(0x01, printable, DEFAULT_PCHAR | 0x2), Some(0x01));
    }

    #[test]
    fn ksr_output_drops_lower_range() {
        let ksr = TerminalFlags::new(TerminalMode::UpperCase).with_ksr(true);
        assert_eq!(output_convert(b'a', ksr, DEFAULT_PCHAR), Some(b'A'));
        assert_eq!(output_convert(b'`', ksr, DEFAULT_PCHAR), None);
        assert_eq!(output_convert(b'{', ksr, DEFAULT_PCHAR), None);
    }
}
