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

//! Local keyboard capability and key classification

use crate::error::{ConsoleError, Result};
use std::fmt::Write;
use std::io;

/// Default interrupt character, `^E`
pub const DEFAULT_INTERRUPT: u8 = 0o005;

/// Default delete character
pub const DEFAULT_DELETE: u8 = 0o177;

/// Source of raw local keystrokes.
///
/// Implementations must not block: `Ok(None)` means no key is waiting.
pub trait Keyboard: Send {
    /// Next raw byte typed on the local keyboard
    fn poll_keyboard(&mut self) -> io::Result<Option<u8>>;
}

/// A classified keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Ordinary character
    Char(u8),
    /// The interrupt (stop) character
    Interrupt,
    /// The break character
    Break,
}

/// Remappable console keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Interrupt, `WRU`
    Interrupt,
    /// Break, `BRK`
    Break,
    /// Delete, `DEL`
    Delete,
}

impl Key {
    /// Keyword naming this key in SET/SHOW commands
    pub fn keyword(self) -> &'static str {
        match self {
            Key::Interrupt => "WRU",
            Key::Break => "BRK",
            Key::Delete => "DEL",
        }
    }

    fn allows_zero(self) -> bool {
        matches!(self, Key::Break)
    }
}

/// Console key bindings. A break character of 0 disables break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMap {
    /// Interrupt character
    pub interrupt: u8,
    /// Break character, 0 when disabled
    pub brk: u8,
    /// Delete character
    pub delete: u8,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            interrupt: DEFAULT_INTERRUPT,
            brk: 0,
            delete: DEFAULT_DELETE,
        }
    }
}

impl KeyMap {
    /// Classify a raw keystroke.
    pub fn classify(&self, byte: u8) -> KeyEvent {
        if byte == self.interrupt {
            KeyEvent::Interrupt
        } else if self.brk != 0 && byte == self.brk {
            KeyEvent::Break
        } else {
            KeyEvent::Char(byte)
        }
    }

    /// Current binding of `key`
    pub fn get(&self, key: Key) -> u8 {
        match key {
            Key::Interrupt => self.interrupt,
            Key::Break => self.brk,
            Key::Delete => self.delete,
        }
    }

    /// Rebind `key` from an octal value no larger than 0177.
    ///
    /// Only `BRK` may be set to 0.
    pub fn set(&mut self, key: Key, value: &str) -> Result<()> {
        let parsed = u8::from_str_radix(value.trim(), 8)
            .ok()
            .filter(|&parsed| parsed <= 0o177)
            .filter(|&parsed| parsed != 0 || key.allows_zero())
            .ok_or_else(|| ConsoleError::validation(format!("{}={value}", key.keyword())))?;
        match key {
            Key::Interrupt => self.interrupt = parsed,
            Key::Break => self.brk = parsed,
            Key::Delete => self.delete = parsed,
        }
        Ok(())
    }

    /// `WRU = 5` style listing of every binding, in octal
    pub fn describe(&self) -> String {
        let mut text = String::new();
        for key in [Key::Interrupt, Key::Break, Key::Delete] {
            let _ = writeln!(text, "{} = {:o}", key.keyword(), self.get(key));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings() {
        let keys = KeyMap::default();
        assert_eq!(keys.classify(0x05), KeyEvent::Interrupt);
        assert_eq!(keys.classify(0x00), KeyEvent::Char(0));
        assert_eq!(keys.classify(b'a'), KeyEvent::Char(b'a'));
        assert_eq!(keys.describe(), "WRU = 5\nBRK = 0\nDEL = 177\n");
    }

    #[test]
    fn break_binding_classifies() {
        let mut keys = KeyMap::default();
        keys.set(Key::Break, "20").unwrap();
        assert_eq!(keys.brk, 0x10);
        assert_eq!(keys.classify(0x10), KeyEvent::Break);
    }

    #[test]
    fn values_are_octal_and_bounded() {
        let mut keys = KeyMap::default();
        keys.set(Key::Interrupt, "3").unwrap();
        assert_eq!(keys.interrupt, 3);
        assert!(keys.set(Key::Interrupt, "8").is_err());
        assert!(keys.set(Key::Delete, "200").is_err());
        assert!(keys.set(Key::Delete, "x").is_err());
        assert_eq!(keys.delete, DEFAULT_DELETE);
    }

    #[test]
    fn only_break_may_be_zero() {
        let mut keys = KeyMap::default();
        assert!(keys.set(Key::Interrupt, "0").is_err());
        assert!(keys.set(Key::Delete, "0").is_err());
        keys.set(Key::Break, "0").unwrap();
        assert_eq!(keys.brk, 0);
    }
}
