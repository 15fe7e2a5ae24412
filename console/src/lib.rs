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

//! # Linemux Console
//!
//! The operator console of a hardware simulator. It starts out attached to
//! the local window and can be moved onto a Telnet port, where it becomes
//! line 0 of a one-line [`linemux::Multiplexer`].
//!
//! ```no_run
//! use linemux_console::{Console, ConsoleInput};
//!
//! # async fn run() -> linemux_console::Result<()> {
//! let mut console = Console::new("PDP-11")?.with_window(std::io::stdout());
//! console.set("TELNET=2323, WRU=3")?;
//! let stop = console.stop_signal().token();
//! console.wait_for_connection(60, &stop).await?;
//! while let Some(input) = console.poll_keyboard()? {
//!     if let ConsoleInput::Char(byte) = input {
//!         console.put_char(byte)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod console;
mod convert;
mod error;
mod keyboard;
mod watcher;

pub use console::{CONSOLE_DEVICE, Console, ConsoleInput};
pub use convert::{
    DEFAULT_PCHAR, REQUIRED_PCHAR, TerminalFlags, TerminalMode, input_convert, output_convert,
};
pub use error::{ConsoleError, Result};
pub use keyboard::{DEFAULT_DELETE, DEFAULT_INTERRUPT, Key, KeyEvent, KeyMap, Keyboard};
pub use watcher::{KeyWatcher, StopSignal, WATCH_INTERVAL};
