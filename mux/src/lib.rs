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

//! # Linemux
//!
//! Turns raw TCP connections into clean, flow-controlled character streams
//! for simulated terminal devices.
//!
//! ## Architecture
//!
//! ```text
//! Multiplexer ── master Listener
//!     ↓
//! Line × N ── Connection, TelnetCodec, receive ring, transmit ring, log
//! ```
//!
//! A driver loop polls the multiplexer; the emulated device reads and writes
//! characters by line index:
//!
//! - [`Multiplexer::poll_connect`] accepts one connection and binds it to a
//!   free line following the [`ConnectionOrder`]
//! - [`Multiplexer::poll_receive`] reads and decodes socket input
//! - [`Multiplexer::poll_transmit`] drains queued output
//! - [`Multiplexer::get`] / [`Multiplexer::put`] move characters
//!
//! Nothing blocks. A full transmit ring reports [`MuxError::Stall`]; writing
//! to a line nobody is connected to reports [`MuxError::Lost`] unless the
//! multiplexer is in buffered mode, where output is retained (oldest bytes
//! evicted) and replayed to the next connection.
//!
//! ## Example
//!
//! ```no_run
//! use linemux::{MuxConfig, Multiplexer};
//!
//! # fn main() -> linemux::Result<()> {
//! let mux = Multiplexer::new(MuxConfig::new(4).with_simulator_name("PDP-11"))?;
//! mux.attach("2323, BUFFERED=8192")?;
//! loop {
//!     if let Some(line) = mux.poll_connect() {
//!         mux.line_message(line, "Welcome\r\n")?;
//!     }
//!     mux.poll_receive();
//!     for line in 0..mux.lines() {
//!         while let Some(input) = mux.get(line) {
//!             let _ = mux.put(line, input.byte);
//!         }
//!     }
//!     mux.poll_transmit();
//!     # break;
//! }
//! # Ok(())
//! # }
//! ```

mod buffer;
mod command;
mod config;
mod error;
mod line;
mod logfile;
mod multiplexer;
mod order;
mod socket;
mod status;

pub use buffer::RingBuffer;
pub use command::{MuxCommand, match_keyword, split_argument};
pub use config::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CAPACITY, DEFAULT_GUARD, MAX_BUFFER_SIZE, MuxConfig,
    validate_buffer_size,
};
pub use error::{MuxError, Result};
pub use line::{LineStatus, RxChar};
pub use logfile::{LogHandle, LogRegistry};
pub use multiplexer::Multiplexer;
pub use order::ConnectionOrder;
pub use socket::{Connection, Listener, TcpConnection, TcpMaster, Transfer};
pub use status::{format_connection, format_statistics};
