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

//! # Linemux Telnet Codec
//!
//! A minimal, incremental Telnet codec for terminal lines that want a
//! transparent 8-bit byte pipe rather than a full option negotiation engine.
//!
//! ## Overview
//!
//! Simulated terminals only need clean application bytes in and escaped
//! application bytes out. This codec handles:
//!
//! - **Data transmission**: Raw byte data with `IAC` (Interpret As Command) escaping
//! - **Break**: `IAC BRK` surfaces as a [`TelnetEvent::Break`]
//! - **Binary mode**: `WILL BINARY` / `WONT BINARY` from the peer toggle binary mode
//! - **CR padding**: outside binary mode the `LF` or `NUL` following a `CR` is dropped
//!
//! Every other command and every `DO`/`DONT` request is accepted and ignored;
//! no replies are generated. The one-time request for raw transport sent at
//! connect is [`consts::CONNECT_NEGOTIATION`].
//!
//! ## Core Components
//!
//! ### [`TelnetCodec`]
//!
//! Implements [`Decoder`] and [`Encoder`] from `tokio_util::codec` and also
//! exposes [`TelnetCodec::decode_byte`] for callers that feed bytes one at a
//! time into their own buffers.
//!
//! ### [`WireBytes`]
//!
//! A `Display` adapter that renders raw wire traffic with protocol bytes
//! spelled out, for trace logging.
//!
//! ## Usage Example
//!
//! ```rust
//! use linemux_telnetcodec::{TelnetCodec, TelnetEvent, consts};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut codec = TelnetCodec::new();
//!
//! let mut output = BytesMut::new();
//! codec.encode(consts::IAC, &mut output).unwrap();
//! assert_eq!(&output[..], &[consts::IAC, consts::IAC]);
//!
//! let mut input = BytesMut::from(&b"hi\xFF\xF3"[..]);
//! let mut events = Vec::new();
//! while let Some(event) = codec.decode(&mut input).unwrap() {
//!     events.push(event);
//! }
//! assert_eq!(
//!     events,
//!     vec![TelnetEvent::Data(b'h'), TelnetEvent::Data(b'i'), TelnetEvent::Break]
//! );
//! ```
//!
//! ## Thread Safety
//!
//! `TelnetCodec` holds per-connection state and is meant to be owned by a
//! single terminal line; share it only behind the line's own lock.
//!
//! ## Related RFCs
//!
//! - RFC 854: Telnet Protocol Specification
//! - RFC 856: Telnet Binary Transmission
//! - RFC 857: Telnet Echo Option
//! - RFC 858: Telnet Suppress Go Ahead Option
//! - RFC 1184: Telnet Linemode Option
//!
//! [`Decoder`]: tokio_util::codec::Decoder
//! [`Encoder`]: tokio_util::codec::Encoder

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod codec;
pub mod consts;
mod event;
mod result;
mod wire;

pub use self::codec::{DecoderState, Escaped, TelnetCodec, escape};
pub use self::event::TelnetEvent;
pub use self::result::{CodecError, CodecResult};
pub use self::wire::WireBytes;
