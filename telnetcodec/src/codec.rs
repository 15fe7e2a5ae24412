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

use super::{CodecError, TelnetEvent, consts};
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

/// A codec for a raw 8-bit Telnet terminal stream.
///
/// `TelnetCodec` strips protocol bytes from inbound data one byte at a time and
/// escapes `IAC` on outbound data. It keeps exactly two pieces of state: the
/// position inside a partially received command, and whether the peer has
/// agreed to send binary. Both survive across calls, so a command split over
/// two socket reads decodes the same as one delivered whole.
///
/// No negotiation replies are ever generated. The only option the decoder
/// listens to is `BINARY`: `WILL BINARY` turns binary mode on and `WONT BINARY`
/// turns it off. Outside binary mode a `CR` may be followed by a pad byte
/// (`LF` or `NUL`) which is dropped.
#[derive(Clone, Debug, Default)]
pub struct TelnetCodec {
    decoder_state: DecoderState,
    binary: bool,
}

impl TelnetCodec {
    /// Creates a new instance of `TelnetCodec` in the normal state with
    /// binary mode off.
    ///
    /// # Example
    /// ```
    /// use linemux_telnetcodec::TelnetCodec;
    ///
    /// let codec = TelnetCodec::new();
    /// assert!(!codec.is_binary());
    /// ```
    pub fn new() -> TelnetCodec {
        TelnetCodec::default()
    }

    /// Return to the normal state with binary mode off.
    pub fn reset(&mut self) {
        self.decoder_state = DecoderState::NormalData;
        self.binary = false;
    }

    /// Current decoder state.
    pub fn state(&self) -> DecoderState {
        self.decoder_state
    }

    /// Returns `true` while a command sequence or a `CR` pad is outstanding.
    pub fn in_sequence(&self) -> bool {
        self.decoder_state != DecoderState::NormalData
    }

    /// Whether the peer is sending binary data (CR padding not interpreted).
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Force binary mode on or off.
    pub fn set_binary(&mut self, binary: bool) {
        self.binary = binary;
    }

    /// Discard the next byte received regardless of its value.
    pub fn skip_next(&mut self) {
        self.decoder_state = DecoderState::Skip;
    }

    /// Feed a single received byte through the state machine.
    ///
    /// Returns the event the byte produces, or `None` when the byte belongs to
    /// protocol overhead and must be removed from the stream.
    pub fn decode_byte(&mut self, byte: u8) -> Option<TelnetEvent> {
        match self.decoder_state {
            DecoderState::NormalData => match byte {
                consts::IAC => {
                    self.decoder_state = DecoderState::InterpretAsCommand;
                    None
                }
                consts::CR if !self.binary => {
                    self.decoder_state = DecoderState::CarriageReturnPad;
                    Some(TelnetEvent::Data(byte))
                }
                _ => Some(TelnetEvent::Data(byte)),
            },
            DecoderState::InterpretAsCommand => {
                self.decoder_state = DecoderState::NormalData;
                match byte {
                    consts::IAC => Some(TelnetEvent::Data(consts::IAC)),
                    consts::BRK => Some(TelnetEvent::Break),
                    consts::WILL => {
                        self.decoder_state = DecoderState::NegotiateWill;
                        None
                    }
                    consts::WONT => {
                        self.decoder_state = DecoderState::NegotiateWont;
                        None
                    }
                    consts::DO => {
                        self.decoder_state = DecoderState::PendingDo;
                        None
                    }
                    consts::DONT => {
                        self.decoder_state = DecoderState::PendingDont;
                        None
                    }
                    consts::GA
                    | consts::EL
                    | consts::EC
                    | consts::AYT
                    | consts::AO
                    | consts::IP
                    | consts::NOP
                    | consts::SB
                    | consts::DM
                    | consts::SE => None,
                    _ => {
                        warn!("Received Unknown Command {:#X}", byte);
                        None
                    }
                }
            }
            DecoderState::NegotiateWill | DecoderState::NegotiateWont => {
                if byte == consts::option::BINARY {
                    self.binary = self.decoder_state == DecoderState::NegotiateWill;
                    trace!(binary = self.binary, "peer changed binary transmission");
                }
                self.decoder_state = DecoderState::NormalData;
                None
            }
            DecoderState::PendingDo | DecoderState::PendingDont | DecoderState::Skip => {
                self.decoder_state = DecoderState::NormalData;
                None
            }
            DecoderState::CarriageReturnPad => {
                self.decoder_state = DecoderState::NormalData;
                // Whatever follows the CR is data; only LF and NUL are dropped.
                if byte == consts::LF || byte == consts::NUL {
                    None
                } else {
                    Some(TelnetEvent::Data(byte))
                }
            }
        }
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetEvent;
    type Error = CodecError;

    /// Consumes bytes from `src` until one produces a [`TelnetEvent`].
    ///
    /// Protocol bytes are consumed silently. Returns `Ok(None)` once `src`
    /// is exhausted; any partially received command is remembered and
    /// completed by the next call.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetEvent>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();
            if let Some(event) = self.decode_byte(byte) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

impl Encoder<u8> for TelnetCodec {
    type Error = CodecError;

    /// Appends one application byte, doubling it when it is `IAC`.
    fn encode(&mut self, byte: u8, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(escape(byte).as_ref());
        Ok(())
    }
}

/// Escape one application byte for transmission.
///
/// ```
/// use linemux_telnetcodec::{consts, escape};
///
/// assert_eq!(escape(b'A').as_ref(), b"A");
/// assert_eq!(escape(consts::IAC).as_ref(), &[consts::IAC, consts::IAC]);
/// ```
pub fn escape(byte: u8) -> Escaped {
    if byte == consts::IAC {
        Escaped {
            bytes: [consts::IAC, consts::IAC],
            len: 2,
        }
    } else {
        Escaped {
            bytes: [byte, 0],
            len: 1,
        }
    }
}

/// One escaped application byte: either the byte itself or `IAC IAC`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Escaped {
    bytes: [u8; 2],
    len: usize,
}

impl Escaped {
    /// Number of bytes on the wire.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; every escaped byte occupies at least one wire byte.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for Escaped {
    fn as_ref(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Decoder position inside the inbound stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DecoderState {
    /// Normal Data
    #[default]
    NormalData,
    /// Received IAC, Next byte is Command
    InterpretAsCommand,
    /// Received WILL Command, Next Byte is the option
    NegotiateWill,
    /// Received WONT Command, Next Byte is the option
    NegotiateWont,
    /// Received DO Command, option is dropped without a reply
    PendingDo,
    /// Received DONT Command, option is dropped without a reply
    PendingDont,
    /// Received CR outside binary mode, a following LF or NUL is padding
    CarriageReturnPad,
    /// Next byte is dropped unconditionally
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Helper Functions
    // ============================================================================

    fn collect_all(codec: &mut TelnetCodec, src: &[u8]) -> Vec<TelnetEvent> {
        let mut src = BytesMut::from(src);
        let mut out = Vec::new();
        while let Some(event) = codec.decode(&mut src).expect("decode should not error") {
            out.push(event);
        }
        out
    }

    fn data(bytes: &[u8]) -> Vec<TelnetEvent> {
        bytes.iter().copied().map(TelnetEvent::Data).collect()
    }

    // ============================================================================
    // Decoding Tests - Plain Data
    // ============================================================================

    #[test]
    fn decode_plain_text() {
        let mut codec = TelnetCodec::new();
        assert_eq!(collect_all(&mut codec, b"hello"), data(b"hello"));
        assert_eq!(codec.state(), DecoderState::NormalData);
    }

    #[test]
    fn decode_empty_input() {
        let mut codec = TelnetCodec::new();
        assert!(collect_all(&mut codec, b"").is_empty());
    }

    // ============================================================================
    // Decoding Tests - IAC Handling
    // ============================================================================

    #[test]
    fn decode_escaped_iac() {
        let mut codec = TelnetCodec::new();
        let events = collect_all(&mut codec, &[b'a', consts::IAC, consts::IAC, b'b']);
        assert_eq!(events, data(&[b'a', consts::IAC, b'b']));
    }

    #[test]
    fn decode_break() {
        let mut codec = TelnetCodec::new();
        let events = collect_all(&mut codec, &[b'x', consts::IAC, consts::BRK, b'y']);
        assert_eq!(
            events,
            vec![
                TelnetEvent::Data(b'x'),
                TelnetEvent::Break,
                TelnetEvent::Data(b'y')
            ]
        );
    }

    #[test]
    fn decode_two_byte_commands_are_dropped() {
        let mut codec = TelnetCodec::new();
        for command in [
            consts::GA,
            consts::EL,
            consts::EC,
            consts::AYT,
            consts::AO,
            consts::IP,
            consts::NOP,
            consts::SB,
            consts::DM,
            consts::SE,
        ] {
            let events = collect_all(&mut codec, &[consts::IAC, command, b'z']);
            assert_eq!(events, data(b"z"), "command {command:#X}");
        }
    }

    #[test]
    fn decode_unknown_command_returns_to_normal() {
        let mut codec = TelnetCodec::new();
        let events = collect_all(&mut codec, &[consts::IAC, 0xEF, b'q']);
        assert_eq!(events, data(b"q"));
    }

    #[test]
    fn decode_command_split_across_reads() {
        let mut codec = TelnetCodec::new();
        assert_eq!(collect_all(&mut codec, &[b'a', consts::IAC]), data(b"a"));
        assert!(codec.in_sequence());
        assert!(collect_all(&mut codec, &[consts::WILL]).is_empty());
        assert_eq!(codec.state(), DecoderState::NegotiateWill);
        assert_eq!(
            collect_all(&mut codec, &[consts::option::BINARY, b'b']),
            data(b"b")
        );
        assert!(codec.is_binary());
        assert!(!codec.in_sequence());
    }

    // ============================================================================
    // Decoding Tests - Negotiation
    // ============================================================================

    #[test]
    fn will_and_wont_binary_toggle_mode() {
        let mut codec = TelnetCodec::new();
        collect_all(&mut codec, &[consts::IAC, consts::WILL, consts::option::BINARY]);
        assert!(codec.is_binary());
        collect_all(&mut codec, &[consts::IAC, consts::WONT, consts::option::BINARY]);
        assert!(!codec.is_binary());
    }

    #[test]
    fn will_other_option_leaves_mode() {
        let mut codec = TelnetCodec::new();
        let events = collect_all(&mut codec, &[consts::IAC, consts::WILL, consts::option::ECHO, b'k']);
        assert_eq!(events, data(b"k"));
        assert!(!codec.is_binary());
    }

    #[test]
    fn do_and_dont_are_swallowed() {
        let mut codec = TelnetCodec::new();
        let events = collect_all(
            &mut codec,
            &[
                consts::IAC,
                consts::DO,
                consts::option::SGA,
                b'1',
                consts::IAC,
                consts::DONT,
                consts::option::BINARY,
                b'2',
            ],
        );
        assert_eq!(events, data(b"12"));
        assert!(!codec.is_binary());
    }

    #[test]
    fn skip_drops_one_byte() {
        let mut codec = TelnetCodec::new();
        codec.skip_next();
        assert_eq!(collect_all(&mut codec, b"ab"), data(b"b"));
    }

    // ============================================================================
    // Decoding Tests - Carriage Return Padding
    // ============================================================================

    #[test]
    fn cr_lf_drops_lf_outside_binary() {
        let mut codec = TelnetCodec::new();
        assert_eq!(collect_all(&mut codec, b"a\r\nb"), data(b"a\rb"));
    }

    #[test]
    fn cr_nul_drops_nul_outside_binary() {
        let mut codec = TelnetCodec::new();
        assert_eq!(collect_all(&mut codec, b"a\r\0b"), data(b"a\rb"));
    }

    #[test]
    fn bare_cr_keeps_following_byte() {
        let mut codec = TelnetCodec::new();
        assert_eq!(collect_all(&mut codec, b"\rx"), data(b"\rx"));
    }

    #[test]
    fn cr_after_cr_is_plain_data() {
        let mut codec = TelnetCodec::new();
        assert_eq!(collect_all(&mut codec, b"\r\r\n"), data(b"\r\r\n"));
    }

    #[test]
    fn iac_after_cr_is_plain_data() {
        let mut codec = TelnetCodec::new();
        let events = collect_all(&mut codec, &[consts::CR, consts::IAC, consts::BRK]);
        assert_eq!(events, data(&[consts::CR, consts::IAC, consts::BRK]));
        assert!(!codec.in_sequence());
    }

    #[test]
    fn cr_iac_iac_keeps_first_iac_and_starts_a_command() {
        let mut codec = TelnetCodec::new();
        let events = collect_all(&mut codec, &[consts::CR, consts::IAC, consts::IAC]);
        assert_eq!(events, data(&[consts::CR, consts::IAC]));
        assert_eq!(codec.state(), DecoderState::InterpretAsCommand);
    }

    #[test]
    fn cr_lf_kept_in_binary() {
        let mut codec = TelnetCodec::new();
        codec.set_binary(true);
        assert_eq!(collect_all(&mut codec, b"\r\n"), data(b"\r\n"));
    }

    #[test]
    fn reset_clears_state_and_binary() {
        let mut codec = TelnetCodec::new();
        codec.set_binary(true);
        collect_all(&mut codec, &[consts::IAC]);
        codec.reset();
        assert_eq!(codec.state(), DecoderState::NormalData);
        assert!(!codec.is_binary());
    }

    // ============================================================================
    // Encoding Tests
    // ============================================================================

    #[test]
    fn encode_doubles_iac() {
        let mut codec = TelnetCodec::new();
        let mut dst = BytesMut::new();
        for byte in [b'A', consts::IAC, b'B'] {
            codec.encode(byte, &mut dst).expect("encode ok");
        }
        assert_eq!(&dst[..], &[b'A', consts::IAC, consts::IAC, b'B']);
    }

    #[test]
    fn escaped_lengths() {
        assert_eq!(escape(0).len(), 1);
        assert_eq!(escape(consts::IAC).len(), 2);
        assert!(!escape(consts::IAC).is_empty());
    }
}
