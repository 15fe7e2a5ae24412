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

//! Telnet command and option byte values (RFC 854, RFC 856, RFC 857, RFC 858, RFC 1184)

/// Interpret As Command
pub const IAC: u8 = 0xFF;
/// Request the peer stop performing an option
pub const DONT: u8 = 0xFE;
/// Request the peer perform an option
pub const DO: u8 = 0xFD;
/// Refuse to perform an option
pub const WONT: u8 = 0xFC;
/// Offer to perform an option
pub const WILL: u8 = 0xFB;
/// Subnegotiation Begin
pub const SB: u8 = 0xFA;
/// Go Ahead
pub const GA: u8 = 0xF9;
/// Erase Line
pub const EL: u8 = 0xF8;
/// Erase Character
pub const EC: u8 = 0xF7;
/// Are You There
pub const AYT: u8 = 0xF6;
/// Abort Output
pub const AO: u8 = 0xF5;
/// Interrupt Process
pub const IP: u8 = 0xF4;
/// Break
pub const BRK: u8 = 0xF3;
/// Data Mark
pub const DM: u8 = 0xF2;
/// No Operation
pub const NOP: u8 = 0xF1;
/// Subnegotiation End
pub const SE: u8 = 0xF0;

/// Carriage Return
pub const CR: u8 = 0x0D;
/// Line Feed
pub const LF: u8 = 0x0A;
/// Null
pub const NUL: u8 = 0x00;

/// Option codes
pub mod option {
    /// Binary Transmission (RFC 856)
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857)
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead (RFC 858)
    pub const SGA: u8 = 3;
    /// Linemode (RFC 1184)
    pub const LINEMODE: u8 = 34;
}

/// Unsolicited negotiation sent once when a connection is bound to a line.
///
/// Asks for a raw 8-bit character stream: the server offers to handle line
/// editing, go-ahead suppression, echo and binary output, and asks the peer
/// to send binary.
pub const CONNECT_NEGOTIATION: [u8; 15] = [
    IAC,
    WILL,
    option::LINEMODE,
    IAC,
    WILL,
    option::SGA,
    IAC,
    WILL,
    option::ECHO,
    IAC,
    WILL,
    option::BINARY,
    IAC,
    DO,
    option::BINARY,
];

/// Name of a command byte, if it is one.
pub fn command_name(byte: u8) -> Option<&'static str> {
    match byte {
        IAC => Some("IAC"),
        DONT => Some("DONT"),
        DO => Some("DO"),
        WONT => Some("WONT"),
        WILL => Some("WILL"),
        SB => Some("SB"),
        GA => Some("GA"),
        EL => Some("EL"),
        EC => Some("EC"),
        AYT => Some("AYT"),
        AO => Some("AO"),
        IP => Some("IP"),
        BRK => Some("BRK"),
        DM => Some("DATAMK"),
        NOP => Some("NOP"),
        SE => Some("SE"),
        _ => None,
    }
}

/// Name of an option code understood by the multiplexer, if it is one.
pub fn option_name(byte: u8) -> Option<&'static str> {
    match byte {
        option::BINARY => Some("BIN"),
        option::ECHO => Some("ECHO"),
        option::SGA => Some("SGA"),
        option::LINEMODE => Some("LINE"),
        _ => None,
    }
}
