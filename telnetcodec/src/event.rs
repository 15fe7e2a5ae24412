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

///
/// `TelnetEvent` is what survives decoding once protocol bytes are stripped.
///
/// Negotiation, go-ahead, erase and similar commands never surface; the only
/// command that reaches the application is a break, which a terminal line
/// stores as a zero byte carrying a break mark.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TelnetEvent {
    /// Application data byte
    Data(u8),
    /// Operator pressed the Break key or the Attention key.
    Break,
}

impl TelnetEvent {
    /// The byte value stored for this event, and whether it is a break.
    pub fn into_parts(self) -> (u8, bool) {
        match self {
            TelnetEvent::Data(byte) => (byte, false),
            TelnetEvent::Break => (0, true),
        }
    }

    /// Returns `true` for [`TelnetEvent::Break`].
    pub fn is_break(self) -> bool {
        matches!(self, TelnetEvent::Break)
    }
}
