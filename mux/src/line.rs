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

//! Per-connection terminal line state
//!
//! A [`Line`] owns everything one terminal needs: the socket, the Telnet
//! decoder, the receive and transmit rings, the transcript log and the
//! telemetry counters. Lines live inside a
//! [`Multiplexer`](crate::Multiplexer) and are only touched under its lock.

use crate::buffer::RingBuffer;
use crate::error::{MuxError, Result};
use crate::logfile::LogHandle;
use crate::socket::{Connection, Transfer};
use bytes::BytesMut;
use linemux_telnetcodec::{TelnetCodec, TelnetEvent, WireBytes, consts, escape};
use metrics::{counter, gauge};
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio_util::codec::Decoder;
use tracing::{debug, info, trace, warn};

/// One decoded input character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RxChar {
    /// Character value; zero for a break
    pub byte: u8,
    /// Set when the character stands for a Telnet break
    pub is_break: bool,
}

impl RxChar {
    /// A plain data character
    pub fn data(byte: u8) -> Self {
        Self {
            byte,
            is_break: false,
        }
    }

    /// A break indication
    pub fn brk() -> Self {
        Self {
            byte: 0,
            is_break: true,
        }
    }
}

impl From<TelnetEvent> for RxChar {
    fn from(event: TelnetEvent) -> Self {
        let (byte, is_break) = event.into_parts();
        Self { byte, is_break }
    }
}

/// Point-in-time view of a line for status queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStatus {
    /// Line index
    pub index: usize,
    /// Peer address while connected
    pub peer: Option<SocketAddr>,
    /// Time since the connection was accepted
    pub connected_for: Option<Duration>,
    /// Whether input is delivered by `get`
    pub receive_enabled: bool,
    /// Cleared while the transmit ring is near full
    pub transmit_enabled: bool,
    /// Whether the peer negotiated binary
    pub binary: bool,
    /// Decoded characters waiting to be read
    pub receive_queued: usize,
    /// Escaped bytes waiting to be sent
    pub transmit_queued: usize,
    /// Buffered ring size, if buffered
    pub buffer_size: Option<usize>,
    /// Bytes held in the transmit ring, sent or not
    pub buffer_retained: usize,
    /// Raw bytes read from the socket
    pub received: u64,
    /// Bytes written to the socket
    pub transmitted: u64,
    /// Bytes refused or evicted
    pub dropped: u64,
    /// Transcript log name
    pub log: Option<String>,
}

/// Terminal line state
#[derive(Debug)]
pub struct Line {
    index: usize,
    connection: Option<Box<dyn Connection>>,
    peer: Option<SocketAddr>,
    connected_at: Option<Instant>,
    receive_enabled: bool,
    transmit_enabled: bool,
    codec: TelnetCodec,
    scratch: BytesMut,
    rx: RingBuffer<RxChar>,
    tx: RingBuffer<u8>,
    buffered: bool,
    guard: usize,
    received: u64,
    transmitted: u64,
    dropped: u64,
    log: Option<LogHandle>,
}

impl Line {
    pub(crate) fn new(
        index: usize,
        receive_capacity: usize,
        transmit_capacity: usize,
        guard: usize,
    ) -> Self {
        Self {
            index,
            connection: None,
            peer: None,
            connected_at: None,
            receive_enabled: true,
            transmit_enabled: true,
            codec: TelnetCodec::new(),
            scratch: BytesMut::with_capacity(receive_capacity),
            rx: RingBuffer::new(receive_capacity),
            tx: RingBuffer::new(transmit_capacity),
            buffered: false,
            guard,
            received: 0,
            transmitted: 0,
            dropped: 0,
            log: None,
        }
    }

    /// Line index inside its multiplexer
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` while a socket is bound to the line
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns `true` when transmit data is kept without a connection
    pub fn is_buffered(&self) -> bool {
        self.buffered
    }

    /// Transmit backpressure flag
    pub fn transmit_enabled(&self) -> bool {
        self.transmit_enabled
    }

    /// Whether decoded input is handed out
    pub fn receive_enabled(&self) -> bool {
        self.receive_enabled
    }

    /// Decoded characters waiting to be read
    pub fn receive_queued(&self) -> usize {
        self.rx.len()
    }

    /// Escaped bytes waiting to be sent
    pub fn transmit_queued(&self) -> usize {
        self.tx.len()
    }

    /// Transcript log, if any
    pub fn log(&self) -> Option<&LogHandle> {
        self.log.as_ref()
    }

    /// Snapshot for status output
    pub fn status(&self) -> LineStatus {
        LineStatus {
            index: self.index,
            peer: self.peer,
            connected_for: self.connected_at.map(|at| at.elapsed()),
            receive_enabled: self.receive_enabled,
            transmit_enabled: self.transmit_enabled,
            binary: self.codec.is_binary(),
            receive_queued: self.rx.len(),
            transmit_queued: self.tx.len(),
            buffer_size: self.buffered.then(|| self.tx.capacity()),
            buffer_retained: self.tx.retained(),
            received: self.received,
            transmitted: self.transmitted,
            dropped: self.dropped,
            log: self.log.as_ref().map(|log| log.name().to_string()),
        }
    }

    pub(crate) fn set_receive_enabled(&mut self, enabled: bool) {
        self.receive_enabled = enabled;
    }

    pub(crate) fn set_log(&mut self, log: Option<LogHandle>) -> Option<LogHandle> {
        std::mem::replace(&mut self.log, log)
    }

    /// Switch to a buffered transmit ring of `size` bytes, discarding content.
    pub(crate) fn make_buffered(&mut self, size: usize) {
        self.tx = RingBuffer::new(size);
        self.buffered = true;
    }

    /// Switch to an unbuffered transmit ring of `capacity` bytes.
    pub(crate) fn make_unbuffered(&mut self, capacity: usize) {
        self.tx = RingBuffer::new(capacity);
        self.buffered = false;
    }

    /// Return to the idle state used when a master socket opens.
    pub(crate) fn reinitialize(&mut self, transmit_capacity: usize) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
            connection_closed();
        }
        self.peer = None;
        self.connected_at = None;
        self.codec.reset();
        self.rx.clear();
        if self.buffered {
            self.tx.clear();
        } else {
            self.make_unbuffered(transmit_capacity);
        }
        self.received = 0;
        self.transmitted = 0;
        self.dropped = 0;
        self.transmit_enabled = true;
    }

    // ------------------------------------------------------------------
    // Application side
    // ------------------------------------------------------------------

    /// Queue one application byte for transmission.
    ///
    /// The byte is copied to the transcript log first, whatever happens to it
    /// afterwards.
    pub(crate) fn put(&mut self, byte: u8) -> Result<()> {
        if let Some(log) = &self.log {
            log.write_byte(byte);
        }
        if self.connection.is_none() && !self.buffered {
            self.count_dropped(1);
            return Err(MuxError::Lost);
        }
        let escaped = escape(byte);
        if self.buffered {
            let evicted = escaped
                .as_ref()
                .iter()
                .filter(|&&wire| self.tx.push_overwrite(wire).is_some())
                .count();
            self.count_dropped(evicted);
            return Ok(());
        }
        if self.tx.available() < 2 {
            self.count_dropped(1);
            self.transmit_enabled = false;
            return Err(MuxError::Stall);
        }
        for &wire in escaped.as_ref() {
            self.tx.push(wire);
        }
        if self.tx.available() <= self.guard {
            self.transmit_enabled = false;
        }
        Ok(())
    }

    /// Queue every byte of `text`, ignoring failures.
    pub(crate) fn message(&mut self, text: &str) {
        for &byte in text.as_bytes() {
            let _ = self.put(byte);
        }
    }

    /// Next decoded character, if the line is connected and receive-enabled.
    pub(crate) fn get(&mut self) -> Option<RxChar> {
        if self.connection.is_some() && self.receive_enabled {
            self.rx.pop()
        } else {
            None
        }
    }

    /// Inject a character into the receive ring. Returns `false` when full.
    pub(crate) fn enqueue(&mut self, input: RxChar) -> bool {
        self.rx.push(input)
    }

    // ------------------------------------------------------------------
    // Socket side
    // ------------------------------------------------------------------

    /// Bind a freshly accepted socket.
    ///
    /// Unbuffered lines start from an empty transmit ring with zeroed
    /// counters. Buffered lines keep their counters and rewind so the whole
    /// retained history is replayed. The banner goes ahead of everything.
    pub(crate) fn connect(
        &mut self,
        mut connection: Box<dyn Connection>,
        peer: SocketAddr,
        banner: &str,
    ) {
        match connection.write_nonblocking(&consts::CONNECT_NEGOTIATION) {
            Ok(_) => trace!(
                line = self.index,
                "Sending {}",
                WireBytes(&consts::CONNECT_NEGOTIATION)
            ),
            Err(err) => warn!(line = self.index, "Negotiation write failed: {}", err),
        }
        self.connection = Some(connection);
        self.peer = Some(peer);
        self.connected_at = Some(Instant::now());
        self.codec.reset();
        self.receive_enabled = true;
        self.transmit_enabled = true;

        if self.buffered {
            self.tx.rewind();
        } else {
            self.tx.clear();
            self.received = 0;
            self.transmitted = 0;
            self.dropped = 0;
        }
        let evicted = self.tx.prepend(banner.as_bytes());
        self.count_dropped(evicted);

        counter!("linemux.connections.accepted").increment(1);
        gauge!("linemux.connections.active").increment(1.0);
        info!(line = self.index, %peer, "Connected");

        if let Err(err) = self.flush() {
            warn!(line = self.index, "Write failed: {}", err);
        }
        self.transmitted = self.transmitted.saturating_sub(banner.len() as u64);
    }

    /// Read and decode whatever the socket has, within flow-control limits.
    ///
    /// Returns `false` when the peer closed the connection or the read failed,
    /// in which case the caller resets the line.
    pub(crate) fn receive(&mut self) -> bool {
        if !self.receive_enabled {
            return true;
        }
        let limit = if self.rx.is_empty() {
            self.rx.capacity().saturating_sub(self.guard)
        } else if self.codec.in_sequence() {
            self.rx.available()
        } else {
            0
        };
        if limit == 0 {
            return true;
        }
        let Some(connection) = self.connection.as_mut() else {
            return true;
        };

        self.scratch.clear();
        self.scratch.resize(limit, 0);
        let count = match connection.read_nonblocking(&mut self.scratch) {
            Ok(Transfer::Bytes(count)) => count,
            Ok(Transfer::WouldBlock) => return true,
            Ok(Transfer::Closed) => return false,
            Err(err) => {
                warn!(line = self.index, "Read failed: {}", err);
                return false;
            }
        };
        self.scratch.truncate(count);
        if count == 0 {
            return true;
        }

        trace!(line = self.index, "Received {}", WireBytes(&self.scratch[..]));
        self.received += count as u64;
        counter!("linemux.bytes.received").increment(count as u64);

        loop {
            match self.codec.decode(&mut self.scratch) {
                Ok(Some(event)) => {
                    self.rx.push(RxChar::from(event));
                }
                Ok(None) => return true,
                Err(err) => {
                    warn!(line = self.index, "Decode failed: {}", err);
                    return false;
                }
            }
        }
    }

    /// Write queued transmit bytes until the socket would block.
    ///
    /// Returns the number of bytes still queued.
    pub(crate) fn flush(&mut self) -> io::Result<usize> {
        let Some(connection) = self.connection.as_mut() else {
            return Ok(self.tx.len());
        };
        while !self.tx.is_empty() {
            let (pending, _) = self.tx.as_slices();
            let sent = match connection.write_nonblocking(pending)? {
                Transfer::Bytes(0) | Transfer::WouldBlock | Transfer::Closed => break,
                Transfer::Bytes(sent) => sent,
            };
            trace!(line = self.index, "Sent {}", WireBytes(&pending[..sent]));
            self.tx.advance(sent);
            self.transmitted += sent as u64;
            counter!("linemux.bytes.transmitted").increment(sent as u64);
        }
        Ok(self.tx.len())
    }

    /// Drain the transmit ring; re-enable transmit once empty.
    ///
    /// Returns `false` when the write failed and the line must be reset.
    pub(crate) fn transmit(&mut self) -> bool {
        match self.flush() {
            Ok(0) => {
                self.transmit_enabled = true;
                true
            }
            Ok(_) => true,
            Err(err) => {
                warn!(line = self.index, "Write failed: {}", err);
                false
            }
        }
    }

    /// Drop the connection.
    ///
    /// Pending output is flushed best-effort first. The receive ring is
    /// emptied; the transmit ring survives only in buffered mode.
    pub(crate) fn reset(&mut self) {
        if let Some(log) = &self.log {
            log.flush();
        }
        if let Err(err) = self.flush() {
            debug!(line = self.index, "Flush before disconnect failed: {}", err);
        }
        if let Some(mut connection) = self.connection.take() {
            connection.close();
            connection_closed();
            info!(line = self.index, "Disconnected");
        }
        self.peer = None;
        self.connected_at = None;
        self.codec.reset();
        self.rx.clear();
        if !self.buffered {
            self.tx.clear();
        }
        self.transmit_enabled = true;
    }

    fn count_dropped(&mut self, count: usize) {
        if count > 0 {
            self.dropped += count as u64;
            counter!("linemux.bytes.dropped").increment(count as u64);
        }
    }
}

fn connection_closed() {
    counter!("linemux.connections.closed").increment(1);
    gauge!("linemux.connections.active").decrement(1.0);
}
