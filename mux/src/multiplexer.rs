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

//! Terminal line multiplexer
//!
//! The [`Multiplexer`] owns a fixed set of [`Line`]s and at most one master
//! listening socket. A driver loop calls [`poll_connect`], [`poll_receive`]
//! and [`poll_transmit`] repeatedly; the emulated device calls [`get`] and
//! [`put`] in between. None of these block.
//!
//! All line state sits behind a single mutex so a keyboard watcher thread can
//! inject input through [`enqueue_input`] while the polling loop runs.
//!
//! [`poll_connect`]: Multiplexer::poll_connect
//! [`poll_receive`]: Multiplexer::poll_receive
//! [`poll_transmit`]: Multiplexer::poll_transmit
//! [`get`]: Multiplexer::get
//! [`put`]: Multiplexer::put
//! [`enqueue_input`]: Multiplexer::enqueue_input

use crate::command::MuxCommand;
use crate::config::{MuxConfig, validate_buffer_size};
use crate::error::{MuxError, Result};
use crate::line::{Line, LineStatus, RxChar};
use crate::logfile::{LogHandle, LogRegistry};
use crate::order::ConnectionOrder;
use crate::socket::{Listener, TcpMaster};
use metrics::counter;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const ALL_BUSY: &[u8] = b"All connections busy\r\n";
const OPERATOR_DISCONNECT: &str = "\r\nOperator disconnected line\r\n\n";

#[derive(Debug)]
struct MuxState {
    lines: Vec<Line>,
    master: Option<Box<dyn Listener>>,
    local_addr: Option<SocketAddr>,
    order: ConnectionOrder,
    buffer_size: Option<usize>,
    log_template: Option<String>,
}

impl MuxState {
    fn line_mut(&mut self, line: usize) -> Result<&mut Line> {
        let lines = self.lines.len();
        self.lines
            .get_mut(line)
            .ok_or(MuxError::LineOutOfRange { line, lines })
    }

    fn line(&self, line: usize) -> Result<&Line> {
        let lines = self.lines.len();
        self.lines
            .get(line)
            .ok_or(MuxError::LineOutOfRange { line, lines })
    }
}

/// Terminal line multiplexer
#[derive(Debug)]
pub struct Multiplexer {
    name: String,
    simulator_name: String,
    transmit_capacity: usize,
    log_registry: Arc<LogRegistry>,
    state: Mutex<MuxState>,
}

impl Multiplexer {
    /// Create a multiplexer with every line disconnected.
    pub fn new(config: MuxConfig) -> Result<Self> {
        config.validate()?;
        let lines = (0..config.lines)
            .map(|index| {
                Line::new(
                    index,
                    config.receive_capacity,
                    config.transmit_capacity,
                    config.guard,
                )
            })
            .collect();
        let mux = Self {
            name: config.name,
            simulator_name: config.simulator_name,
            transmit_capacity: config.transmit_capacity,
            log_registry: config.log_registry,
            state: Mutex::new(MuxState {
                lines,
                master: None,
                local_addr: None,
                order: ConnectionOrder::Sequential,
                buffer_size: None,
                log_template: None,
            }),
        };
        if let Some(size) = config.buffer_size {
            mux.set_buffered(Some(size))?;
        }
        if let Some(template) = config.log_template {
            mux.set_log_template(&template)?;
        }
        Ok(mux)
    }

    fn state(&self) -> MutexGuard<'_, MuxState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Simulator name used in banners
    pub fn simulator_name(&self) -> &str {
        &self.simulator_name
    }

    /// Number of lines
    pub fn lines(&self) -> usize {
        self.state().lines.len()
    }

    /// Registry resolving the `LOG` and `DEBUG` keywords
    pub fn log_registry(&self) -> &Arc<LogRegistry> {
        &self.log_registry
    }

    // ------------------------------------------------------------------
    // Master socket
    // ------------------------------------------------------------------

    /// Listen on `0.0.0.0:port`, returning the bound address.
    ///
    /// Every line returns to the disconnected state with zeroed counters.
    pub fn open_master(&self, port: u16) -> Result<SocketAddr> {
        let listener = TcpMaster::bind(port)
            .map_err(|source| MuxError::open(format!("port {port}"), source))?;
        self.open_master_with(Box::new(listener))
    }

    /// Use an already bound listener as the master socket.
    pub fn open_master_with(&self, listener: Box<dyn Listener>) -> Result<SocketAddr> {
        let address = listener.local_addr()?;
        self.close_master();
        let mut state = self.state();
        for line in &mut state.lines {
            line.reinitialize(self.transmit_capacity);
        }
        state.master = Some(listener);
        state.local_addr = Some(address);
        info!(mux = %self.name, "Listening on port {}", address.port());
        Ok(address)
    }

    /// Say goodbye to every connected line, reset it and stop listening.
    pub fn close_master(&self) {
        let mut state = self.state();
        let message = format!(
            "\r\nDisconnected from the {} simulator\r\n\n",
            self.simulator_name
        );
        for line in state.lines.iter_mut().filter(|line| line.is_connected()) {
            line.message(&message);
            line.reset();
        }
        if state.master.take().is_some() {
            info!(mux = %self.name, "Closed master socket");
        }
        state.local_addr = None;
    }

    /// Returns `true` while a master socket is open
    pub fn is_listening(&self) -> bool {
        self.state().master.is_some()
    }

    /// Address of the master socket
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state().local_addr
    }

    // ------------------------------------------------------------------
    // Polling
    // ------------------------------------------------------------------

    /// Accept at most one pending connection and bind it to a free line.
    ///
    /// Returns the line index, or `None` when nothing was accepted or every
    /// line was busy.
    #[instrument(level = "trace", skip(self), fields(mux = %self.name))]
    pub fn poll_connect(&self) -> Option<usize> {
        let mut state = self.state();
        let accepted = match state.master.as_mut()?.accept_nonblocking() {
            Ok(accepted) => accepted?,
            Err(err) => {
                warn!("Accept failed: {}", err);
                return None;
            }
        };
        let (mut connection, peer) = accepted;
        let lines = state.lines.len();
        let free = state
            .order
            .iter(lines)
            .find(|&index| !state.lines[index].is_connected());

        let Some(index) = free else {
            if let Err(err) = connection.write_nonblocking(ALL_BUSY) {
                debug!(%peer, "Busy notice not sent: {}", err);
            }
            connection.close();
            counter!("linemux.connections.rejected").increment(1);
            info!(%peer, "All connections busy");
            return None;
        };
        let banner = self.banner(index, lines);
        state.lines[index].connect(connection, peer, &banner);
        Some(index)
    }

    /// Read and decode pending input on every connected line.
    ///
    /// Lines whose peer closed or whose socket failed are reset.
    #[instrument(level = "trace", skip(self), fields(mux = %self.name))]
    pub fn poll_receive(&self) {
        let mut state = self.state();
        for line in state.lines.iter_mut().filter(|line| line.is_connected()) {
            if !line.receive() {
                line.reset();
            }
        }
    }

    /// Send queued output on every connected line.
    #[instrument(level = "trace", skip(self), fields(mux = %self.name))]
    pub fn poll_transmit(&self) {
        let mut state = self.state();
        for line in state.lines.iter_mut().filter(|line| line.is_connected()) {
            if !line.transmit() {
                line.reset();
            }
        }
    }

    fn banner(&self, index: usize, lines: usize) -> String {
        let line = if lines > 1 {
            format!(", line {index}")
        } else {
            String::new()
        };
        format!(
            "\n\r\nConnected to the {} simulator {} device{}\r\n\n",
            self.simulator_name, self.name, line
        )
    }

    // ------------------------------------------------------------------
    // Device side
    // ------------------------------------------------------------------

    /// Next decoded character on `line`.
    ///
    /// `None` when nothing is queued, the line is disconnected or receive is
    /// disabled, or `line` is out of range.
    pub fn get(&self, line: usize) -> Option<RxChar> {
        self.state().lines.get_mut(line)?.get()
    }

    /// Queue `byte` for transmission on `line`.
    pub fn put(&self, line: usize, byte: u8) -> Result<()> {
        self.state().line_mut(line)?.put(byte)
    }

    /// Queue every byte of `text` on `line`, ignoring lost and stalled bytes.
    pub fn line_message(&self, line: usize, text: &str) -> Result<()> {
        self.state().line_mut(line)?.message(text);
        Ok(())
    }

    /// Inject input into `line`'s receive ring. Returns `false` when full.
    pub fn enqueue_input(&self, line: usize, input: RxChar) -> bool {
        self.state()
            .lines
            .get_mut(line)
            .is_some_and(|target| target.enqueue(input))
    }

    /// Decoded characters waiting on `line`
    pub fn queued_receive_count(&self, line: usize) -> usize {
        self.state().lines.get(line).map_or(0, Line::receive_queued)
    }

    /// Escaped bytes waiting to be sent on `line`
    pub fn queued_transmit_count(&self, line: usize) -> usize {
        self.state().lines.get(line).map_or(0, Line::transmit_queued)
    }

    /// Transmit backpressure flag of `line`
    pub fn transmit_enabled(&self, line: usize) -> bool {
        self.state().lines.get(line).is_some_and(Line::transmit_enabled)
    }

    /// Returns `true` when `line` has a live connection
    pub fn is_connected(&self, line: usize) -> bool {
        self.state().lines.get(line).is_some_and(Line::is_connected)
    }

    /// Enable or disable input delivery on `line`
    pub fn set_receive_enabled(&self, line: usize, enabled: bool) -> Result<()> {
        self.state().line_mut(line)?.set_receive_enabled(enabled);
        Ok(())
    }

    /// Operator disconnect. A disconnected line is left alone.
    pub fn disconnect(&self, line: usize) -> Result<()> {
        let mut state = self.state();
        let target = state.line_mut(line)?;
        if target.is_connected() {
            target.message(OPERATOR_DISCONNECT);
            target.reset();
            info!(mux = %self.name, line, "Operator disconnected line");
        }
        Ok(())
    }

    /// Number of lines with a live connection
    pub fn connection_count(&self) -> usize {
        self.state()
            .lines
            .iter()
            .filter(|line| line.is_connected())
            .count()
    }

    /// Status snapshot of `line`
    pub fn line_status(&self, line: usize) -> Result<LineStatus> {
        Ok(self.state().line(line)?.status())
    }

    /// Status snapshots of every line
    pub fn line_statuses(&self) -> Vec<LineStatus> {
        self.state().lines.iter().map(Line::status).collect()
    }

    // ------------------------------------------------------------------
    // Connection policy
    // ------------------------------------------------------------------

    /// Switch every line to buffered mode with `size` bytes, or back to
    /// unbuffered with `None`.
    ///
    /// Transmit rings are replaced, so queued output is discarded.
    pub fn set_buffered(&self, size: Option<usize>) -> Result<()> {
        let mut state = self.state();
        match size {
            Some(size) => {
                let size = validate_buffer_size(size)?;
                for line in &mut state.lines {
                    line.make_buffered(size);
                }
                state.buffer_size = Some(size);
                debug!(mux = %self.name, size, "Buffered mode");
            }
            None => {
                if state.buffer_size.take().is_some() {
                    for line in &mut state.lines {
                        line.make_unbuffered(self.transmit_capacity);
                    }
                    debug!(mux = %self.name, "Unbuffered mode");
                }
            }
        }
        Ok(())
    }

    /// Buffered ring size, if buffered
    pub fn buffer_size(&self) -> Option<usize> {
        self.state().buffer_size
    }

    /// Open per-line transcript logs from `template`.
    ///
    /// Line `n` logs to `<template>_<n>`, or `<template>` when there is a
    /// single line. Either every log opens or nothing changes.
    pub fn set_log_template(&self, template: &str) -> Result<()> {
        let template = template.trim();
        if template.is_empty() {
            return Err(MuxError::MissingValue("LOG"));
        }
        let mut state = self.state();
        let lines = state.lines.len();
        let handles = (0..lines)
            .map(|index| {
                let name = if lines > 1 {
                    format!("{template}_{index}")
                } else {
                    template.to_string()
                };
                self.log_registry.open(&name)
            })
            .collect::<Result<Vec<LogHandle>>>()?;
        for (line, handle) in state.lines.iter_mut().zip(handles) {
            line.set_log(Some(handle));
        }
        state.log_template = Some(template.to_string());
        debug!(mux = %self.name, template, "Logging lines");
        Ok(())
    }

    /// Close every line log and forget the template.
    pub fn clear_logs(&self) {
        let mut state = self.state();
        for line in &mut state.lines {
            line.set_log(None);
        }
        state.log_template = None;
    }

    /// Log template, if any
    pub fn log_template(&self) -> Option<String> {
        self.state().log_template.clone()
    }

    /// Log `line` to `name`, replacing any previous log.
    pub fn set_line_log(&self, line: usize, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(MuxError::MissingValue("LOG"));
        }
        let handle = self.log_registry.open(name.trim())?;
        self.state().line_mut(line)?.set_log(Some(handle));
        Ok(())
    }

    /// Stop logging `line`.
    pub fn clear_line_log(&self, line: usize) -> Result<()> {
        self.state().line_mut(line)?.set_log(None);
        Ok(())
    }

    /// Parse and install a connection order. On error the old order stays.
    pub fn set_connection_order(&self, spec: &str) -> Result<()> {
        let mut state = self.state();
        state.order = ConnectionOrder::parse(spec, state.lines.len())?;
        debug!(mux = %self.name, order = ?state.order, "Connection order");
        Ok(())
    }

    /// Installed connection order
    pub fn order(&self) -> ConnectionOrder {
        self.state().order.clone()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Apply one configuration command.
    pub fn execute(&self, command: MuxCommand) -> Result<()> {
        match command {
            MuxCommand::Listen(port) => self.open_master(port).map(|_| ()),
            MuxCommand::Log(template) => self.set_log_template(&template),
            MuxCommand::NoLog => {
                self.clear_logs();
                Ok(())
            }
            MuxCommand::Buffered(size) => self.set_buffered(Some(size)),
            MuxCommand::Unbuffered => self.set_buffered(None),
            MuxCommand::LineOrder(spec) => self.set_connection_order(&spec),
            MuxCommand::Disconnect(line) => self.disconnect(line),
            MuxCommand::Close => {
                self.close_master();
                Ok(())
            }
        }
    }

    /// Apply a comma-separated command list and require a listening master.
    ///
    /// Returns the attachment description, e.g. `2323, buffered=32768`.
    pub fn attach(&self, args: &str) -> Result<String> {
        for command in args.split(',').map(str::trim).filter(|arg| !arg.is_empty()) {
            self.execute(command.parse()?)?;
        }
        let state = self.state();
        let Some(address) = state.local_addr else {
            return Err(MuxError::NotListening);
        };
        let mut description = address.port().to_string();
        if let Some(size) = state.buffer_size {
            description.push_str(&format!(", buffered={size}"));
        }
        if let Some(template) = &state.log_template {
            description.push_str(&format!(", log={template}"));
        }
        Ok(description)
    }

    /// Close the master socket.
    pub fn detach(&self) {
        self.close_master();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BUFFER_SIZE;
    use crate::logfile::capture::Captured;
    use crate::socket::mock::{self, MockDialer, MockPeer};
    use linemux_telnetcodec::consts;

    fn mux(lines: usize) -> (Multiplexer, MockDialer) {
        let mux = Multiplexer::new(
            MuxConfig::new(lines)
                .with_name("TTY")
                .with_simulator_name("Test"),
        )
        .unwrap();
        let (listener, dialer) = mock::listener();
        mux.open_master_with(Box::new(listener)).unwrap();
        (mux, dialer)
    }

    fn text_after_negotiation(peer: &MockPeer) -> Vec<u8> {
        let wire = peer.received();
        assert!(wire.starts_with(&consts::CONNECT_NEGOTIATION));
        wire[consts::CONNECT_NEGOTIATION.len()..].to_vec()
    }

    // ========================================================================
    // Connect Tests
    // ========================================================================

    #[test]
    fn connect_binds_first_free_line_with_banner() {
        let (mux, dialer) = mux(3);
        let peer = dialer.dial("192.168.1.5:5000");
        assert_eq!(mux.poll_connect(), Some(0));
        assert_eq!(
            text_after_negotiation(&peer),
            b"\n\r\nConnected to the Test simulator TTY device, line 0\r\n\n"
        );
        assert!(mux.is_connected(0));
        assert_eq!(mux.poll_connect(), None);
    }

    #[test]
    fn single_line_banner_omits_line_number() {
        let (mux, dialer) = mux(1);
        let peer = dialer.dial("192.168.1.5:5000");
        assert_eq!(mux.poll_connect(), Some(0));
        assert_eq!(
            text_after_negotiation(&peer),
            b"\n\r\nConnected to the Test simulator TTY device\r\n\n"
        );
    }

    #[test]
    fn busy_lines_are_skipped_then_all_busy() {
        let (mux, dialer) = mux(3);
        let _first = dialer.dial("10.0.0.1:1");
        let _second = dialer.dial("10.0.0.2:1");
        assert_eq!(mux.poll_connect(), Some(0));
        assert_eq!(mux.poll_connect(), Some(1));

        let _third = dialer.dial("10.0.0.3:1");
        assert_eq!(mux.poll_connect(), Some(2));

        let before = mux.line_statuses();
        let rejected = dialer.dial("10.0.0.4:1");
        assert_eq!(mux.poll_connect(), None);
        assert_eq!(rejected.received(), ALL_BUSY);
        assert!(rejected.is_closed());
        let after = mux.line_statuses();
        for (old, new) in before.iter().zip(&after) {
            assert_eq!(old.peer, new.peer);
            assert_eq!(old.transmit_queued, new.transmit_queued);
        }
    }

    #[test]
    fn connection_order_picks_line() {
        let (mux, dialer) = mux(8);
        mux.set_connection_order("5;2-3").unwrap();
        let _a = dialer.dial("10.0.0.1:1");
        let _b = dialer.dial("10.0.0.2:1");
        assert_eq!(mux.poll_connect(), Some(5));
        assert_eq!(mux.poll_connect(), Some(2));
    }

    #[test]
    fn bad_connection_order_keeps_previous() {
        let (mux, _dialer) = mux(8);
        mux.set_connection_order("1;5;2-4;7").unwrap();
        assert!(mux.set_connection_order("1;99").is_err());
        assert_eq!(mux.connection_order(), "Order=1;5;2-4;7;0;6");
    }

    // ========================================================================
    // Data Path Tests
    // ========================================================================

    #[test]
    fn receive_and_transmit_round_trip() {
        let (mux, dialer) = mux(2);
        let peer = dialer.dial("10.0.0.1:1");
        mux.poll_connect();
        peer.received();

        peer.send(b"ls\r\n");
        mux.poll_receive();
        let input: Vec<u8> = std::iter::from_fn(|| mux.get(0)).map(|c| c.byte).collect();
        assert_eq!(input, b"ls\r");

        for byte in b"ok" {
            mux.put(0, *byte).unwrap();
        }
        assert_eq!(mux.queued_transmit_count(0), 2);
        mux.poll_transmit();
        assert_eq!(peer.received(), b"ok");
        assert_eq!(mux.queued_transmit_count(0), 0);
    }

    #[test]
    fn peer_close_resets_line() {
        let (mux, dialer) = mux(2);
        let peer = dialer.dial("10.0.0.1:1");
        mux.poll_connect();
        peer.hang_up();
        mux.poll_receive();
        assert!(!mux.is_connected(0));
        assert!(peer.is_closed());
        assert!(matches!(mux.put(0, b'x'), Err(MuxError::Lost)));
    }

    #[test]
    fn out_of_range_line_is_rejected() {
        let (mux, _dialer) = mux(2);
        assert!(matches!(
            mux.put(2, b'x'),
            Err(MuxError::LineOutOfRange { line: 2, lines: 2 })
        ));
        assert_eq!(mux.get(7), None);
        assert!(mux.disconnect(3).is_err());
    }

    #[test]
    fn enqueue_input_reaches_get() {
        let (mux, dialer) = mux(1);
        let _peer = dialer.dial("10.0.0.1:1");
        mux.poll_connect();
        assert!(mux.enqueue_input(0, RxChar::brk()));
        assert_eq!(mux.queued_receive_count(0), 1);
        assert_eq!(mux.get(0), Some(RxChar::brk()));
        assert!(!mux.enqueue_input(4, RxChar::data(b'a')));
    }

    // ========================================================================
    // Disconnect Tests
    // ========================================================================

    #[test]
    fn operator_disconnect_sends_notice() {
        let (mux, dialer) = mux(2);
        let peer = dialer.dial("10.0.0.1:1");
        mux.poll_connect();
        peer.received();
        mux.disconnect(0).unwrap();
        assert_eq!(peer.received(), OPERATOR_DISCONNECT.as_bytes());
        assert!(peer.is_closed());
        mux.disconnect(0).unwrap();
    }

    #[test]
    fn close_master_says_goodbye() {
        let (mux, dialer) = mux(2);
        let peer = dialer.dial("10.0.0.1:1");
        mux.poll_connect();
        peer.received();
        mux.close_master();
        assert_eq!(
            peer.received(),
            b"\r\nDisconnected from the Test simulator\r\n\n"
        );
        assert!(!mux.is_listening());
        assert_eq!(mux.poll_connect(), None);
    }

    // ========================================================================
    // Buffered Mode Tests
    // ========================================================================

    #[test]
    fn buffered_output_survives_until_connect() {
        let (mux, dialer) = mux(1);
        mux.set_buffered(Some(64)).unwrap();
        for byte in b"boot log\r\n" {
            mux.put(0, *byte).unwrap();
        }
        let peer = dialer.dial("10.0.0.1:1");
        mux.poll_connect();
        let text = text_after_negotiation(&peer);
        let banner = b"\n\r\nConnected to the Test simulator TTY device\r\n\n";
        assert!(text.starts_with(banner));
        assert_eq!(&text[banner.len()..], b"boot log\r\n");
    }

    #[test]
    fn buffered_overflow_counts_drops() {
        let (mux, _dialer) = mux(1);
        mux.set_buffered(Some(16)).unwrap();
        for byte in 0..40u8 {
            mux.put(0, b'a' + (byte % 26)).unwrap();
        }
        let status = mux.line_status(0).unwrap();
        assert_eq!(status.transmit_queued, 16);
        assert_eq!(status.dropped, 24);
    }

    #[test]
    fn buffered_size_is_validated() {
        let (mux, _dialer) = mux(1);
        assert!(mux.set_buffered(Some(0)).is_err());
        assert!(mux.buffer_size().is_none());
        mux.set_buffered(Some(100)).unwrap();
        mux.set_buffered(None).unwrap();
        assert!(mux.buffer_size().is_none());
        assert!(matches!(mux.put(0, b'x'), Err(MuxError::Lost)));
    }

    // ========================================================================
    // Logging Tests
    // ========================================================================

    #[test]
    fn line_log_records_output_even_when_disconnected() {
        let registry = Arc::new(LogRegistry::new());
        let captured = Captured::default();
        registry.set_log(Some(LogHandle::from_writer("session", captured.clone())));
        let mux = Multiplexer::new(MuxConfig::new(1).with_log_registry(registry)).unwrap();
        mux.set_line_log(0, "LOG").unwrap();
        let _ = mux.put(0, b'h');
        let _ = mux.put(0, b'i');
        assert_eq!(captured.contents(), b"hi");
        assert_eq!(mux.show_log(0).unwrap(), "logging to session");
        mux.clear_line_log(0).unwrap();
        assert_eq!(mux.show_log(0).unwrap(), "no logging");
    }

    #[test]
    fn failed_log_template_changes_nothing() {
        let (mux, _dialer) = mux(2);
        let bad = std::env::temp_dir().join("linemux-no-such-dir").join("tty");
        assert!(mux.set_log_template(bad.to_str().unwrap()).is_err());
        assert!(mux.log_template().is_none());
        assert_eq!(mux.show_log(0).unwrap(), "no logging");
    }

    // ========================================================================
    // Command Tests
    // ========================================================================

    #[test]
    fn attach_requires_listening_master() {
        let mux = Multiplexer::new(MuxConfig::new(2)).unwrap();
        assert!(matches!(mux.attach("BUFFERED"), Err(MuxError::NotListening)));
        assert_eq!(mux.buffer_size(), Some(DEFAULT_BUFFER_SIZE));
    }

    #[test]
    fn attach_describes_listener() {
        let (mux, _dialer) = mux(2);
        let description = mux.attach("BUF=1024, ORDER=1").unwrap();
        assert_eq!(description, "2323, buffered=1024");
        assert_eq!(mux.connection_order(), "Order=1;0");
    }

    #[test]
    fn execute_dispatches_commands() {
        let (mux, dialer) = mux(2);
        let peer = dialer.dial("10.0.0.1:1");
        mux.poll_connect();
        mux.execute("DISCONNECT=0".parse().unwrap()).unwrap();
        assert!(peer.is_closed());
        mux.execute("NOTELNET".parse().unwrap()).unwrap();
        assert!(!mux.is_listening());
    }
}
