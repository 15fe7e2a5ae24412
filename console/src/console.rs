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

//! Simulator console terminal
//!
//! The console is either the local window (keyboard plus writer) or, once a
//! master port is opened with `SET CONSOLE TELNET=<port>`, line 0 of a
//! one-line [`Multiplexer`]. In Telnet mode the local keyboard still
//! delivers the interrupt and break characters.

use crate::convert::{DEFAULT_PCHAR, REQUIRED_PCHAR, TerminalFlags, output_convert};
use crate::error::{ConsoleError, Result};
use crate::keyboard::{Key, KeyEvent, KeyMap, Keyboard};
use crate::watcher::{KeyWatcher, StopSignal};
use linemux::{
    LogRegistry, MuxCommand, MuxConfig, MuxError, Multiplexer, match_keyword, split_argument,
};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Device name of the console line
pub const CONSOLE_DEVICE: &str = "console";

/// Seconds between "waiting" announcements
const WAIT_REPORT_INTERVAL: u32 = 10;

/// Keys a watcher may queue ahead of the simulator
const TYPEAHEAD: usize = 64;

/// Input read from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    /// A character
    Char(u8),
    /// A break condition
    Break,
    /// The interrupt character was typed on the local keyboard
    Stop,
}

impl From<KeyEvent> for ConsoleInput {
    fn from(event: KeyEvent) -> Self {
        match event {
            KeyEvent::Char(byte) => ConsoleInput::Char(byte),
            KeyEvent::Break => ConsoleInput::Break,
            KeyEvent::Interrupt => ConsoleInput::Stop,
        }
    }
}

#[derive(Clone, Copy)]
enum Setting {
    Key(Key),
    PChar,
    Telnet,
    NoTelnet,
    Log,
    NoLog,
    Debug,
    NoDebug,
}

const SETTINGS: &[(&str, Setting)] = &[
    ("WRU", Setting::Key(Key::Interrupt)),
    ("BRK", Setting::Key(Key::Break)),
    ("DEL", Setting::Key(Key::Delete)),
    ("PCHAR", Setting::PChar),
    ("TELNET", Setting::Telnet),
    ("NOTELNET", Setting::NoTelnet),
    ("LOG", Setting::Log),
    ("NOLOG", Setting::NoLog),
    ("DEBUG", Setting::Debug),
    ("NODEBUG", Setting::NoDebug),
];

#[derive(Clone, Copy)]
enum Report {
    Key(Key),
    PChar,
    Log,
    Telnet,
    Debug,
    Buffered,
}

const REPORTS: &[(&str, Report)] = &[
    ("WRU", Report::Key(Key::Interrupt)),
    ("BRK", Report::Key(Key::Break)),
    ("DEL", Report::Key(Key::Delete)),
    ("PCHAR", Report::PChar),
    ("LOG", Report::Log),
    ("TELNET", Report::Telnet),
    ("DEBUG", Report::Debug),
    ("BUFFERED", Report::Buffered),
];

fn required<'a>(keyword: &'static str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or(ConsoleError::Mux(MuxError::MissingValue(keyword)))
}

fn no_value(keyword: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => Err(MuxError::UnexpectedArgument(format!("{keyword}={value}")).into()),
        None => Ok(()),
    }
}

/// Simulator console terminal
pub struct Console {
    mux: Arc<Multiplexer>,
    keyboard: Option<Box<dyn Keyboard>>,
    window: Option<Box<dyn Write + Send>>,
    keys: KeyMap,
    pchar: u32,
    stop: StopSignal,
    typeahead: mpsc::Receiver<KeyEvent>,
    typeahead_sender: mpsc::Sender<KeyEvent>,
}

impl Console {
    /// Create a window console with its own log registry.
    pub fn new(simulator_name: impl Into<String>) -> Result<Self> {
        Self::with_registry(simulator_name, Arc::new(LogRegistry::new()))
    }

    /// Create a window console sharing `registry` for `LOG`/`DEBUG`.
    pub fn with_registry(
        simulator_name: impl Into<String>,
        registry: Arc<LogRegistry>,
    ) -> Result<Self> {
        let mux = Multiplexer::new(
            MuxConfig::new(1)
                .with_name(CONSOLE_DEVICE)
                .with_simulator_name(simulator_name)
                .with_log_registry(registry),
        )?;
        let (typeahead_sender, typeahead) = mpsc::channel(TYPEAHEAD);
        Ok(Self {
            mux: Arc::new(mux),
            keyboard: None,
            window: None,
            keys: KeyMap::default(),
            pchar: DEFAULT_PCHAR,
            stop: StopSignal::new(),
            typeahead,
            typeahead_sender,
        })
    }

    /// Attach a local keyboard
    pub fn with_keyboard(mut self, keyboard: impl Keyboard + 'static) -> Self {
        self.keyboard = Some(Box::new(keyboard));
        self
    }

    /// Attach a local window writer
    pub fn with_window(mut self, window: impl Write + Send + 'static) -> Self {
        self.window = Some(Box::new(window));
        self
    }

    /// The one-line console multiplexer
    pub fn multiplexer(&self) -> &Arc<Multiplexer> {
        &self.mux
    }

    /// Current key bindings
    pub fn keys(&self) -> KeyMap {
        self.keys
    }

    /// Printable control character mask
    pub fn pchar(&self) -> u32 {
        self.pchar
    }

    /// Stop signal raised by the interrupt character
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Returns `true` when the console is attached to a Telnet port
    pub fn is_telnet(&self) -> bool {
        self.mux.is_listening()
    }

    /// Convert an output character using this console's printable mask.
    pub fn convert_output(&self, byte: u8, flags: TerminalFlags) -> Option<u8> {
        output_convert(byte, flags, self.pchar)
    }

    /// Hand the local keyboard to a background watcher thread.
    ///
    /// The watcher queues keys that [`poll_keyboard`](Self::poll_keyboard)
    /// picks up. Returns `None` when there is no local keyboard.
    pub fn watch_keyboard(&mut self) -> Result<Option<KeyWatcher>> {
        let Some(keyboard) = self.keyboard.take() else {
            return Ok(None);
        };
        let watcher = KeyWatcher::spawn(
            keyboard,
            self.keys,
            self.mux.clone(),
            self.typeahead_sender.clone(),
            self.stop.clone(),
        )?;
        Ok(Some(watcher))
    }

    /// Stop a watcher and take the keyboard back.
    pub fn restore_keyboard(&mut self, watcher: KeyWatcher) {
        if let Some(keyboard) = watcher.stop() {
            self.keyboard = Some(keyboard);
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Poll for one console character.
    ///
    /// The local keyboard is checked first; its interrupt character yields
    /// [`ConsoleInput::Stop`]. Keys queued by a watcher come next. In Telnet
    /// mode local characters other than break are ignored and input comes
    /// from the console line instead.
    pub fn poll_keyboard(&mut self) -> Result<Option<ConsoleInput>> {
        let telnet = self.is_telnet();
        if let Some(byte) = self.poll_local()? {
            match self.keys.classify(byte) {
                KeyEvent::Interrupt => {
                    self.stop.request();
                    return Ok(Some(ConsoleInput::Stop));
                }
                KeyEvent::Break => return Ok(Some(ConsoleInput::Break)),
                KeyEvent::Char(byte) if !telnet => return Ok(Some(ConsoleInput::Char(byte))),
                _ => {}
            }
        }
        if let Ok(event) = self.typeahead.try_recv() {
            return Ok(Some(event.into()));
        }
        if !telnet {
            return Ok(None);
        }
        if !self.mux.is_connected(0) {
            if self.mux.buffer_size().is_none() {
                return Err(ConsoleError::Lost);
            }
            if self.mux.poll_connect().is_none() {
                return Ok(None);
            }
        }
        self.mux.poll_receive();
        Ok(self.mux.get(0).map(|input| {
            if input.is_break {
                ConsoleInput::Break
            } else {
                ConsoleInput::Char(input.byte)
            }
        }))
    }

    fn poll_local(&mut self) -> Result<Option<u8>> {
        match self.keyboard.as_mut() {
            Some(keyboard) => Ok(keyboard.poll_keyboard()?),
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Write one character; Telnet output never stalls.
    pub fn put_char(&mut self, byte: u8) -> Result<()> {
        if !self.is_telnet() {
            return self.put_window(byte);
        }
        self.copy_to_log(byte);
        self.ensure_line()?;
        let _ = self.mux.put(0, byte);
        self.mux.poll_transmit();
        Ok(())
    }

    /// Write one character, reporting [`ConsoleError::Stall`] while Telnet
    /// transmit is backed up.
    pub fn put_char_stall(&mut self, byte: u8) -> Result<()> {
        if !self.is_telnet() {
            return self.put_window(byte);
        }
        self.copy_to_log(byte);
        self.ensure_line()?;
        let result = if self.mux.transmit_enabled(0) {
            self.mux.put(0, byte).map_err(ConsoleError::from_output)
        } else {
            Err(ConsoleError::Stall)
        };
        self.mux.poll_transmit();
        result
    }

    fn put_window(&mut self, byte: u8) -> Result<()> {
        if let Some(log) = self.mux.log_registry().log() {
            log.write_byte(byte);
        }
        if let Some(window) = self.window.as_mut() {
            window.write_all(&[byte])?;
            window.flush()?;
        }
        Ok(())
    }

    fn copy_to_log(&self, byte: u8) {
        let Some(log) = self.mux.log_registry().log() else {
            return;
        };
        let transcript = self
            .mux
            .line_status(0)
            .is_ok_and(|status| status.log.is_some());
        if !transcript {
            log.write_byte(byte);
        }
    }

    /// A disconnected unbuffered line is lost; a buffered one gets a
    /// chance to pick up a waiting connection.
    fn ensure_line(&self) -> Result<()> {
        if self.mux.is_connected(0) {
            return Ok(());
        }
        if self.mux.buffer_size().is_none() {
            return Err(ConsoleError::Lost);
        }
        let _ = self.mux.poll_connect();
        Ok(())
    }

    fn announce(&mut self, message: &str) {
        info!("{}", message);
        if let Some(window) = self.window.as_mut() {
            let _ = write!(window, "{message}\r\n");
            let _ = window.flush();
        }
        if let Some(log) = self.mux.log_registry().log() {
            log.write_all(format!("{message}\n").as_bytes());
            log.flush();
        }
    }

    // ------------------------------------------------------------------
    // Run gate
    // ------------------------------------------------------------------

    /// Make sure a Telnet console has somewhere to go before running.
    ///
    /// Window consoles and connected or buffered Telnet consoles pass at
    /// once. Otherwise a connection is polled for once per second for up to
    /// `seconds` seconds.
    pub async fn wait_for_connection(
        &mut self,
        seconds: u32,
        stop: &CancellationToken,
    ) -> Result<()> {
        if !self.is_telnet() {
            return Ok(());
        }
        if self.mux.is_connected(0) || self.mux.buffer_size().is_some() {
            self.mux.poll_receive();
            if !self.mux.is_connected(0) {
                self.announce("Running with Buffered Console");
            }
            return Ok(());
        }
        for second in 0..seconds {
            if self.mux.poll_connect().is_some() {
                if second > 0 {
                    self.announce("Running");
                }
                return Ok(());
            }
            if stop.is_cancelled() || self.local_interrupt()? {
                return Err(ConsoleError::Stopped);
            }
            if second % WAIT_REPORT_INTERVAL == 0 {
                self.announce("Waiting for console Telnet connection");
            }
            tokio::select! {
                _ = stop.cancelled() => return Err(ConsoleError::Stopped),
                _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            }
        }
        Err(ConsoleError::TimedOut)
    }

    fn local_interrupt(&mut self) -> Result<bool> {
        let interrupted = self
            .poll_local()?
            .is_some_and(|byte| self.keys.classify(byte) == KeyEvent::Interrupt);
        if interrupted {
            self.stop.request();
        }
        Ok(interrupted)
    }

    // ------------------------------------------------------------------
    // SET CONSOLE
    // ------------------------------------------------------------------

    /// Apply a comma-separated list of console settings.
    ///
    /// Settings before a failing one stay applied.
    pub fn set(&mut self, args: &str) -> Result<()> {
        if args.trim().is_empty() {
            return Err(MuxError::MissingValue("CONSOLE").into());
        }
        for argument in args.split(',').map(str::trim).filter(|arg| !arg.is_empty()) {
            let (keyword, value) = split_argument(argument);
            let setting = match_keyword(SETTINGS, keyword)
                .ok_or_else(|| ConsoleError::UnknownKeyword(keyword.to_string()))?;
            self.apply(setting, keyword, value)?;
        }
        Ok(())
    }

    fn apply(&mut self, setting: Setting, keyword: &str, value: Option<&str>) -> Result<()> {
        match setting {
            Setting::Key(key) => self.keys.set(key, required(key.keyword(), value)?),
            Setting::PChar => self.set_pchar(required("PCHAR", value)?),
            Setting::Telnet => self.set_telnet(required("TELNET", value)?),
            Setting::NoTelnet => {
                no_value(keyword, value)?;
                self.mux.close_master();
                Ok(())
            }
            Setting::Log => self.open_log(required("LOG", value)?),
            Setting::NoLog => {
                no_value(keyword, value)?;
                self.close_log();
                Ok(())
            }
            Setting::Debug => self.open_debug(required("DEBUG", value)?),
            Setting::NoDebug => {
                no_value(keyword, value)?;
                self.close_debug();
                Ok(())
            }
        }
    }

    fn set_pchar(&mut self, value: &str) -> Result<()> {
        let mask = u32::from_str_radix(value.trim(), 8)
            .ok()
            .filter(|mask| mask & REQUIRED_PCHAR != 0)
            .ok_or_else(|| ConsoleError::validation(format!("PCHAR={value}")))?;
        self.pchar = mask;
        debug!(pchar = mask, "Printable character mask");
        Ok(())
    }

    fn set_telnet(&mut self, value: &str) -> Result<()> {
        let command: MuxCommand = value.parse()?;
        match command {
            MuxCommand::Listen(_)
            | MuxCommand::Log(_)
            | MuxCommand::NoLog
            | MuxCommand::Buffered(_)
            | MuxCommand::Unbuffered => Ok(self.mux.execute(command)?),
            _ => Err(ConsoleError::UnknownKeyword(value.to_string())),
        }
    }

    fn open_log(&mut self, name: &str) -> Result<()> {
        self.close_log();
        let registry = self.mux.log_registry();
        let handle = registry.open(name)?;
        let message = format!("Logging to file \"{}\"", handle.name());
        info!("{}", message);
        handle.write_all(format!("{message}\n").as_bytes());
        registry.set_log(Some(handle));
        Ok(())
    }

    fn close_log(&mut self) {
        if let Some(log) = self.mux.log_registry().set_log(None) {
            info!("Log file closed");
            log.write_all(b"Log file closed\n");
        }
    }

    fn open_debug(&mut self, name: &str) -> Result<()> {
        let registry = self.mux.log_registry();
        let handle = registry.open(name)?;
        let message = format!("Debug output to \"{}\"", handle.name());
        registry.set_debug(Some(handle));
        self.record(&message);
        Ok(())
    }

    fn close_debug(&mut self) {
        if self.mux.log_registry().set_debug(None).is_some() {
            self.record("Debug output disabled");
        }
    }

    fn record(&self, message: &str) {
        info!("{}", message);
        if let Some(log) = self.mux.log_registry().log() {
            log.write_all(format!("{message}\n").as_bytes());
        }
    }

    // ------------------------------------------------------------------
    // SHOW CONSOLE
    // ------------------------------------------------------------------

    /// Reports for a comma-separated list of console items, or all of them
    /// when `args` is empty.
    pub fn show(&self, args: &str) -> Result<String> {
        if args.trim().is_empty() {
            return Ok(REPORTS.iter().map(|&(_, report)| self.report(report)).collect());
        }
        args.split(',')
            .map(str::trim)
            .filter(|arg| !arg.is_empty())
            .map(|item| {
                match_keyword(REPORTS, item)
                    .map(|report| self.report(report))
                    .ok_or_else(|| ConsoleError::UnknownKeyword(item.to_string()))
            })
            .collect()
    }

    fn report(&self, report: Report) -> String {
        match report {
            Report::Key(key) => format!("{} = {:o}\n", key.keyword(), self.keys.get(key)),
            Report::PChar => self.show_pchar(),
            Report::Log => self.show_log(),
            Report::Telnet => self.show_telnet(),
            Report::Debug => self.show_debug(),
            Report::Buffered => self.show_buffered(),
        }
    }

    /// Where the console is attached, with line reports in Telnet mode
    pub fn show_telnet(&self) -> String {
        let Some(address) = self.mux.local_addr() else {
            return "Connected to console window\n".to_string();
        };
        let status = self.mux.line_status(0).ok();
        let mut text = match status.as_ref().and_then(|status| status.peer) {
            Some(peer) => format!(
                "Listening on port {}, connected to {}\n",
                address.port(),
                peer
            ),
            None => format!("Listening on port {}\n", address.port()),
        };
        if let Some(status) = &status {
            if status.peer.is_some() {
                text.push_str(&linemux::format_connection(status));
            }
            text.push_str(&linemux::format_statistics(status));
        }
        text
    }

    /// Transcript log of the console line
    pub fn show_log(&self) -> String {
        match self.mux.line_status(0).ok().and_then(|status| status.log) {
            Some(name) => format!("Log File being written to {name}\n"),
            None => "No Logging\n".to_string(),
        }
    }

    /// Debug output target
    pub fn show_debug(&self) -> String {
        match self.mux.log_registry().debug() {
            Some(handle) => format!("Debug output enabled to \"{}\"\n", handle.name()),
            None => "Debug output disabled\n".to_string(),
        }
    }

    /// Buffered mode of the console line
    pub fn show_buffered(&self) -> String {
        match self.mux.buffer_size() {
            Some(size) => format!("Buffer Size = {size}\n"),
            None => "Unbuffered\n".to_string(),
        }
    }

    /// Key bindings, in octal
    pub fn show_kmap(&self) -> String {
        self.keys.describe()
    }

    /// Printable character mask, in octal
    pub fn show_pchar(&self) -> String {
        format!("pchar mask = {:o}\n", self.pchar)
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("mux", &self.mux)
            .field("keyboard", &self.keyboard.is_some())
            .field("window", &self.window.is_some())
            .field("keys", &self.keys)
            .field("pchar", &self.pchar)
            .field("typeahead", &self.typeahead.len())
            .finish()
    }
}
