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

//! Background keyboard watcher
//!
//! While the simulator runs, the local keyboard is watched from its own OS
//! thread because keyboard polling is a non-blocking but synchronous
//! capability. Keys travel to the console through a bounded typeahead
//! queue that [`Console::poll_keyboard`](crate::Console::poll_keyboard)
//! drains.

use crate::keyboard::{KeyEvent, KeyMap, Keyboard};
use linemux::Multiplexer;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Keyboard polling period of the watcher thread
pub const WATCH_INTERVAL: Duration = Duration::from_millis(10);

/// Re-armable stop request shared between the console, its watcher and the
/// simulator's run loop.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: Arc<Mutex<CancellationToken>>,
}

impl StopSignal {
    /// Create an un-triggered stop signal
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> MutexGuard<'_, CancellationToken> {
        self.token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Token for the current run; cancelled when a stop is requested.
    pub fn token(&self) -> CancellationToken {
        self.current().clone()
    }

    /// Request a stop
    pub fn request(&self) {
        self.current().cancel();
    }

    /// Returns `true` once a stop was requested for the current run
    pub fn is_requested(&self) -> bool {
        self.current().is_cancelled()
    }

    /// Start a new run. Tokens handed out earlier stay cancelled.
    pub fn rearm(&self) -> CancellationToken {
        let mut current = self.current();
        if current.is_cancelled() {
            *current = CancellationToken::new();
        }
        current.clone()
    }
}

/// Thread watching the local keyboard.
///
/// Interrupt requests a stop. Break is always queued as typeahead. Ordinary
/// characters are queued only while the console is not on a Telnet port,
/// where the Telnet line is the input path. Dropping the watcher stops and
/// joins the thread.
#[derive(Debug)]
pub struct KeyWatcher {
    shutdown: CancellationToken,
    handle: Option<JoinHandle<Box<dyn Keyboard>>>,
}

impl KeyWatcher {
    /// Spawn the watcher thread.
    pub fn spawn(
        mut keyboard: Box<dyn Keyboard>,
        keys: KeyMap,
        mux: Arc<Multiplexer>,
        typeahead: mpsc::Sender<KeyEvent>,
        stop: StopSignal,
    ) -> std::io::Result<Self> {
        let shutdown = CancellationToken::new();
        let running = shutdown.clone();
        let handle = thread::Builder::new()
            .name("console-keyboard".to_string())
            .spawn(move || {
                debug!("Keyboard watcher started");
                while !running.is_cancelled() {
                    match keyboard.poll_keyboard() {
                        Ok(Some(byte)) => match keys.classify(byte) {
                            KeyEvent::Interrupt => stop.request(),
                            KeyEvent::Char(byte) if mux.is_listening() => {
                                trace!(byte, "Ignored local key");
                            }
                            event => {
                                if let Err(err) = typeahead.try_send(event) {
                                    warn!("Console typeahead dropped key: {}", err);
                                }
                            }
                        },
                        Ok(None) => thread::sleep(WATCH_INTERVAL),
                        Err(err) => {
                            warn!("Keyboard poll failed: {}", err);
                            break;
                        }
                    }
                }
                debug!("Keyboard watcher stopped");
                keyboard
            })?;
        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }

    /// Stop the thread and hand the keyboard back.
    pub fn stop(mut self) -> Option<Box<dyn Keyboard>> {
        self.join()
    }

    fn join(&mut self) -> Option<Box<dyn Keyboard>> {
        self.shutdown.cancel();
        self.handle.take()?.join().ok()
    }
}

impl Drop for KeyWatcher {
    fn drop(&mut self) {
        let _ = self.join();
    }
}
