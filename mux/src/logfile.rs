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

//! Shared transcript log handles
//!
//! A [`LogHandle`] is a reference-counted writer. Cloning it shares the
//! underlying target and the target is flushed and closed when the last clone
//! is dropped. The [`LogRegistry`] holds the process-wide `LOG` and `DEBUG`
//! targets so that lines asking for those keywords share them instead of
//! opening files of that name.

use crate::error::{MuxError, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const FILE_BUFFER_SIZE: usize = 65536;

enum Sink {
    Stdout,
    Stderr,
    File(BufWriter<File>),
    Writer(Box<dyn Write + Send>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout => io::stdout().write(buf),
            Sink::Stderr => io::stderr().write(buf),
            Sink::File(file) => file.write(buf),
            Sink::Writer(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            Sink::File(file) => file.flush(),
            Sink::Writer(writer) => writer.flush(),
        }
    }
}

struct LogTarget {
    name: String,
    sink: Mutex<Sink>,
}

/// Reference-counted log target
#[derive(Clone)]
pub struct LogHandle {
    target: Arc<LogTarget>,
}

impl LogHandle {
    fn with_sink(name: impl Into<String>, sink: Sink) -> Self {
        Self {
            target: Arc::new(LogTarget {
                name: name.into(),
                sink: Mutex::new(sink),
            }),
        }
    }

    /// Process standard output
    pub fn stdout() -> Self {
        Self::with_sink("STDOUT", Sink::Stdout)
    }

    /// Process standard error
    pub fn stderr() -> Self {
        Self::with_sink("STDERR", Sink::Stderr)
    }

    /// Open `path` for appending, creating it when missing.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| MuxError::open(path.display().to_string(), source))?;
        debug!("Opened log file {}", path.display());
        Ok(Self::with_sink(
            path.display().to_string(),
            Sink::File(BufWriter::with_capacity(FILE_BUFFER_SIZE, file)),
        ))
    }

    /// Wrap an arbitrary writer under a display name.
    pub fn from_writer(name: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self::with_sink(name, Sink::Writer(Box::new(writer)))
    }

    /// Name shown by status queries.
    pub fn name(&self) -> &str {
        &self.target.name
    }

    /// Number of live handles sharing this target.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.target)
    }

    /// Returns `true` when both handles share one target.
    pub fn same_target(&self, other: &LogHandle) -> bool {
        Arc::ptr_eq(&self.target, &other.target)
    }

    /// Append one byte. Write failures are reported and otherwise ignored.
    pub fn write_byte(&self, byte: u8) {
        self.write_all(&[byte]);
    }

    /// Append bytes. Write failures are reported and otherwise ignored.
    pub fn write_all(&self, bytes: &[u8]) {
        if let Err(err) = self.sink().write_all(bytes) {
            debug!("Write to log {} failed: {}", self.name(), err);
        }
    }

    /// Push buffered output to the target.
    pub fn flush(&self) {
        if let Err(err) = self.sink().flush() {
            debug!("Flush of log {} failed: {}", self.name(), err);
        }
    }

    fn sink(&self) -> MutexGuard<'_, Sink> {
        self.target
            .sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHandle")
            .field("name", &self.target.name)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

impl Drop for LogTarget {
    fn drop(&mut self) {
        let sink = self
            .sink
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = sink.flush();
    }
}

/// Process-wide `LOG` and `DEBUG` targets
#[derive(Debug, Default)]
pub struct LogRegistry {
    log: Mutex<Option<LogHandle>>,
    debug: Mutex<Option<LogHandle>>,
}

impl LogRegistry {
    /// Create a registry with neither target set
    pub fn new() -> Self {
        Self::default()
    }

    /// Current `LOG` target
    pub fn log(&self) -> Option<LogHandle> {
        lock(&self.log).clone()
    }

    /// Current `DEBUG` target
    pub fn debug(&self) -> Option<LogHandle> {
        lock(&self.debug).clone()
    }

    /// Replace the `LOG` target, returning the previous one.
    pub fn set_log(&self, handle: Option<LogHandle>) -> Option<LogHandle> {
        std::mem::replace(&mut *lock(&self.log), handle)
    }

    /// Replace the `DEBUG` target, returning the previous one.
    pub fn set_debug(&self, handle: Option<LogHandle>) -> Option<LogHandle> {
        std::mem::replace(&mut *lock(&self.debug), handle)
    }

    /// Resolve a log name or keyword to a handle.
    ///
    /// `LOG` and `DEBUG` share the registered targets, `STDOUT` and `STDERR`
    /// route to the process streams and anything else is opened as a file.
    pub fn open(&self, name: &str) -> Result<LogHandle> {
        match name.to_ascii_uppercase().as_str() {
            "LOG" => self
                .log()
                .ok_or_else(|| MuxError::validation("no LOG target is open")),
            "DEBUG" => self
                .debug()
                .ok_or_else(|| MuxError::validation("no DEBUG target is open")),
            "STDOUT" => Ok(LogHandle::stdout()),
            "STDERR" => Ok(LogHandle::stderr()),
            _ => LogHandle::open_file(name),
        }
    }
}

fn lock(slot: &Mutex<Option<LogHandle>>) -> MutexGuard<'_, Option<LogHandle>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory log writer for tests
#[cfg(test)]
pub(crate) mod capture {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        pub fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
