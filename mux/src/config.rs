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

//! Multiplexer configuration

use crate::error::{MuxError, Result};
use crate::logfile::LogRegistry;
use std::sync::Arc;

/// Receive and transmit ring capacity of an unbuffered line
pub const DEFAULT_CAPACITY: usize = 256;

/// Headroom below which transmit is disabled and receive reads are capped
pub const DEFAULT_GUARD: usize = 12;

/// Transmit ring size used by `BUFFERED` without a value
pub const DEFAULT_BUFFER_SIZE: usize = 32768;

/// Largest accepted buffered transmit ring
pub const MAX_BUFFER_SIZE: usize = 1_048_576;

/// Multiplexer configuration
///
/// Use the builder methods to customize the configuration.
///
/// # Example
///
/// ```
/// use linemux::MuxConfig;
///
/// let config = MuxConfig::new(4)
///     .with_name("TTY")
///     .with_simulator_name("PDP-11")
///     .with_buffer_size(Some(4096));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MuxConfig {
    /// Number of lines, fixed for the multiplexer's lifetime
    pub lines: usize,

    /// Device name used in connect banners and traces
    pub name: String,

    /// Simulator name used in connect and disconnect banners
    pub simulator_name: String,

    /// Receive ring capacity per line
    pub receive_capacity: usize,

    /// Transmit ring capacity per unbuffered line
    pub transmit_capacity: usize,

    /// Transmit headroom that disables output, and receive read reserve
    pub guard: usize,

    /// Buffered transmit ring size; `None` leaves lines unbuffered
    pub buffer_size: Option<usize>,

    /// Per-line transcript log name template
    ///
    /// Line `n` logs to `<template>_<n>`, or to `<template>` itself when the
    /// multiplexer has a single line.
    pub log_template: Option<String>,

    /// Targets for the `LOG` and `DEBUG` log keywords
    pub log_registry: Arc<LogRegistry>,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            lines: 1,
            name: "TTY".to_string(),
            simulator_name: "linemux".to_string(),
            receive_capacity: DEFAULT_CAPACITY,
            transmit_capacity: DEFAULT_CAPACITY,
            guard: DEFAULT_GUARD,
            buffer_size: None,
            log_template: None,
            log_registry: Arc::new(LogRegistry::new()),
        }
    }
}

impl MuxConfig {
    /// Create a configuration for `lines` lines
    ///
    /// All other settings will use their default values.
    pub fn new(lines: usize) -> Self {
        Self {
            lines,
            ..Default::default()
        }
    }

    /// Set the device name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the simulator name
    pub fn with_simulator_name(mut self, name: impl Into<String>) -> Self {
        self.simulator_name = name.into();
        self
    }

    /// Set the receive ring capacity
    pub fn with_receive_capacity(mut self, capacity: usize) -> Self {
        self.receive_capacity = capacity;
        self
    }

    /// Set the unbuffered transmit ring capacity
    pub fn with_transmit_capacity(mut self, capacity: usize) -> Self {
        self.transmit_capacity = capacity;
        self
    }

    /// Set the guard headroom
    pub fn with_guard(mut self, guard: usize) -> Self {
        self.guard = guard;
        self
    }

    /// Start lines in buffered mode with the given ring size
    pub fn with_buffer_size(mut self, size: Option<usize>) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the per-line log template
    pub fn with_log_template(mut self, template: impl Into<String>) -> Self {
        self.log_template = Some(template.into());
        self
    }

    /// Share a log registry with other multiplexers
    pub fn with_log_registry(mut self, registry: Arc<LogRegistry>) -> Self {
        self.log_registry = registry;
        self
    }

    /// Validate the configuration
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.lines == 0 {
            return Err(MuxError::validation("lines must be greater than 0"));
        }

        if self.receive_capacity <= self.guard {
            return Err(MuxError::validation(
                "receive_capacity must be greater than guard",
            ));
        }

        if self.transmit_capacity <= self.guard {
            return Err(MuxError::validation(
                "transmit_capacity must be greater than guard",
            ));
        }

        if let Some(size) = self.buffer_size {
            validate_buffer_size(size)?;
        }

        Ok(())
    }
}

/// Check a buffered transmit ring size.
pub fn validate_buffer_size(size: usize) -> Result<usize> {
    if (1..=MAX_BUFFER_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(MuxError::validation(format!(
            "buffer size {size} must be between 1 and {MAX_BUFFER_SIZE}"
        )))
    }
}
