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

//! Human readable status reports

use crate::error::Result;
use crate::line::LineStatus;
use crate::multiplexer::Multiplexer;
use std::fmt::Write;

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// Connection report for one line.
pub fn format_connection(status: &LineStatus) -> String {
    let mut text = format!("line {}: ", status.index);
    match status.peer {
        Some(peer) => {
            let seconds = status.connected_for.map_or(0, |elapsed| elapsed.as_secs());
            let _ = writeln!(
                text,
                "IP address {}, connected {:02}:{:02}:{:02}",
                peer.ip(),
                seconds / 3600,
                (seconds / 60) % 60,
                seconds % 60
            );
        }
        None => text.push_str("line disconnected\n"),
    }
    if let Some(log) = &status.log {
        let _ = writeln!(text, "Logging to {log}");
    }
    text
}

/// Traffic report for one line.
pub fn format_statistics(status: &LineStatus) -> String {
    let mut text = format!("line {}:\n", status.index);
    if status.peer.is_none() {
        text.push_str("line disconnected\n");
    }
    if status.received > 0 {
        let _ = writeln!(
            text,
            "  input ({}) queued/total = {}/{}",
            on_off(status.receive_enabled),
            status.receive_queued,
            status.received
        );
    }
    let has_output = status.transmitted > 0 || status.buffer_retained > 0;
    if has_output {
        let _ = writeln!(
            text,
            "  output ({}) queued/total = {}/{}",
            on_off(status.transmit_enabled),
            status.transmit_queued,
            status.transmitted
        );
    }
    if let Some(size) = status.buffer_size {
        let _ = writeln!(text, "  output buffer size = {size}");
    }
    if has_output {
        let _ = writeln!(text, "  bytes in buffer = {}", status.buffer_retained);
    }
    if status.dropped > 0 {
        let _ = writeln!(text, "  dropped = {}", status.dropped);
    }
    text
}

impl Multiplexer {
    /// `1 connection` or `N connections`
    pub fn summary(&self) -> String {
        match self.connection_count() {
            1 => "1 connection".to_string(),
            count => format!("{count} connections"),
        }
    }

    /// Connection report for `line`
    pub fn line_connection(&self, line: usize) -> Result<String> {
        Ok(format_connection(&self.line_status(line)?))
    }

    /// Traffic report for `line`
    pub fn line_statistics(&self, line: usize) -> Result<String> {
        Ok(format_statistics(&self.line_status(line)?))
    }

    /// Connection reports for every connected line
    pub fn connections(&self) -> String {
        self.report(format_connection)
    }

    /// Traffic reports for every connected line
    pub fn statistics(&self) -> String {
        self.report(format_statistics)
    }

    fn report(&self, format: fn(&LineStatus) -> String) -> String {
        let statuses = self.line_statuses();
        let text: String = statuses
            .iter()
            .filter(|status| status.peer.is_some())
            .map(format)
            .collect();
        if !text.is_empty() {
            text
        } else if statuses.len() == 1 {
            "disconnected\n".to_string()
        } else {
            "all disconnected\n".to_string()
        }
    }

    /// `lines=N`
    pub fn show_lines(&self) -> String {
        format!("lines={}", self.lines())
    }

    /// `logging to <name>` or `no logging`
    pub fn show_log(&self, line: usize) -> Result<String> {
        Ok(match self.line_status(line)?.log {
            Some(name) => format!("logging to {name}"),
            None => "no logging".to_string(),
        })
    }

    /// `Order=<ranges>`
    pub fn connection_order(&self) -> String {
        format!("Order={}", self.order().describe(self.lines()))
    }
}
