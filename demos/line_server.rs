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

//! Four Line Echo Terminal Example
//!
//! This example drives a four-line multiplexer the way a simulator's service
//! loop would:
//! - Listens on port 2323 in buffered mode
//! - Prints a tick counter to every line, connected or not
//! - Echoes whatever a connected user types, upper-cased
//! - Reports a break (`IAC BRK`) received from the client
//!
//! ## Usage
//!
//! Run the server:
//! ```bash
//! cargo run --example line_server
//! ```
//!
//! Connect with a telnet client, disconnect, and connect again to see the
//! buffered history replayed:
//! ```bash
//! telnet localhost 2323
//! ```

use linemux::{MuxConfig, Multiplexer};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let mux = Multiplexer::new(
        MuxConfig::new(4)
            .with_name("TTY")
            .with_simulator_name("Demo"),
    )?;
    let attached = mux.attach("2323, BUFFERED=4096, ORDER=3;1")?;
    println!("Attached to {attached}");
    println!("{}", mux.connection_order());
    println!("Press Ctrl+C to stop the server\n");

    let mut poll = tokio::time::interval(Duration::from_millis(10));
    let mut tick = tokio::time::interval(Duration::from_secs(5));
    let mut ticks = 0u64;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Some(line) = mux.poll_connect() {
                    println!("Line {line} connected ({})", mux.summary());
                }
                mux.poll_receive();
                for line in 0..mux.lines() {
                    while let Some(input) = mux.get(line) {
                        if input.is_break {
                            mux.line_message(line, "\r\n<BREAK>\r\n")?;
                        } else {
                            let _ = mux.put(line, input.byte.to_ascii_uppercase());
                        }
                    }
                }
                mux.poll_transmit();
            }
            _ = tick.tick() => {
                ticks += 1;
                for line in 0..mux.lines() {
                    mux.line_message(line, &format!("tick {ticks}\r\n"))?;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("\n{}", mux.statistics());
    mux.detach();
    println!("Server stopped");
    Ok(())
}
