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

//! Non-blocking socket primitives consumed by the multiplexer
//!
//! The multiplexer never blocks, so every operation here either completes
//! immediately or reports that it would have blocked. [`TcpMaster`] and
//! [`TcpConnection`] implement the traits over `std::net` sockets switched to
//! non-blocking mode.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};

/// Outcome of a non-blocking transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// This many bytes moved
    Bytes(usize),
    /// Nothing could move without blocking
    WouldBlock,
    /// Peer closed the connection
    Closed,
}

/// A connected byte stream
pub trait Connection: Send + fmt::Debug {
    /// Read whatever is available into `buf`.
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<Transfer>;

    /// Write as much of `buf` as the stream accepts.
    fn write_nonblocking(&mut self, buf: &[u8]) -> io::Result<Transfer>;

    /// Shut the stream down. Errors are ignored.
    fn close(&mut self);
}

/// A listening socket producing connections
pub trait Listener: Send + fmt::Debug {
    /// Accept one pending connection, if any.
    fn accept_nonblocking(&mut self) -> io::Result<Option<(Box<dyn Connection>, SocketAddr)>>;

    /// Address the listener is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// Non-blocking TCP listener bound to all interfaces
#[derive(Debug)]
pub struct TcpMaster {
    listener: TcpListener,
}

impl TcpMaster {
    /// Bind `0.0.0.0:port`. Port 0 picks an ephemeral port.
    pub fn bind(port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener })
    }
}

impl Listener for TcpMaster {
    fn accept_nonblocking(&mut self) -> io::Result<Option<(Box<dyn Connection>, SocketAddr)>> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                let connection = TcpConnection::new(stream)?;
                Ok(Some((Box::new(connection), peer)))
            }
            Err(err) if would_block(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Non-blocking TCP stream
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl TcpConnection {
    /// Wrap an accepted stream, switching it to non-blocking mode.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }
}

impl Connection for TcpConnection {
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> io::Result<Transfer> {
        match self.stream.read(buf) {
            Ok(0) if !buf.is_empty() => Ok(Transfer::Closed),
            Ok(count) => Ok(Transfer::Bytes(count)),
            Err(err) if would_block(&err) => Ok(Transfer::WouldBlock),
            Err(err) if err.kind() == io::ErrorKind::ConnectionReset => Ok(Transfer::Closed),
            Err(err) => Err(err),
        }
    }

    fn write_nonblocking(&mut self, buf: &[u8]) -> io::Result<Transfer> {
        match self.stream.write(buf) {
            Ok(count) => Ok(Transfer::Bytes(count)),
            Err(err) if would_block(&err) => Ok(Transfer::WouldBlock),
            Err(err) => Err(err),
        }
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

fn would_block(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
