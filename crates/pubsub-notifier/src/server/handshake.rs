//! Plugin handshake line.
//!
//! The host launches the relay as a child process and reads exactly one line
//! from its stdout to learn where to connect:
//! `<core protocol>|<app protocol>|<network>|<address>|<protocol>`.

use std::io::{self, Write};
use std::net::SocketAddr;

/// Version of the host's plugin wire protocol.
pub const CORE_PROTOCOL_VERSION: u32 = 1;

/// Version of the notifier application contract.
pub const APP_PROTOCOL_VERSION: u32 = 1;

pub fn handshake_line(addr: SocketAddr) -> String {
    format!("{CORE_PROTOCOL_VERSION}|{APP_PROTOCOL_VERSION}|tcp|{addr}|grpc")
}

/// Write the handshake line to stdout and flush it.
pub fn announce(addr: SocketAddr) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", handshake_line(addr))?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_names_tcp_address_and_grpc() {
        let addr: SocketAddr = ([127, 0, 0, 1], 41234).into();
        assert_eq!(handshake_line(addr), "1|1|tcp|127.0.0.1:41234|grpc");
    }
}
