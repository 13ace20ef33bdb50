//! Address normalisation and TCP reachability probing.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;

use crate::error::ServerError;

/// Address used by HTTP transports when none is given.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:80";

/// Upper bound on a single readiness dial.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Normalise a `host:port` string.
///
/// An empty address falls back to `default` (if any). A missing host
/// (`":8080"`) means all IPv4 interfaces.
pub fn normalize(addr: &str, default: Option<&str>) -> String {
    let addr = addr.trim();
    if addr.is_empty() {
        return default.unwrap_or_default().to_string();
    }
    if addr.starts_with(':') {
        return format!("0.0.0.0{}", addr);
    }
    addr.to_string()
}

/// Pick the address a readiness probe should dial.
///
/// Prefers the bound socket address (so `:0` listeners can be probed) and
/// swaps an unspecified IP for the loopback of the same family.
pub fn probe_target(bound: Option<SocketAddr>, configured: &str) -> String {
    match bound {
        Some(mut addr) => {
            if addr.ip().is_unspecified() {
                let loopback = match addr.ip() {
                    IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                    IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
                };
                addr.set_ip(loopback);
            }
            addr.to_string()
        }
        None => configured.to_string(),
    }
}

/// Open a TCP connection to `addr` and close it immediately.
pub async fn dial(addr: &str) -> Result<(), ServerError> {
    let unreachable = |source: io::Error| ServerError::Unreachable {
        addr: addr.to_string(),
        source,
    };

    match tokio::time::timeout(DIAL_TIMEOUT, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            Ok(())
        }
        Ok(Err(e)) => Err(unreachable(e)),
        Err(_) => Err(unreachable(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no connection within {:?}", DIAL_TIMEOUT),
        ))),
    }
}
