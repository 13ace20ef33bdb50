//! Hostname resolution helpers used by the service host.
//!
//! Resolution failures are not errors here: they yield empty results.

use tokio::net::lookup_host;

/// Resolve `host` to its IP addresses, formatted as strings.
pub async fn lookup_ip(host: &str) -> Vec<String> {
    match lookup_host((host, 0)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip().to_string()).collect(),
        Err(e) => {
            tracing::debug!(host = %host, error = %e, "Host lookup failed");
            Vec::new()
        }
    }
}

/// First resolved IP of `host`, if any.
pub async fn lookup_first_ip(host: &str) -> Option<String> {
    lookup_ip(host).await.into_iter().next()
}

/// First IP of this machine's `$HOSTNAME`.
pub async fn lookup_local_ip() -> Option<String> {
    let hostname = std::env::var("HOSTNAME").ok()?;
    lookup_first_ip(&hostname).await
}
