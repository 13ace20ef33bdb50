//! OS signal handling.
//!
//! # Responsibilities
//! - Block until any one of a set of signals arrives
//! - Provide the SIGINT/SIGTERM wait used by the service host

#[cfg(unix)]
pub use tokio::signal::unix::SignalKind;

/// Wait for any of `kinds`. Returns `Ok(None)` immediately for an empty set.
#[cfg(unix)]
pub async fn wait_for_any(kinds: &[SignalKind]) -> std::io::Result<Option<SignalKind>> {
    use futures_util::future::select_all;
    use tokio::signal::unix::signal;

    if kinds.is_empty() {
        return Ok(None);
    }

    let mut streams = kinds
        .iter()
        .map(|kind| signal(*kind))
        .collect::<Result<Vec<_>, _>>()?;

    let waits = streams
        .iter_mut()
        .zip(kinds.iter().copied())
        .map(|(stream, kind)| {
            Box::pin(async move {
                stream.recv().await;
                kind
            })
        });

    let (kind, _, _) = select_all(waits).await;
    tracing::info!(signal = ?kind, "Signal received");
    Ok(Some(kind))
}

/// Wait for SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    wait_for_any(&[SignalKind::interrupt(), SignalKind::terminate()]).await?;
    Ok(())
}

/// Wait for Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl+C received");
    Ok(())
}
