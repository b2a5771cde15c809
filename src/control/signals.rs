//! Bridge from process signals to control loop events
//!
//! On unix `SIGUSR1` and `SIGUSR2` become publish triggers and
//! `SIGINT`/`SIGTERM` cancel the shutdown token. Elsewhere only Ctrl-C is
//! handled.

use std::io;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::Trigger;

/// Hand a trigger to the loop without waiting.
///
/// A trigger that finds the channel full is dropped, matching how pending
/// process signals of the same kind collapse into one.
pub fn offer(tx: &mpsc::Sender<Trigger>, trigger: Trigger) {
    if let Err(e) = tx.try_send(trigger) {
        debug!(%trigger, error = %e, "Publish trigger dropped");
    }
}

/// Install signal handlers and forward them until shutdown.
///
/// # Errors
///
/// Returns the IO error if a handler cannot be registered.
#[cfg(unix)]
pub fn spawn_signal_bridge(
    tx: mpsc::Sender<Trigger>,
    shutdown: CancellationToken,
) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut usr1 = signal(SignalKind::user_defined1())?;
    let mut usr2 = signal(SignalKind::user_defined2())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = usr1.recv() => offer(&tx, Trigger::Canned),
                _ = usr2.recv() => offer(&tx, Trigger::FromFile),
                _ = interrupt.recv() => {
                    println!("Received signal: interrupt");
                    info!(signal = "SIGINT", "Shutdown requested");
                    shutdown.cancel();
                }
                _ = terminate.recv() => {
                    println!("Received signal: terminated");
                    info!(signal = "SIGTERM", "Shutdown requested");
                    shutdown.cancel();
                }
            }
        }
    }))
}

/// Install the Ctrl-C handler and forward it until shutdown.
///
/// # Errors
///
/// Never fails on this platform; the signature matches the unix variant.
#[cfg(not(unix))]
pub fn spawn_signal_bridge(
    tx: mpsc::Sender<Trigger>,
    shutdown: CancellationToken,
) -> io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        let _tx = tx;
        tokio::select! {
            _ = shutdown.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    println!("Received signal: interrupt");
                    info!(signal = "ctrl-c", "Shutdown requested");
                }
                shutdown.cancel();
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offer_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);

        offer(&tx, Trigger::Canned);
        offer(&tx, Trigger::FromFile);

        assert_eq!(rx.recv().await, Some(Trigger::Canned));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_bridge_stops_on_shutdown() {
        let (tx, _rx) = mpsc::channel(1);
        let shutdown = CancellationToken::new();

        let handle = spawn_signal_bridge(tx, shutdown.clone()).unwrap();
        shutdown.cancel();
        handle.await.unwrap();
    }
}
