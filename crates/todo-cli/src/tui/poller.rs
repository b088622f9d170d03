//! Background refresh timer for the TUI
//!
//! The remote API does not push changes, so when an interval is configured a
//! task ticks periodically and the main loop refetches on each tick.

use std::time::Duration;

use tokio::sync::mpsc;

/// Commands sent to the poller task
#[derive(Debug)]
pub enum PollerCommand {
    /// Stop the poller task
    Shutdown,
}

/// Events from the poller task
#[derive(Debug, PartialEq, Eq)]
pub enum PollerEvent {
    /// Time to refetch the list
    RefreshDue,
}

/// Handle for controlling the background poller task
pub struct PollerHandle {
    pub command_tx: mpsc::Sender<PollerCommand>,
    pub event_rx: mpsc::Receiver<PollerEvent>,
}

/// Spawn a task that asks for a refresh every `interval`
pub fn spawn_refresh_poller(interval: Duration) -> PollerHandle {
    let (command_tx, command_rx) = mpsc::channel(4);
    let (event_tx, event_rx) = mpsc::channel(4);

    tokio::spawn(refresh_poller_task(interval, command_rx, event_tx));

    PollerHandle {
        command_tx,
        event_rx,
    }
}

async fn refresh_poller_task(
    interval: Duration,
    mut command_rx: mpsc::Receiver<PollerCommand>,
    event_tx: mpsc::Sender<PollerEvent>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                if event_tx.send(PollerEvent::RefreshDue).await.is_err() {
                    break;
                }
            }
            cmd = command_rx.recv() => {
                if matches!(cmd, Some(PollerCommand::Shutdown) | None) {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_poller_ticks_and_stops() {
        let mut handle = spawn_refresh_poller(Duration::from_millis(10));

        let event = tokio::time::timeout(Duration::from_secs(2), handle.event_rx.recv())
            .await
            .unwrap();
        assert_eq!(event, Some(PollerEvent::RefreshDue));

        handle.command_tx.send(PollerCommand::Shutdown).await.unwrap();

        // Drain anything sent before shutdown; the channel then closes
        let closed = tokio::time::timeout(Duration::from_secs(2), async {
            while handle.event_rx.recv().await.is_some() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
