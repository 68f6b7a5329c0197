use crate::core::Route;
use crate::playback::clock::TokioClock;
use crate::playback::{PlaybackCommand, PlaybackEngine, PlaybackSnapshot};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Queue depth for commands from the presentation layer
const COMMAND_BUFFER: usize = 64;

/// Control side of a running playback task
///
/// Cloneable; the task stops once every handle is dropped or `shutdown` is
/// called.
#[derive(Clone)]
pub struct PlaybackHandle {
    commands: mpsc::Sender<Control>,
    snapshots: watch::Receiver<Option<PlaybackSnapshot>>,
}

enum Control {
    Command(PlaybackCommand),
    Shutdown,
}

/// Move the engine onto its own task
///
/// The task waits for either the next command or the engine's pending
/// deadline, whichever comes first, and publishes a fresh snapshot after each.
/// Because the sleep is rebuilt from `next_deadline` on every pass, a command
/// that cancels the pending advance also drops the sleep that would have
/// fired it.
pub fn spawn(mut engine: PlaybackEngine<TokioClock>) -> (PlaybackHandle, JoinHandle<()>) {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Control>(COMMAND_BUFFER);
    let (snap_tx, snap_rx) = watch::channel(engine.snapshot());

    let task = tokio::spawn(async move {
        loop {
            let deadline = engine.next_deadline().map(Instant::from_std);

            tokio::select! {
                control = cmd_rx.recv() => match control {
                    Some(Control::Command(command)) => {
                        debug!("Applying {:?}", command);
                        engine.apply(command);
                        // A zero-length segment may already be due
                        engine.update();
                    }
                    Some(Control::Shutdown) | None => break,
                },
                _ = sleep_until(deadline), if deadline.is_some() => {
                    engine.update();
                }
            }

            snap_tx.send_if_modified(|current| {
                let next = engine.snapshot();
                if *current == next {
                    false
                } else {
                    *current = next;
                    true
                }
            });
        }
        debug!("Playback task stopped");
    });

    (
        PlaybackHandle {
            commands: cmd_tx,
            snapshots: snap_rx,
        },
        task,
    )
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl PlaybackHandle {
    async fn send(&self, command: PlaybackCommand) {
        // A closed channel means the task is gone; nothing left to control
        let _ = self.commands.send(Control::Command(command)).await;
    }

    pub async fn play(&self) {
        self.send(PlaybackCommand::Play).await;
    }

    pub async fn pause(&self) {
        self.send(PlaybackCommand::Pause).await;
    }

    pub async fn toggle_play_pause(&self) {
        self.send(PlaybackCommand::TogglePlayPause).await;
    }

    pub async fn restart(&self) {
        self.send(PlaybackCommand::Restart).await;
    }

    pub async fn seek(&self, target: i64) {
        self.send(PlaybackCommand::Seek(target)).await;
    }

    pub async fn load(&self, route: Route) {
        self.send(PlaybackCommand::Load(route)).await;
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(Control::Shutdown).await;
    }

    /// Latest published state, `None` while idle
    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Wait for the next published change
    ///
    /// Returns `None` once the task has stopped.
    pub async fn changed(&mut self) -> Option<PlaybackSnapshot> {
        self.snapshots.changed().await.ok()?;
        self.snapshots.borrow_and_update().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Waypoint;
    use chrono::{DateTime, TimeZone, Utc};
    use std::time::Duration;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn route(offsets: &[i64]) -> Route {
        Route::new(
            offsets
                .iter()
                .enumerate()
                .map(|(i, secs)| {
                    Waypoint::new(17.385, 78.4867 + i as f64 * 0.001, t0() + chrono::Duration::seconds(*secs))
                })
                .collect(),
        )
        .unwrap()
    }

    fn index_and_playing(handle: &PlaybackHandle) -> (usize, bool) {
        let snapshot = handle.snapshot().unwrap();
        (snapshot.current_index, snapshot.is_playing)
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_idle() {
        let (handle, _task) = spawn(PlaybackEngine::with_clock(TokioClock));
        assert!(handle.snapshot().is_none());
        handle.play().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(handle.snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_to_completion() {
        let (handle, _task) = spawn(PlaybackEngine::with_clock(TokioClock));
        handle.load(route(&[0, 2, 5])).await;
        handle.play().await;

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(index_and_playing(&handle), (1, true));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(index_and_playing(&handle), (2, false));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(index_and_playing(&handle), (2, false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_cancels_pending_advance() {
        let (handle, _task) = spawn(PlaybackEngine::with_clock(TokioClock));
        handle.load(route(&[0, 2, 5])).await;
        handle.play().await;

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.pause().await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(index_and_playing(&handle), (0, false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_and_reload() {
        let (handle, _task) = spawn(PlaybackEngine::with_clock(TokioClock));
        handle.load(route(&[0, 2, 5])).await;
        handle.seek(10_000).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(index_and_playing(&handle), (2, false));

        handle.load(route(&[0, 1, 2, 3])).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let snapshot = handle.snapshot().unwrap();
        assert_eq!(snapshot.current_index, 0);
        assert_eq!(snapshot.max_index, 3);
        assert!(!snapshot.is_playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changed_reports_each_advance() {
        let (mut handle, _task) = spawn(PlaybackEngine::with_clock(TokioClock));
        handle.load(route(&[0, 1, 2])).await;
        let loaded = handle.changed().await.unwrap();
        assert_eq!(loaded.current_index, 0);

        handle.play().await;
        let playing = handle.changed().await.unwrap();
        assert!(playing.is_playing);

        let first = handle.changed().await.unwrap();
        assert_eq!(first.current_index, 1);
        let last = handle.changed().await.unwrap();
        assert_eq!((last.current_index, last.is_playing), (2, false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_task() {
        let (mut handle, task) = spawn(PlaybackEngine::with_clock(TokioClock));
        handle.shutdown().await;
        task.await.unwrap();
        assert!(handle.changed().await.is_none());
    }
}
