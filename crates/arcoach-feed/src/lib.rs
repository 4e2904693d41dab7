pub mod sim;
pub mod types;

use anyhow::{anyhow, Result};
use sim::SimulatedSession;
use std::time::Duration;
use tokio::sync::mpsc;
use types::FeedEvent;

/// Handle used by a platform bridge to push AR frames and gestures.
#[derive(Clone)]
pub struct FeedSender {
    tx: mpsc::UnboundedSender<FeedEvent>,
}

impl FeedSender {
    /// Queue an event for the core. Fails once the client is gone.
    pub fn send(&self, event: FeedEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| anyhow!("Feed client dropped"))
    }
}

/// Ordered stream of AR session events.
///
/// Either fed by a platform bridge through a [`FeedSender`], or by a
/// background task replaying a [`SimulatedSession`] at a fixed frame rate.
pub struct FeedClient {
    events_rx: mpsc::UnboundedReceiver<FeedEvent>,
    _task: Option<tokio::task::JoinHandle<()>>,
}

impl FeedClient {
    /// Create a client and the sender that feeds it.
    pub fn channel() -> (FeedSender, Self) {
        let (tx, events_rx) = mpsc::unbounded_channel();
        (
            FeedSender { tx },
            Self {
                events_rx,
                _task: None,
            },
        )
    }

    /// Replay a scripted session, pacing frames at `frame_rate` Hz.
    ///
    /// Must be called from within a tokio runtime.
    pub fn simulated(session: SimulatedSession, frame_rate: f32) -> Self {
        let (tx, events_rx) = mpsc::unbounded_channel();
        let period = Duration::from_secs_f32(1.0 / frame_rate.max(1.0));
        tracing::info!(
            events = session.len(),
            frame_rate,
            "Starting simulated AR feed"
        );
        let task = tokio::spawn(replay_loop(session.into_events(), tx, period));
        Self {
            events_rx,
            _task: Some(task),
        }
    }

    /// Wait for the next event. `None` once every sender is gone and the
    /// queue is drained.
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events_rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<FeedEvent> {
        self.events_rx.try_recv().ok()
    }
}

/// Background task: emit scripted events, one frame per tick.
async fn replay_loop(
    events: Vec<FeedEvent>,
    tx: mpsc::UnboundedSender<FeedEvent>,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    let mut frames: u64 = 0;

    for event in events {
        if matches!(event, FeedEvent::Frame(_)) {
            interval.tick().await;
            frames += 1;
            if frames % 600 == 0 {
                tracing::debug!(frames, "Simulated frames sent");
            }
        }
        if tx.send(event).is_err() {
            tracing::warn!("Feed client dropped, stopping simulation");
            return;
        }
    }

    tracing::info!(frames, "Simulated AR feed finished");
}
