//! Dashboard panels
//!
//! Each panel polls one part of the device API on its own fixed interval and
//! publishes the latest view through a `watch` channel. Panels never fail:
//! a failed fetch is folded into the view (stale or empty data, an offline
//! badge) so a renderer always has something to draw.
//!
//! Dropping a [`PanelHandle`] stops its polling task.

pub mod camera;
pub mod door;
pub mod stats;
pub mod tables;

pub use camera::{CameraPanel, CameraView};
pub use door::{DoorAnimation, DoorPanel, DoorView};
pub use stats::{StatsPanel, StatsView};
pub use tables::{AttendancePanel, AttendanceTable, StudentsPanel, StudentTable};

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// A polled view of some device state
#[async_trait]
pub trait Panel: Send + 'static {
    type View: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    /// View shown before the first fetch completes
    fn initial(&self) -> Self::View;

    /// Fetch and build the next view; errors are folded into the view
    async fn refresh(&mut self, previous: &Self::View) -> Self::View;
}

/// Running panel; the task stops when the handle is dropped
pub struct PanelHandle<V> {
    view: watch::Receiver<V>,
    task: JoinHandle<()>,
}

impl<V: Clone> PanelHandle<V> {
    /// Latest published view
    pub fn latest(&self) -> V {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.view.clone()
    }

    /// Wait for the next refresh and return it
    pub async fn next(&mut self) -> Option<V> {
        self.view.changed().await.ok()?;
        Some(self.view.borrow_and_update().clone())
    }
}

impl<V> Drop for PanelHandle<V> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start polling: one refresh right away, then one per `interval`
pub fn spawn<P: Panel>(mut panel: P, interval: Duration) -> PanelHandle<P::View> {
    let (tx, rx) = watch::channel(panel.initial());
    let name = panel.name();
    debug!(panel = name, interval_ms = interval.as_millis() as u64, "Starting panel");

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let previous = tx.borrow().clone();
            let next = panel.refresh(&previous).await;
            trace!(panel = name, "Panel refreshed");
            tx.send_replace(next);
        }
    });

    PanelHandle { view: rx, task }
}
