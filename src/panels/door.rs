//! Door status panel

use async_trait::async_trait;
use tracing::warn;

use super::Panel;
use crate::models::{DoorState, DoorStatus};
use crate::services::DeviceClient;

/// Progress of the door swing, 0 (shut) to 100 (fully open)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DoorAnimation {
    pub progress: u8,
}

impl DoorAnimation {
    pub const STEP: u8 = 5;

    /// Reset the ramp when the reported state changes
    pub fn on_state(&mut self, previous: DoorState, current: DoorState) {
        if previous == current {
            return;
        }
        self.progress = match current {
            DoorState::Opening => 0,
            DoorState::Closing => 100,
            DoorState::Open => 100,
            DoorState::Closed | DoorState::Alert => 0,
        };
    }

    /// Advance one animation frame; returns false once the ramp is finished
    pub fn tick(&mut self, state: DoorState) -> bool {
        match state {
            DoorState::Opening if self.progress < 100 => {
                self.progress = self.progress.saturating_add(Self::STEP).min(100);
                true
            }
            DoorState::Closing if self.progress > 0 => {
                self.progress = self.progress.saturating_sub(Self::STEP);
                true
            }
            _ => false,
        }
    }

    /// Door leaf rotation in degrees
    pub fn rotation(&self) -> f32 {
        -(self.progress as f32) * 0.3
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DoorView {
    pub status: DoorStatus,
    pub animation: DoorAnimation,
    /// False while the last fetch failed and `status` is stale
    pub live: bool,
}

impl DoorView {
    pub fn last_opened_text(&self) -> String {
        match &self.status.last_opened {
            Some(at) => format!("Last opened at: {}", at),
            None => "No recent activity".to_string(),
        }
    }

    /// Countdown shown only while the door stands open
    pub fn auto_close_text(&self) -> Option<String> {
        if self.status.status == DoorState::Open && self.status.auto_close_timer > 0 {
            Some(format!("Auto-closing in: {}s", self.status.auto_close_timer))
        } else {
            None
        }
    }
}

pub struct DoorPanel {
    device: DeviceClient,
}

impl DoorPanel {
    pub fn new(device: DeviceClient) -> Self {
        Self { device }
    }
}

#[async_trait]
impl Panel for DoorPanel {
    type View = DoorView;

    fn name(&self) -> &'static str {
        "door"
    }

    fn initial(&self) -> DoorView {
        DoorView::default()
    }

    async fn refresh(&mut self, previous: &DoorView) -> DoorView {
        match self.device.door_status().await {
            Ok(status) => {
                let mut animation = previous.animation;
                animation.on_state(previous.status.status, status.status);
                DoorView { status, animation, live: true }
            }
            Err(e) => {
                warn!(error = %e, "Door status fetch failed, keeping last state");
                DoorView { live: false, ..previous.clone() }
            }
        }
    }
}
