//! Headline counters panel

use async_trait::async_trait;
use tracing::warn;

use super::Panel;
use crate::models::GateStats;
use crate::services::DeviceClient;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsView {
    pub stats: GateStats,
    pub loaded: bool,
}

pub struct StatsPanel {
    device: DeviceClient,
}

impl StatsPanel {
    pub fn new(device: DeviceClient) -> Self {
        Self { device }
    }
}

#[async_trait]
impl Panel for StatsPanel {
    type View = StatsView;

    fn name(&self) -> &'static str {
        "stats"
    }

    fn initial(&self) -> StatsView {
        StatsView::default()
    }

    async fn refresh(&mut self, previous: &StatsView) -> StatsView {
        match self.device.stats().await {
            Ok(stats) => StatsView { stats, loaded: true },
            Err(e) => {
                warn!(error = %e, "Stats fetch failed");
                *previous
            }
        }
    }
}
