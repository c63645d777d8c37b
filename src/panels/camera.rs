//! Camera and recognition panel

use async_trait::async_trait;
use tracing::{debug, warn};

use super::Panel;
use crate::models::{CameraSnapshot, CameraState, RecognitionStatus};
use crate::services::DeviceClient;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraView {
    pub recognition: RecognitionStatus,
    /// Latest still frame, when snapshots are enabled
    pub snapshot: Option<CameraSnapshot>,
}

impl CameraView {
    pub fn is_online(&self) -> bool {
        self.recognition.status != CameraState::Offline
    }

    pub fn last_recognized(&self) -> &str {
        self.recognition.recognized_face.as_deref().unwrap_or("None")
    }
}

pub struct CameraPanel {
    device: DeviceClient,
    snapshots: bool,
}

impl CameraPanel {
    pub fn new(device: DeviceClient) -> Self {
        Self { device, snapshots: false }
    }

    /// Also pull a still frame on every refresh
    pub fn with_snapshots(mut self) -> Self {
        self.snapshots = true;
        self
    }
}

#[async_trait]
impl Panel for CameraPanel {
    type View = CameraView;

    fn name(&self) -> &'static str {
        "camera"
    }

    fn initial(&self) -> CameraView {
        CameraView::default()
    }

    async fn refresh(&mut self, previous: &CameraView) -> CameraView {
        let recognition = match self.device.recognition_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Recognition status fetch failed, marking camera offline");
                RecognitionStatus {
                    status: CameraState::Offline,
                    ..previous.recognition.clone()
                }
            }
        };

        let snapshot = if self.snapshots && recognition.status != CameraState::Offline {
            match self.device.camera_snapshot().await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    debug!(error = %e, "No camera snapshot");
                    None
                }
            }
        } else {
            None
        };

        CameraView { recognition, snapshot }
    }
}
