//! Services module
//!
//! This module contains the clients and business logic services

pub mod attendance;
pub mod auth;
pub mod device;
pub mod notification;
pub mod roster;
pub mod store;
pub mod sync;

// Re-export commonly used services
pub use attendance::AttendanceService;
pub use auth::{AdminSession, AuthService, Role};
pub use device::DeviceClient;
pub use notification::{Notification, NotificationService, NotificationStats, Variant};
pub use roster::{HostedRoster, LocalRoster, RosterQuery, RosterService, RosterStore};
pub use store::{Query, StoreClient};
pub use sync::{SyncErrorKind, SyncReport, SyncService};

use std::sync::Arc;

use crate::config::{DataSource, Settings};
use crate::utils::errors::{GateError, Result};

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub device: DeviceClient,
    pub store: Option<StoreClient>,
    pub roster_service: RosterService,
    pub attendance_service: AttendanceService,
    pub auth_service: AuthService,
    pub notification_service: NotificationService,
    pub sync_service: Option<SyncService>,
    students_table: String,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings) -> Result<Self> {
        let notification_service = NotificationService::default();
        let device = DeviceClient::new(&settings.device)?;
        let store = if settings.store.url.is_empty() {
            None
        } else {
            Some(StoreClient::new(&settings.store)?)
        };

        let roster_store: Arc<dyn RosterStore> = match (settings.data_source.students, &store) {
            (DataSource::Local, _) => Arc::new(LocalRoster::new(device.clone())),
            (DataSource::Hosted, Some(store)) => {
                Arc::new(HostedRoster::new(store.clone(), settings.store.students_table.clone()))
            }
            (DataSource::Hosted, None) => {
                return Err(GateError::Config(
                    "Students are read from the hosted store but no store is configured".to_string(),
                ))
            }
        };
        let roster_service = RosterService::new(roster_store, notification_service.clone());

        let attendance_service = AttendanceService::for_source(
            settings.data_source.attendance,
            device.clone(),
            store.clone(),
            &settings.store,
        )?;

        let auth_service = AuthService::new(settings.auth.clone(), notification_service.clone());

        let sync_service = match (&store, settings.sync.enabled) {
            (Some(store), true) => Some(SyncService::new(
                device.clone(),
                store.clone(),
                &settings.store,
                &settings.sync,
                notification_service.clone(),
            )),
            _ => None,
        };

        Ok(Self {
            device,
            store,
            roster_service,
            attendance_service,
            auth_service,
            notification_service,
            sync_service,
            students_table: settings.store.students_table.clone(),
        })
    }

    /// Health check for the external collaborators
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let store_probe = async {
            match &self.store {
                Some(store) => Some(store.count(&self.students_table).await.is_ok()),
                None => None,
            }
        };
        let (device_reachable, store_reachable) =
            futures::join!(self.device.check_connection(), store_probe);

        ServiceHealthStatus {
            device_reachable,
            store_reachable,
            sync_enabled: self.sync_service.is_some(),
        }
    }
}

/// Health status of the console's dependencies
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub device_reachable: bool,
    /// `None` when no hosted store is configured
    pub store_reachable: Option<bool>,
    pub sync_enabled: bool,
}

impl ServiceHealthStatus {
    /// The dashboard is usable as long as the gate answers
    pub fn is_healthy(&self) -> bool {
        self.device_reachable && self.store_reachable != Some(false)
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.device_reachable {
            issues.push("Device API is not reachable".to_string());
        }
        if self.store_reachable == Some(false) {
            issues.push("Hosted store is not reachable".to_string());
        }

        issues
    }
}
