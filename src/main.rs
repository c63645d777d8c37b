//! Gate Console
//!
//! Main application entry point

use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use gate_console::{
    config::Settings,
    models::DoorState,
    panels::{self, AttendancePanel, CameraPanel, DoorPanel, StatsPanel, StudentsPanel},
    services::{ServiceFactory, Variant},
    utils::{
        helpers::{format_clock, Backoff},
        logging,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", gate_console::info());

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(&settings)?;
    info!(
        device = %services.device.base_url(),
        students = ?services.roster_service.source(),
        attendance = ?services.attendance_service.source(),
        "ServiceFactory created successfully"
    );

    if let Some(session) = services.auth_service.restore().await? {
        info!(username = %session.username, "Restored admin session");
    }

    match services.device.health(Backoff::default()).await {
        Ok(report) if report.is_ok() => info!(status = %report.status, "Gate controller healthy"),
        Ok(report) => warn!(status = %report.status, details = %report.details, "Gate controller reports a problem"),
        Err(e) => warn!(error = %e, "Gate controller health unavailable"),
    }

    let health = services.health_check().await;
    if health.is_healthy() {
        info!("All dependencies reachable");
    } else {
        for issue in health.get_issues() {
            warn!(issue = %issue, "Dependency check failed");
        }
    }

    // Periodic sync from the device into the hosted store
    let sync_task = match &services.sync_service {
        Some(sync) => {
            let interval = Duration::from_secs(settings.sync.interval_minutes * 60);
            info!(interval_minutes = settings.sync.interval_minutes, "Starting periodic sync");
            Some(sync.start_periodic(interval))
        }
        None => {
            info!("Sync disabled");
            None
        }
    };

    // Dashboard panels
    let intervals = &settings.panels;
    let mut door = panels::spawn(
        DoorPanel::new(services.device.clone()),
        Duration::from_millis(intervals.door_interval_ms),
    );
    let mut camera = panels::spawn(
        CameraPanel::new(services.device.clone()),
        Duration::from_millis(intervals.recognition_interval_ms),
    );
    let mut stats = panels::spawn(
        StatsPanel::new(services.device.clone()),
        Duration::from_millis(intervals.stats_interval_ms),
    );
    let mut students = panels::spawn(
        StudentsPanel::new(services.roster_service.clone()),
        Duration::from_millis(intervals.students_interval_ms),
    );
    let mut attendance = panels::spawn(
        AttendancePanel::new(services.attendance_service.clone()),
        Duration::from_millis(intervals.attendance_interval_ms),
    );

    let mut notifications = services.notification_service.subscribe();
    let mut door_state = DoorState::default();

    info!("Gate console is ready!");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            Some(view) = door.next() => {
                if view.status.status != door_state {
                    door_state = view.status.status;
                    info!(state = door_state.label(), last_opened = %view.last_opened_text(), "Door state changed");
                }
            }
            Some(view) = camera.next() => {
                debug!(
                    camera = view.recognition.status.label(),
                    recognized = view.last_recognized(),
                    "Recognition status"
                );
            }
            Some(view) = stats.next() => {
                debug!(
                    total_students = view.stats.total_students,
                    todays_entries = view.stats.todays_entries,
                    this_week = view.stats.this_week,
                    "Gate stats"
                );
            }
            Some(view) = students.next() => {
                debug!(count = view.students.len(), error = ?view.error, "Student table refreshed");
            }
            Some(view) = attendance.next() => {
                debug!(count = view.records.len(), error = ?view.error, "Attendance table refreshed");
            }
            received = notifications.recv() => match received {
                Ok(toast) => {
                    let at = format_clock(toast.created_at);
                    match toast.variant {
                        Variant::Destructive => warn!(title = %toast.title, at = %at, "{}", toast.description),
                        Variant::Default => info!(title = %toast.title, at = %at, "{}", toast.description),
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Notification listener lagged"),
                Err(RecvError::Closed) => {
                    error!("Notification channel closed");
                    break;
                }
            },
        }
    }

    if let Some(task) = sync_task {
        task.abort();
    }

    info!("Gate console has been shut down.");

    Ok(())
}
