//! Admin login through roster changes, wired by the service factory

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serde_json::json;
use serial_test::serial;

use gate_console::middleware::{AdminGate, Route, RouteDecision};
use gate_console::models::{CreateStudentRequest, UpdateStudentRequest};
use gate_console::services::Variant;
use gate_console::GateError;

#[tokio::test]
#[serial]
async fn test_admin_changes_require_login() {
    let ctx = TestContext::new().await;
    ctx.device.setup_default_mocks().await;
    ctx.device
        .mock_update_student(
            "1",
            MockResponseConfig::ok(json!({ "id": 1, "rollno": "24110301", "name": "Priya S.", "course": "B.Tech CSE - IoT" })),
        )
        .await;

    let gate = AdminGate::new(ctx.services.auth_service.clone());
    assert_eq!(gate.check_route(Route::Admin).await, RouteDecision::RedirectToLogin);
    assert_matches!(gate.require().await, Err(GateError::PermissionDenied(_)));

    let mut toasts = ctx.services.notification_service.subscribe();
    assert!(!ctx.services.auth_service.login("admin", "wrong").await.unwrap());
    let toast = toasts.recv().await.unwrap();
    assert_eq!(toast.title, "Login Failed");
    assert_eq!(toast.variant, Variant::Destructive);

    assert!(ctx.services.auth_service.login("admin", "admin123").await.unwrap());
    assert_eq!(toasts.recv().await.unwrap().title, "Login Successful");

    let admin = gate.require().await.unwrap();
    let update = UpdateStudentRequest {
        name: Some("Priya S.".to_string()),
        ..Default::default()
    };
    let student = ctx
        .services
        .roster_service
        .update_student(&admin, "1", update)
        .await
        .unwrap();
    assert_eq!(student.name, "Priya S.");
    assert_eq!(toasts.recv().await.unwrap().title, "Student updated");

    ctx.services.auth_service.logout().await.unwrap();
    assert_eq!(toasts.recv().await.unwrap().title, "Logged Out");
    assert_eq!(gate.check_route(Route::Admin).await, RouteDecision::RedirectToLogin);
}

#[tokio::test]
#[serial]
async fn test_session_survives_restart() {
    let ctx = TestContext::new().await;
    assert!(ctx.services.auth_service.login("admin", "admin123").await.unwrap());

    // A second factory over the same settings reads the session file
    let restarted = gate_console::ServiceFactory::new(&ctx.settings).unwrap();
    let session = restarted.auth_service.restore().await.unwrap();
    assert_eq!(session.map(|s| s.username).as_deref(), Some("admin"));
}

#[tokio::test]
#[serial]
async fn test_health_check_reports_issues() {
    let ctx = TestContext::new().await;
    ctx.device.setup_default_mocks().await;
    ctx.store()
        .mock_count_rejected("students", 401, "PGRST301", "JWT expired")
        .await;

    let health = ctx.services.health_check().await;
    assert!(health.device_reachable);
    assert_eq!(health.store_reachable, Some(false));
    assert!(health.sync_enabled);
    assert_eq!(health.get_issues(), vec!["Hosted store is not reachable".to_string()]);
}

#[tokio::test]
#[serial]
async fn test_create_form_validation_toast() {
    let ctx = TestContext::new().await;
    ctx.services.auth_service.login("admin", "admin123").await.unwrap();
    let admin = ctx.services.auth_service.current().await.unwrap();

    let mut toasts = ctx.services.notification_service.subscribe();
    let result = ctx
        .services
        .roster_service
        .create_student(&admin, CreateStudentRequest::default())
        .await;

    assert_matches!(result, Err(GateError::InvalidInput(_)));
    let toast = toasts.recv().await.unwrap();
    assert_eq!(toast.variant, Variant::Destructive);
    assert_eq!(toast.description, "Student name is required");
}

#[tokio::test]
#[serial]
async fn test_device_health_report() {
    let ctx = TestContext::new().await;
    ctx.device
        .mock_health(MockResponseConfig::ok(json!({ "status": "ok", "camera": "online" })))
        .await;

    let policy = gate_console::utils::helpers::Backoff {
        retries: 0,
        initial_delay: std::time::Duration::from_millis(10),
    };
    let report = ctx.services.device.health(policy).await.unwrap();
    assert!(report.is_ok());
    assert_eq!(report.details["camera"], "online");
}
