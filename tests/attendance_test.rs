//! Attendance log from the device API and the hosted store

mod helpers;

use helpers::*;
use serde_json::json;
use serial_test::serial;

use gate_console::config::DataSource;
use gate_console::models::{AttendanceFilter, AttendanceStatus, VerificationMethod};

#[tokio::test]
#[serial]
async fn test_local_attendance_log() {
    let ctx = TestContext::new().await;
    ctx.device.setup_default_mocks().await;

    let records = ctx.services.attendance_service.recent().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].student_name, "Priya Sharma");
    assert_eq!(records[0].status, "present");
    assert_eq!(records[0].verification_method, "face");
    assert_eq!(records[1].status_kind(), Some(AttendanceStatus::Proxy));
}

#[tokio::test]
#[serial]
async fn test_local_attendance_non_array_is_empty() {
    let ctx = TestContext::new().await;
    ctx.device
        .mock_attendance(MockResponseConfig::ok(json!({ "records": null })))
        .await;

    let records = ctx.services.attendance_service.recent().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
#[serial]
async fn test_hosted_attendance_joins_names() {
    let ctx = TestContext::with_config(TestConfig {
        with_store: true,
        students: DataSource::Local,
        attendance: DataSource::Hosted,
    })
    .await;

    ctx.store()
        .mock_select(
            "student_attendance",
            "id,student_id,status,timestamp,verification_method",
            json!([
                {
                    "id": 7,
                    "student_id": "24110301",
                    "status": "Present",
                    "timestamp": "2024-09-02T09:01:12+00:00",
                    "verification_method": "barcode"
                },
                {
                    "id": 8,
                    "student_id": 3,
                    "status": "failed",
                    "timestamp": "2024-09-02 08:55:00",
                    "verification_method": null
                },
                {
                    "id": 9,
                    "student_id": "99999999",
                    "status": "unauthorized",
                    "timestamp": "2024-09-02T08:50:00"
                }
            ]),
        )
        .await;
    ctx.store()
        .mock_select(
            "students",
            "id,name,rollno",
            json!([
                { "id": 1, "name": "Priya Sharma", "rollno": "24110301" },
                { "id": 3, "name": "Meera Iyer", "rollno": "24112503" }
            ]),
        )
        .await;

    let records = ctx.services.attendance_service.recent().await.unwrap();
    assert_eq!(records.len(), 3);

    // Joined by roll number
    assert_eq!(records[0].student_name, "Priya Sharma");
    assert_eq!(records[0].date, "2024-09-02");
    assert_eq!(records[0].timestamp, "09:01:12");
    assert_eq!(records[0].status, "present");
    assert_eq!(records[0].verification_method, "barcode");

    // Joined by id; a missing method defaults to face
    assert_eq!(records[1].student_name, "Meera Iyer");
    assert_eq!(records[1].timestamp, "08:55:00");
    assert_eq!(records[1].verification_method, "face");

    assert_eq!(records[2].student_name, "Unknown");
}

#[tokio::test]
#[serial]
async fn test_table_filter_and_paging() {
    let ctx = TestContext::new().await;
    let mut log = Vec::new();
    for i in 0..14 {
        log.push(json!({
            "id": i,
            "studentId": format!("2411030{}", i % 3),
            "studentName": if i % 2 == 0 { "Priya Sharma" } else { "Arjun Mehta" },
            "date": "2024-09-02",
            "timestamp": format!("09:{:02}:00", i),
            "status": if i == 13 { "unauthorized" } else { "present" },
            "verificationMethod": if i % 4 == 0 { "barcode" } else { "face" }
        }));
    }
    ctx.device
        .mock_attendance(MockResponseConfig::ok(json!(log)))
        .await;

    let records = ctx.services.attendance_service.recent().await.unwrap();

    let all = AttendanceFilter::default();
    let page = all.page(&records);
    assert_eq!(page.rows.len(), 10);
    assert_eq!(page.total, 14);
    assert!(page.has_more());

    let mut face_only = AttendanceFilter::default();
    face_only.toggle_method(VerificationMethod::Barcode, false);
    assert_eq!(face_only.page(&records).total, 10);

    let mut no_unauthorized = AttendanceFilter::default();
    no_unauthorized.toggle_status(AttendanceStatus::Unauthorized, false);
    assert_eq!(no_unauthorized.page(&records).total, 13);

    let arjun = AttendanceFilter::default().with_search("ARJUN");
    assert_eq!(arjun.page(&records).total, 7);
}
