//! Sample payloads as served by the gate controller

use serde_json::{json, Value};

pub fn sample_students() -> Value {
    json!([
        {
            "id": 1,
            "rollno": "24110301",
            "name": "Priya Sharma",
            "course": "B.Tech CSE - IoT",
            "section": "A",
            "dob": "2005-03-14",
            "email": "priya@example.edu"
        },
        {
            "id": 2,
            "studentId": "24111402",
            "name": "Arjun Mehta",
            "course": "B.Tech CSE - CS",
            "section": "B"
        },
        {
            "id": "3",
            "rollno": "24112503",
            "name": "meera iyer",
            "course": "B.Tech CSE - AI&DS",
            "section": "A"
        }
    ])
}

pub fn sample_attendance() -> Value {
    json!([
        {
            "id": 11,
            "studentId": "24110301",
            "studentName": "Priya Sharma",
            "date": "2024-09-02",
            "timestamp": "09:01:12",
            "status": "Present",
            "verificationMethod": "Face"
        },
        {
            "id": 12,
            "studentId": "24111402",
            "studentName": "Arjun Mehta",
            "date": "2024-09-02",
            "timestamp": "09:03:40",
            "status": "proxy",
            "verificationMethod": "barcode"
        }
    ])
}

pub fn sample_stats() -> Value {
    json!({ "totalStudents": 3, "todaysEntries": 2, "thisWeek": 9 })
}

pub fn sample_door_status(status: &str) -> Value {
    json!({
        "status": status,
        "lastOpened": "09:03:41",
        "autoCloseTimer": if status == "open" { 5 } else { 0 }
    })
}

pub fn sample_recognition() -> Value {
    json!({
        "recognizedFace": "Priya Sharma",
        "lastActivity": "09:01:12",
        "status": "online"
    })
}
