//! API integration tests
//!
//! These run against a live server with a migrated database.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn staff_headers(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    builder
        .header("x-user-id", "u1")
        .header("x-daycare-id", "d1")
        .header("x-location-id", "l1")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_bulk_create_checkout_builds_visible_report() {
    let client = Client::new();

    let response = staff_headers(client.post(format!("{}/entries/bulk", BASE_URL)))
        .json(&json!({
            "items": [{
                "type": "Attendance",
                "subtype": "Check out",
                "childIds": ["c1"],
                "occurredAt": "2025-01-02T18:00:00Z"
            }]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["created"].as_array().unwrap().len(), 1);
    assert_eq!(body["created"][0]["type"], "Attendance");
    assert!(body["failed"].as_array().unwrap().is_empty());

    let report: Value = client
        .get(format!("{}/reports/c1-2025-01-02", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse report");

    assert_eq!(report["visibleToParents"], true);
    assert_eq!(report["sent"], true);
    assert_eq!(report["totalActivities"], 1);
}

#[tokio::test]
#[ignore]
async fn test_bulk_create_reports_per_item_failures() {
    let client = Client::new();

    let response = staff_headers(client.post(format!("{}/entries/bulk", BASE_URL)))
        .json(&json!({
            "items": [
                {
                    "type": "Nap",
                    "childIds": ["c1"],
                    "occurredAt": "2025-01-02T10:00:00Z"
                },
                {
                    "type": "Note",
                    "detail": "built a block tower",
                    "childIds": ["c1"],
                    "occurredAt": "2025-01-02T10:00:00Z"
                }
            ]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["created"].as_array().unwrap().len(), 1);
    assert_eq!(body["failed"][0]["index"], 0);
    assert_eq!(body["failed"][0]["reason"], "unsupported_type");
}

#[tokio::test]
#[ignore]
async fn test_bulk_create_without_daycare_header_fails() {
    let client = Client::new();

    let response = client
        .post(format!("{}/entries/bulk", BASE_URL))
        .header("x-user-id", "u1")
        .header("x-location-id", "l1")
        .json(&json!({
            "items": [{
                "type": "Note",
                "detail": "hello",
                "childIds": ["c1"],
                "occurredAt": "2025-01-02T10:00:00Z"
            }]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "missing_daycareId");
}

#[tokio::test]
#[ignore]
async fn test_list_reports_filters_by_sent() {
    let client = Client::new();

    let response = client
        .get(format!("{}/reports?sent=false", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_mark_sent_unknown_report_is_404() {
    let client = Client::new();

    let response = client
        .post(format!("{}/reports/nobody-2020-01-01/send", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
