//! Integration tests for the public passenger endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use serde_json::{json, Value};

use common::{complaint_payload, send, setup_test_app, submit_complaint};

#[tokio::test]
async fn test_submit_complaint_success() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/complaints",
        None,
        Some(complaint_payload("Coach B4 has not been cleaned since departure")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    let expected_code = format!("RMD{}001", Utc::now().year());
    assert_eq!(data["complaintId"], expected_code.as_str());
    assert_eq!(data["status"], "pending");
    assert_eq!(data["statusLabel"], "Pending");
    assert_eq!(data["priority"], "medium");
    assert_eq!(data["category"], "cleanliness");
    assert_eq!(data["categoryLabel"], "Cleanliness");
    assert_eq!(data["trainNumber"], "12951");
    assert!(data["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body["message"].as_str().unwrap().contains(&expected_code));
}

#[tokio::test]
async fn test_complaint_codes_are_sequential() {
    let (app, _temp_db) = setup_test_app();

    let first = submit_complaint(&app, complaint_payload("First complaint about lights")).await;
    let second = submit_complaint(&app, complaint_payload("Second complaint about fans")).await;

    let year = Utc::now().year();
    assert_eq!(first["complaintId"], format!("RMD{year}001"));
    assert_eq!(second["complaintId"], format!("RMD{year}002"));
}

#[tokio::test]
async fn test_untitled_complaint_gets_derived_title() {
    let (app, _temp_db) = setup_test_app();
    let description =
        "The berth in coach S5 is broken and the window latch does not close at all";

    let data = submit_complaint(
        &app,
        json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "category": "coach_maintenance",
            "description": description,
        }),
    )
    .await;

    let expected: String = description.chars().take(50).collect::<String>() + "...";
    assert_eq!(data["displayTitle"], expected.as_str());
    assert_eq!(data["categoryLabel"], "Coach Maintenance");
    assert!(data["title"].is_null());
}

#[tokio::test]
async fn test_submit_complaint_missing_description() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/complaints",
        None,
        Some(json!({ "name": "Ravi", "email": "ravi@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_submit_complaint_invalid_email() {
    let (app, _temp_db) = setup_test_app();

    let mut payload = complaint_payload("Fan in coach A1 is not working");
    payload["email"] = json!("not-an-email");

    let (status, body) = send(&app, "POST", "/complaints", None, Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_submit_complaint_mistyped_body_uses_envelope() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/complaints",
        None,
        Some(json!({ "name": "Ravi", "email": "ravi@example.com", "description": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_unknown_category_is_kept() {
    let (app, _temp_db) = setup_test_app();

    let mut payload = complaint_payload("Wifi in the lounge keeps dropping");
    payload["category"] = json!("wifi_outage");

    let data = submit_complaint(&app, payload).await;
    assert_eq!(data["category"], "wifi_outage");
    assert_eq!(data["categoryLabel"], "Wifi Outage");
}

#[tokio::test]
async fn test_track_complaint_by_code() {
    let (app, _temp_db) = setup_test_app();
    let created = submit_complaint(&app, complaint_payload("AC is leaking water on berth 12")).await;
    let code = created["complaintId"].as_str().unwrap();

    let (status, body) = send(&app, "GET", &format!("/complaints/track/{code}"), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["complaintId"], code);
    assert_eq!(body["data"]["description"], "AC is leaking water on berth 12");
}

#[tokio::test]
async fn test_track_unknown_complaint() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(&app, "GET", "/complaints/track/RMD1999999", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_track_by_email_newest_first() {
    let (app, _temp_db) = setup_test_app();

    let older = submit_complaint(&app, complaint_payload("Older complaint about catering")).await;
    let newer = submit_complaint(&app, complaint_payload("Newer complaint about water supply")).await;

    let mut other = complaint_payload("Someone else's complaint about lights");
    other["email"] = json!("someone@example.com");
    submit_complaint(&app, other).await;

    let (status, body) = send(
        &app,
        "GET",
        "/complaints/track-by-email/ASHA@example.com",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["complaintId"], newer["complaintId"]);
    assert_eq!(list[1]["complaintId"], older["complaintId"]);
}

#[tokio::test]
async fn test_track_by_email_without_complaints() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(
        &app,
        "GET",
        "/complaints/track-by-email/nobody@example.com",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_chatbot_conversation_submits_complaint() {
    let (app, _temp_db) = setup_test_app();

    let inputs = [
        "hello",
        "Asha Rao",
        "asha@example.com",
        "skip",
        "skip",
        "12951 Mumbai Rajdhani",
        "3",
        "The toilet in coach B4 has not been cleaned",
    ];

    let mut state = json!("greeting");
    let mut draft = json!({});
    for input in inputs {
        let (status, body) = send(
            &app,
            "POST",
            "/chatbot/step",
            None,
            Some(json!({ "state": state, "draft": draft, "input": input })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "step '{input}' failed: {body}");
        state = body["data"]["state"].clone();
        draft = body["data"]["draft"].clone();
    }
    assert_eq!(state, "confirm");

    let (status, body) = send(
        &app,
        "POST",
        "/chatbot/step",
        None,
        Some(json!({ "state": state, "draft": draft, "input": "yes" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "completed");
    let code = body["data"]["complaintId"].as_str().unwrap().to_string();
    assert!(body["data"]["reply"].as_str().unwrap().contains(&code));

    let (status, tracked) = send(&app, "GET", &format!("/complaints/track/{code}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracked["data"]["category"], "cleanliness");
    assert_eq!(tracked["data"]["trainName"], "Mumbai Rajdhani");
}

#[tokio::test]
async fn test_chatbot_reprompts_on_bad_email() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/chatbot/step",
        None,
        Some(json!({ "state": "ask_email", "draft": { "name": "Asha" }, "input": "asha at example" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "ask_email");
    assert_eq!(body["data"]["draft"]["name"], "Asha");
    assert!(body["data"].get("complaintId").is_none());
}

#[tokio::test]
async fn test_chatbot_rejects_email_the_form_would_reject() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/chatbot/step",
        None,
        Some(json!({ "state": "ask_email", "draft": { "name": "Ravi" }, "input": "ravi@x_y.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "ask_email");
    assert!(body["data"]["draft"].get("email").map_or(true, Value::is_null));
}

#[tokio::test]
async fn test_meta_options_and_health() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(&app, "GET", "/meta/options", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let statuses = body["data"]["statuses"].as_array().unwrap();
    assert_eq!(statuses.len(), 4);
    assert!(statuses
        .iter()
        .any(|s| s["value"] == "in_progress" && s["label"] == "In Progress"));
    assert!(body["data"]["categories"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["value"] == "hvac" && c["label"] == "HVAC"));

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
