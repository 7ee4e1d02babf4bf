//! End-to-end REST flows against a live server.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use reqwest::Method;
use serde_json::json;

use common::{TestServer, field, tx_hash};

#[tokio::test]
async fn donation_credits_case_and_notifies_welfare() {
    let server = TestServer::start().await;
    let welfare = server.register("welfare", true).await;
    let donor = server.register("donor", false).await;

    let (status, case) = server
        .send(
            Method::POST,
            "/api/v1/cases",
            Some(welfare),
            Some(json!({"title": "Surgery for Rex", "target_amount": 150.0})),
        )
        .await;
    assert_eq!(status, 201, "{case}");
    let case_id = field(&case, "id");
    assert_eq!(case["has_updates"], false);

    let (status, donation) = server
        .send(
            Method::POST,
            "/api/v1/donor/donate",
            Some(donor),
            Some(json!({"case_id": case_id, "amount": 0.05, "tx_hash": tx_hash()})),
        )
        .await;
    assert_eq!(status, 201, "{donation}");
    assert_eq!(donation["amount_usd"], 100.0);
    assert_eq!(donation["notification_delivered"], true);

    let (_, case) = server
        .send(Method::GET, &format!("/api/v1/cases/{case_id}"), None, None)
        .await;
    assert_eq!(case["amount_raised"], 100.0);
    assert_eq!(case["status"], "active");

    let (_, inbox) = server
        .send(Method::GET, "/api/v1/messages", Some(welfare), None)
        .await;
    let Some(messages) = inbox.as_array() else {
        panic!("inbox is not a list: {inbox}");
    };
    assert!(messages.iter().any(|m| m["title"] == "New Donation Received"));
}

#[tokio::test]
async fn replayed_transfer_is_rejected() {
    let server = TestServer::start().await;
    let welfare = server.register("welfare", true).await;
    let donor = server.register("donor", false).await;
    let (_, case) = server
        .send(
            Method::POST,
            "/api/v1/cases",
            Some(welfare),
            Some(json!({"title": "Vaccines", "target_amount": 1000.0})),
        )
        .await;
    let body = json!({"case_id": field(&case, "id"), "amount": 0.01, "tx_hash": tx_hash()});

    let (first, _) = server
        .send(Method::POST, "/api/v1/donor/donate", Some(donor), Some(body.clone()))
        .await;
    let (second, _) = server
        .send(Method::POST, "/api/v1/donor/donate", Some(donor), Some(body))
        .await;
    assert_eq!(first, 201);
    assert_eq!(second, 409);
}

#[tokio::test]
async fn adoption_runs_from_request_to_completion() {
    let server = TestServer::start().await;
    let welfare = server.register("welfare", true).await;
    let donor = server.register("donor", false).await;

    let (status, listing) = server
        .send(
            Method::POST,
            "/api/v1/adoptions",
            Some(welfare),
            Some(json!({"name": "Milo", "species": "cat"})),
        )
        .await;
    assert_eq!(status, 201, "{listing}");
    let adoption_id = field(&listing, "id");

    let (status, request) = server
        .send(
            Method::POST,
            "/api/v1/adoption-request",
            Some(donor),
            Some(json!({"adoption_id": adoption_id, "reason": "Quiet home with a garden"})),
        )
        .await;
    assert_eq!(status, 201, "{request}");
    assert_eq!(request["status"], "pending");
    let request_path = format!("/api/v1/adoption-request/{}", field(&request, "id"));

    let (status, approved) = server
        .send(
            Method::PATCH,
            &request_path,
            Some(welfare),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, 200, "{approved}");
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["notification_delivered"], true);

    let (status, underpaid) = server
        .send(
            Method::POST,
            &format!("{request_path}/payment"),
            Some(donor),
            Some(json!({"amount": 10.0, "from_address": common::WALLET})),
        )
        .await;
    assert_eq!(status, 400, "{underpaid}");

    let (status, paid) = server
        .send(
            Method::POST,
            &format!("{request_path}/payment"),
            Some(donor),
            Some(json!({"amount": 50.0, "from_address": common::WALLET})),
        )
        .await;
    assert_eq!(status, 200, "{paid}");
    assert_eq!(paid["status"], "under review");

    let (status, done) = server
        .send(
            Method::POST,
            &format!("{request_path}/verify-payment"),
            Some(welfare),
            Some(json!({"verified": true})),
        )
        .await;
    assert_eq!(status, 200, "{done}");
    assert_eq!(done["status"], "completed");

    let (_, listing) = server
        .send(Method::GET, &format!("/api/v1/adoptions/{adoption_id}"), None, None)
        .await;
    assert_eq!(listing["status"], "adopted");
    assert_eq!(listing["adopted_by"], donor.id.to_string());
}

#[tokio::test]
async fn donor_cannot_decide_a_request() {
    let server = TestServer::start().await;
    let welfare = server.register("welfare", true).await;
    let donor = server.register("donor", false).await;
    let (_, listing) = server
        .send(
            Method::POST,
            "/api/v1/adoptions",
            Some(welfare),
            Some(json!({"name": "Bella", "species": "dog"})),
        )
        .await;
    let (_, request) = server
        .send(
            Method::POST,
            "/api/v1/adoption-request",
            Some(donor),
            Some(json!({"adoption_id": field(&listing, "id"), "reason": "Company"})),
        )
        .await;

    let (status, _) = server
        .send(
            Method::PATCH,
            &format!("/api/v1/adoption-request/{}", field(&request, "id")),
            Some(donor),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn emergency_converts_into_an_active_case() {
    let server = TestServer::start().await;
    let welfare = server.register("welfare", true).await;
    let reporter = server.register("donor", false).await;

    let (status, emergency) = server
        .send(
            Method::POST,
            "/api/v1/emergency",
            Some(reporter),
            Some(json!({
                "title": "Injured dog on Main St",
                "description": "Limping, bleeding paw",
                "location": "Main St & 3rd",
            })),
        )
        .await;
    assert_eq!(status, 201, "{emergency}");
    let path = format!("/api/v1/emergency/{}/convert-to-case", field(&emergency, "id"));

    let (status, converted) = server
        .send(
            Method::POST,
            &path,
            Some(welfare),
            Some(json!({"target_amount": 400.0})),
        )
        .await;
    assert_eq!(status, 201, "{converted}");
    assert_eq!(converted["case"]["status"], "active");
    assert_eq!(converted["case"]["wallet_address"], common::WALLET);

    let (again, _) = server
        .send(Method::POST, &path, Some(welfare), Some(json!({})))
        .await;
    assert_eq!(again, 409);
}

#[tokio::test]
async fn case_updates_drive_has_updates() {
    let server = TestServer::start().await;
    let welfare = server.register("welfare", true).await;
    let (_, case) = server
        .send(
            Method::POST,
            "/api/v1/cases",
            Some(welfare),
            Some(json!({"title": "Recovery", "target_amount": 200.0})),
        )
        .await;
    let case_path = format!("/api/v1/cases/{}", field(&case, "id"));

    let (status, update) = server
        .send(
            Method::POST,
            &format!("{case_path}/updates"),
            Some(welfare),
            Some(json!({"kind": "progress", "title": "Day 1", "content": "Eating well"})),
        )
        .await;
    assert_eq!(status, 201, "{update}");
    let (_, case) = server.send(Method::GET, &case_path, None, None).await;
    assert_eq!(case["has_updates"], true);

    let (status, deleted) = server
        .send(
            Method::DELETE,
            &format!("/api/v1/case-updates/{}", field(&update, "id")),
            Some(welfare),
            None,
        )
        .await;
    assert_eq!(status, 200, "{deleted}");
    assert_eq!(deleted["has_updates"], false);
}
