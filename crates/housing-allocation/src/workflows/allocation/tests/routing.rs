use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::workflows::allocation::router::{decision_handler, status_for, DecisionRequest};
use crate::workflows::allocation::{AllocationError, FlatType, UserId};

#[tokio::test]
async fn apply_route_creates_a_pending_application() {
    let mut engine = engine();
    acacia(&mut engine);
    let (_, router) = router_with(engine);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/applications",
            json!({
                "applicant_id": MARRIED_21,
                "project": "Acacia Breeze",
                "flat_type": "three_room",
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["applicant"], MARRIED_21);
    assert_eq!(body["withdrawal_requested"], false);
}

#[tokio::test]
async fn apply_route_maps_eligibility_failures_to_unprocessable() {
    let mut engine = engine();
    acacia(&mut engine);
    let (_, router) = router_with(engine);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/applications",
            json!({
                "applicant_id": SINGLE_35,
                "project": "Acacia Breeze",
                "flat_type": "three_room",
            }),
        ))
        .await
        .expect("router responds");

    assert_error_kind(response, StatusCode::UNPROCESSABLE_ENTITY, "not_eligible").await;
}

#[tokio::test]
async fn booking_route_enforces_officer_handling() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    let id = successful_application(&mut engine, MARRIED_21, &acacia, FlatType::TwoRoom);
    let (service, router) = router_with(engine);
    let uri = format!("/api/v1/applications/{id}/booking");

    let response = router
        .clone()
        .oneshot(json_request("POST", &uri, json!({ "officer_id": OFFICER_B })))
        .await
        .expect("router responds");
    assert_error_kind(response, StatusCode::FORBIDDEN, "not_handling_project").await;

    let response = router
        .oneshot(json_request("POST", &uri, json!({})))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "booked");
    assert_eq!(
        service
            .project(&acacia)
            .expect("project")
            .inventory
            .available(FlatType::TwoRoom),
        1
    );
}

#[tokio::test]
async fn booking_route_accepts_an_empty_body() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    let id = successful_application(&mut engine, MARRIED_21, &acacia, FlatType::TwoRoom);
    let (_, router) = router_with(engine);

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/applications/{id}/booking"))
        .body(Body::empty())
        .expect("request builds");
    let response = router.oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "booked");
}

#[tokio::test]
async fn withdrawal_routes_run_both_phases() {
    let mut engine = engine();
    let acacia = acacia(&mut engine);
    let id = successful_application(&mut engine, MARRIED_21, &acacia, FlatType::ThreeRoom);
    engine.book(&id).expect("booked");
    let (_, router) = router_with(engine);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applicants/{MARRIED_21}/withdrawal"),
            json!({}),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = router
        .clone()
        .oneshot(get_request("/api/v1/withdrawals"))
        .await
        .expect("router responds");
    let pending = read_json(response).await;
    assert_eq!(pending.as_array().map(Vec::len), Some(1));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/applications/{id}/withdrawal/decision"),
            json!({ "approve": true }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["decision"]["outcome"], "approved");
    assert_eq!(body["decision"]["released"], "three_room");

    let response = router
        .oneshot(get_request(&format!(
            "/api/v1/applicants/{MARRIED_21}/application"
        )))
        .await
        .expect("router responds");
    assert_error_kind(
        response,
        StatusCode::UNPROCESSABLE_ENTITY,
        "no_active_application",
    )
    .await;
}

#[tokio::test]
async fn project_routes_create_toggle_and_list() {
    let (_, router) = router_with(engine());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/projects",
            json!({
                "name": "Juniper Court",
                "neighborhood": "Tampines",
                "opens_on": "2025-04-01",
                "closes_on": "2025-04-30",
                "manager": "M-JUNIPER",
                "officer_slots": 2,
                "units": { "two_room": 5, "three_room": 1 },
            }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_json(response).await["visible"], false);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/projects/Juniper%20Court/visibility",
            json!({}),
        ))
        .await
        .expect("router responds");
    assert_eq!(read_json(response).await["visible"], true);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/projects/Juniper%20Court/inventory",
            json!({ "flat_type": "two_room", "count": -2 }),
        ))
        .await
        .expect("router responds");
    assert_error_kind(response, StatusCode::UNPROCESSABLE_ENTITY, "invalid_argument").await;

    let response = router
        .clone()
        .oneshot(get_request(&format!("/api/v1/applicants/{SINGLE_35}/projects")))
        .await
        .expect("router responds");
    let listings = read_json(response).await;
    assert_eq!(listings[0]["name"], "Juniper Court");
    assert_eq!(listings[0]["units"], json!([["two_room", 5]]));

    let response = router
        .oneshot(get_request("/api/v1/projects/Nowhere"))
        .await
        .expect("router responds");
    assert_error_kind(response, StatusCode::NOT_FOUND, "unknown_project").await;
}

#[tokio::test]
async fn registration_routes_report_slot_exhaustion_as_conflict() {
    let mut engine = engine();
    let project = open_project(
        &mut engine,
        draft(
            "Single Slot Terrace",
            "M-SLOT",
            date(2025, 6, 1),
            date(2025, 6, 30),
            1,
            1,
            1,
        ),
    );
    approved_registration(&mut engine, OFFICER_A, &project);
    let (_, router) = router_with(engine);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/registrations",
            json!({ "officer_id": OFFICER_B, "project": "Single Slot Terrace" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let registration = read_json(response).await;
    let id = registration["id"].as_str().expect("id").to_string();

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/registrations/{id}/decision"),
            json!({ "approve": true }),
        ))
        .await
        .expect("router responds");
    assert_error_kind(response, StatusCode::CONFLICT, "no_slots_available").await;
}

#[tokio::test]
async fn decision_handler_reports_unknown_applications() {
    let (service, _) = router_with(engine());

    let response = decision_handler(
        State(service),
        Path("app-999999".to_string()),
        axum::Json(DecisionRequest { approve: true }),
    )
    .await;

    assert_error_kind(response, StatusCode::NOT_FOUND, "unknown_application").await;
}

#[tokio::test]
async fn snapshot_route_exports_the_record_set() {
    let mut engine = engine();
    acacia(&mut engine);
    let (_, router) = router_with(engine);

    let response = router
        .oneshot(get_request("/api/v1/snapshot"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["projects"][0]["inventory"]["three_room"], 3);
    assert_eq!(body["officers"].as_array().map(Vec::len), Some(2));
}

#[test]
fn status_mapping_groups_error_kinds() {
    assert_eq!(
        status_for(&AllocationError::UnknownOfficer(UserId::new("x"))),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        status_for(&AllocationError::InvalidArgument("bad".into())),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        status_for(&AllocationError::NoUnitsAvailable(FlatType::TwoRoom)),
        StatusCode::CONFLICT
    );
    assert_eq!(
        status_for(&AllocationError::NotHandlingProject {
            officer: UserId::new("x"),
            project: project("y"),
        }),
        StatusCode::FORBIDDEN
    );
}
