use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::allocation::{
    allocation_router, Applicant, AllocationEngine, AllocationService, AllocationSnapshot,
    ApplicationId, FlatType, MaritalStatus, ProjectDraft, ProjectName, RegistrationId,
    SnapshotError, SnapshotStore, UserId,
};

pub(super) const SINGLE_35: &str = "S1234567A";
pub(super) const SINGLE_34: &str = "S2345678B";
pub(super) const MARRIED_21: &str = "T1234567J";
pub(super) const MARRIED_20: &str = "T7654321K";
pub(super) const OFFICER_A: &str = "T2109876H";
pub(super) const OFFICER_B: &str = "S6543210I";

pub(super) fn user(raw: &str) -> UserId {
    UserId::new(raw)
}

pub(super) fn project(raw: &str) -> ProjectName {
    ProjectName::new(raw)
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn draft(
    name: &str,
    manager: &str,
    opens_on: NaiveDate,
    closes_on: NaiveDate,
    two_room: i64,
    three_room: i64,
    officer_slots: i64,
) -> ProjectDraft {
    ProjectDraft {
        name: name.to_string(),
        neighborhood: "Yishun".to_string(),
        opens_on,
        closes_on,
        manager: user(manager),
        officer_slots,
        units: BTreeMap::from([
            (FlatType::TwoRoom, two_room),
            (FlatType::ThreeRoom, three_room),
        ]),
    }
}

/// Applicants covering both sides of each age threshold, plus two officers.
pub(super) fn engine() -> AllocationEngine {
    let mut engine = AllocationEngine::default();
    for (id, age, status) in [
        (SINGLE_35, 35, MaritalStatus::Single),
        (SINGLE_34, 34, MaritalStatus::Single),
        (MARRIED_21, 21, MaritalStatus::Married),
        (MARRIED_20, 20, MaritalStatus::Married),
        (OFFICER_A, 40, MaritalStatus::Married),
    ] {
        engine
            .add_applicant(Applicant::new(user(id), age, status))
            .expect("fresh applicant");
    }
    engine.add_officer(user(OFFICER_A)).expect("fresh officer");
    engine.add_officer(user(OFFICER_B)).expect("fresh officer");
    engine
}

/// Create a project and make it visible to applicants.
pub(super) fn open_project(
    engine: &mut AllocationEngine,
    draft: ProjectDraft,
) -> ProjectName {
    let name = engine.create_project(draft).expect("project created");
    assert!(engine.toggle_visibility(&name).expect("project exists"));
    name
}

/// "Acacia Breeze", open Feb 15 to Mar 20 2025, with 2 two-room and 3 three-room units.
pub(super) fn acacia(engine: &mut AllocationEngine) -> ProjectName {
    open_project(
        engine,
        draft(
            "Acacia Breeze",
            "M-ACACIA",
            date(2025, 2, 15),
            date(2025, 3, 20),
            2,
            3,
            3,
        ),
    )
}

pub(super) fn successful_application(
    engine: &mut AllocationEngine,
    applicant: &str,
    project: &ProjectName,
    flat_type: FlatType,
) -> ApplicationId {
    let id = engine
        .apply(&user(applicant), project, flat_type)
        .expect("application accepted");
    engine.decide(&id, true).expect("application approved");
    id
}

pub(super) fn approved_registration(
    engine: &mut AllocationEngine,
    officer: &str,
    project: &ProjectName,
) -> RegistrationId {
    let id = engine
        .register(&user(officer), project)
        .expect("registration accepted");
    engine
        .approve_registration(&id)
        .expect("registration approved");
    id
}

#[derive(Default, Clone)]
pub(super) struct MemorySnapshotStore {
    saved: Arc<Mutex<Option<AllocationSnapshot>>>,
}

impl MemorySnapshotStore {
    pub(super) fn seeded(snapshot: AllocationSnapshot) -> Self {
        Self {
            saved: Arc::new(Mutex::new(Some(snapshot))),
        }
    }

    pub(super) fn saved(&self) -> Option<AllocationSnapshot> {
        self.saved.lock().expect("store mutex poisoned").clone()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<AllocationSnapshot, SnapshotError> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, snapshot: &AllocationSnapshot) -> Result<(), SnapshotError> {
        *self.saved.lock().expect("store mutex poisoned") = Some(snapshot.clone());
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl SnapshotStore for UnavailableStore {
    fn load(&self) -> Result<AllocationSnapshot, SnapshotError> {
        Err(SnapshotError::Unavailable("disk detached".to_string()))
    }

    fn save(&self, _snapshot: &AllocationSnapshot) -> Result<(), SnapshotError> {
        Err(SnapshotError::Unavailable("disk detached".to_string()))
    }
}

pub(super) fn router_with(engine: AllocationEngine) -> (Arc<AllocationService>, axum::Router) {
    let service = Arc::new(AllocationService::new(engine));
    (service.clone(), allocation_router(service))
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) async fn assert_error_kind(response: Response, status: StatusCode, kind: &str) {
    assert_eq!(response.status(), status);
    let body = read_json(response).await;
    assert_eq!(body["kind"], kind, "unexpected payload {body}");
}
