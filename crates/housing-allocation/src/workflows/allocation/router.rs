use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::catalog::ProjectDraft;
use super::domain::{ApplicationId, FlatType, ProjectName, RegistrationId, UserId};
use super::error::AllocationError;
use super::service::AllocationService;

type SharedService = State<Arc<AllocationService>>;

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyRequest {
    pub applicant_id: UserId,
    pub project: ProjectName,
    pub flat_type: FlatType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    pub approve: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BookingRequest {
    #[serde(default)]
    pub officer_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InventoryRequest {
    pub flat_type: FlatType,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegistrationRequest {
    pub officer_id: UserId,
    pub project: ProjectName,
}

/// Router exposing applicant, officer and manager operations as JSON endpoints.
pub fn allocation_router(service: Arc<AllocationService>) -> Router {
    Router::new()
        .route("/api/v1/applications", post(apply_handler))
        .route(
            "/api/v1/applications/:application_id/decision",
            post(decision_handler),
        )
        .route(
            "/api/v1/applications/:application_id/booking",
            post(booking_handler),
        )
        .route(
            "/api/v1/applications/:application_id/withdrawal/decision",
            post(withdrawal_decision_handler),
        )
        .route(
            "/api/v1/applicants/:applicant_id/application",
            get(application_of_handler),
        )
        .route(
            "/api/v1/applicants/:applicant_id/projects",
            get(applicant_projects_handler),
        )
        .route(
            "/api/v1/applicants/:applicant_id/withdrawal",
            post(withdrawal_request_handler),
        )
        .route("/api/v1/withdrawals", get(pending_withdrawals_handler))
        .route("/api/v1/projects", post(create_project_handler))
        .route(
            "/api/v1/projects/:project",
            get(project_handler).delete(delete_project_handler),
        )
        .route(
            "/api/v1/projects/:project/inventory",
            post(inventory_handler),
        )
        .route(
            "/api/v1/projects/:project/visibility",
            post(visibility_handler),
        )
        .route("/api/v1/registrations", post(register_handler))
        .route(
            "/api/v1/registrations/:registration_id/decision",
            post(registration_decision_handler),
        )
        .route(
            "/api/v1/officers/:officer_id/receipts/:applicant_id",
            get(receipt_handler),
        )
        .route("/api/v1/snapshot", get(snapshot_handler))
        .with_state(service)
}

pub(crate) fn status_for(error: &AllocationError) -> StatusCode {
    match error {
        AllocationError::UnknownApplicant(_)
        | AllocationError::UnknownOfficer(_)
        | AllocationError::UnknownProject(_)
        | AllocationError::UnknownApplication(_)
        | AllocationError::UnknownRegistration(_) => StatusCode::NOT_FOUND,
        AllocationError::NotEligible { .. }
        | AllocationError::ProjectNotVisible(_)
        | AllocationError::NoActiveApplication(_)
        | AllocationError::InvalidArgument(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AllocationError::NotHandlingProject { .. } => StatusCode::FORBIDDEN,
        AllocationError::AlreadyApplied(_)
        | AllocationError::NoUnitsAvailable(_)
        | AllocationError::InvalidTransition { .. }
        | AllocationError::SelfConflict { .. }
        | AllocationError::OverlappingAssignment { .. }
        | AllocationError::NoSlotsAvailable(_)
        | AllocationError::AlreadyRequested(_)
        | AllocationError::NotRequested(_)
        | AllocationError::DuplicateProject(_)
        | AllocationError::DuplicateRegistration { .. }
        | AllocationError::ProjectInUse(_) => StatusCode::CONFLICT,
    }
}

fn error_response(error: AllocationError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, AllocationError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler(
    State(service): SharedService,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response {
    respond(
        StatusCode::CREATED,
        service.apply(&request.applicant_id, &request.project, request.flat_type),
    )
}

pub(crate) async fn decision_handler(
    State(service): SharedService,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response {
    let id = ApplicationId(application_id);
    respond(StatusCode::OK, service.decide(&id, request.approve))
}

pub(crate) async fn booking_handler(
    State(service): SharedService,
    Path(application_id): Path<String>,
    request: Option<axum::Json<BookingRequest>>,
) -> Response {
    let id = ApplicationId(application_id);
    let officer = request.and_then(|axum::Json(request)| request.officer_id);
    respond(StatusCode::OK, service.book(&id, officer.as_ref()))
}

pub(crate) async fn withdrawal_decision_handler(
    State(service): SharedService,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response {
    let id = ApplicationId(application_id);
    match service.decide_withdrawal(&id, request.approve) {
        Ok(outcome) => {
            let payload = json!({
                "application_id": id,
                "decision": outcome,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_of_handler(
    State(service): SharedService,
    Path(applicant_id): Path<String>,
) -> Response {
    let applicant = UserId(applicant_id);
    match service.application_of(&applicant) {
        Ok(Some(application)) => (StatusCode::OK, axum::Json(application)).into_response(),
        Ok(None) => error_response(AllocationError::NoActiveApplication(applicant)),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn applicant_projects_handler(
    State(service): SharedService,
    Path(applicant_id): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        service.projects_for_applicant(&UserId(applicant_id)),
    )
}

pub(crate) async fn withdrawal_request_handler(
    State(service): SharedService,
    Path(applicant_id): Path<String>,
) -> Response {
    respond(
        StatusCode::ACCEPTED,
        service.request_withdrawal(&UserId(applicant_id)),
    )
}

pub(crate) async fn pending_withdrawals_handler(State(service): SharedService) -> Response {
    (StatusCode::OK, axum::Json(service.pending_withdrawals())).into_response()
}

pub(crate) async fn create_project_handler(
    State(service): SharedService,
    axum::Json(draft): axum::Json<ProjectDraft>,
) -> Response {
    respond(StatusCode::CREATED, service.create_project(draft))
}

pub(crate) async fn project_handler(
    State(service): SharedService,
    Path(project): Path<String>,
) -> Response {
    respond(StatusCode::OK, service.project(&ProjectName(project)))
}

pub(crate) async fn delete_project_handler(
    State(service): SharedService,
    Path(project): Path<String>,
) -> Response {
    respond(StatusCode::OK, service.delete_project(&ProjectName(project)))
}

pub(crate) async fn inventory_handler(
    State(service): SharedService,
    Path(project): Path<String>,
    axum::Json(request): axum::Json<InventoryRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        service.set_inventory(&ProjectName(project), request.flat_type, request.count),
    )
}

pub(crate) async fn visibility_handler(
    State(service): SharedService,
    Path(project): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        service.toggle_visibility(&ProjectName(project)),
    )
}

pub(crate) async fn register_handler(
    State(service): SharedService,
    axum::Json(request): axum::Json<RegistrationRequest>,
) -> Response {
    respond(
        StatusCode::CREATED,
        service.register(&request.officer_id, &request.project),
    )
}

pub(crate) async fn registration_decision_handler(
    State(service): SharedService,
    Path(registration_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response {
    let id = RegistrationId(registration_id);
    respond(
        StatusCode::OK,
        service.decide_registration(&id, request.approve),
    )
}

pub(crate) async fn receipt_handler(
    State(service): SharedService,
    Path((officer_id, applicant_id)): Path<(String, String)>,
) -> Response {
    respond(
        StatusCode::OK,
        service.receipt(&UserId(officer_id), &UserId(applicant_id)),
    )
}

pub(crate) async fn snapshot_handler(State(service): SharedService) -> Response {
    (StatusCode::OK, axum::Json(service.snapshot())).into_response()
}
