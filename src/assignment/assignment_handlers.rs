use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    state::AppState,
};
use super::{
    assignment_dto::{CreateAssignmentRequest, UpdateAssignmentRequest, UpdateAssignmentStatusRequest},
    assignment_models::{Assignment, AssignmentStatus, AssignmentWithModule},
    assignment_repository::AssignmentFilters,
};

#[derive(Debug, Deserialize)]
pub struct AssignmentQuery {
    status: Option<AssignmentStatus>,
    module_id: Option<Uuid>,
    upcoming: Option<i32>,
}

/// Get all assignments for the authenticated user
#[utoipa::path(
    get,
    path = "/api/assignments",
    params(
        ("status" = Option<String>, Query, description = "Filter by status (not_started, in_progress, done)"),
        ("module_id" = Option<Uuid>, Query, description = "Filter by module"),
        ("upcoming" = Option<i32>, Query, description = "Only assignments due within this many days")
    ),
    responses(
        (status = 200, description = "List of assignments", body = Vec<AssignmentWithModule>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "assignments",
    security(("bearer_auth" = []))
)]
pub async fn get_assignments(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<AssignmentQuery>,
) -> Result<Json<Vec<AssignmentWithModule>>> {
    let filters = AssignmentFilters {
        status: query.status,
        module_id: query.module_id,
        upcoming_days: query.upcoming.map(|days| days.max(0)),
    };

    let assignments = state.assignment_service.list_assignments(user_id, filters).await?;
    Ok(Json(assignments))
}

/// Get a single assignment
#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment", body = AssignmentWithModule),
        (status = 404, description = "Assignment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "assignments",
    security(("bearer_auth" = []))
)]
pub async fn get_assignment(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<AssignmentWithModule>> {
    let assignment = state.assignment_service.get_assignment(user_id, assignment_id).await?;
    Ok(Json(assignment))
}

/// Create an assignment and schedule its reminders
#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Module not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "assignments",
    security(("bearer_auth" = []))
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let assignment = state.assignment_service.create_assignment(user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Update an assignment; a new due date reschedules unsent reminders
#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = Assignment),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Assignment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "assignments",
    security(("bearer_auth" = []))
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(assignment_id): Path<Uuid>,
    Json(payload): Json<UpdateAssignmentRequest>,
) -> Result<Json<Assignment>> {
    payload.validate()?;

    let assignment = state
        .assignment_service
        .update_assignment(user_id, assignment_id, payload)
        .await?;
    Ok(Json(assignment))
}

/// Quick status update
#[utoipa::path(
    patch,
    path = "/api/assignments/{id}/status",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Assignment),
        (status = 404, description = "Assignment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "assignments",
    security(("bearer_auth" = []))
)]
pub async fn update_assignment_status(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(assignment_id): Path<Uuid>,
    Json(payload): Json<UpdateAssignmentStatusRequest>,
) -> Result<Json<Assignment>> {
    let assignment = state
        .assignment_service
        .update_status(user_id, assignment_id, payload.status)
        .await?;
    Ok(Json(assignment))
}

/// Delete an assignment together with its reminders
#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "assignments",
    security(("bearer_auth" = []))
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(assignment_id): Path<Uuid>,
) -> Result<StatusCode> {
    let rows_affected = state.assignment_service.delete_assignment(user_id, assignment_id).await?;

    if rows_affected == 0 {
        return Err(AppError::NotFound("Assignment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
