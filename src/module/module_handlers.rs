use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    state::AppState,
};
use super::{
    module_dto::{
        AssignmentCountResponse, CreateModuleRequest, DeleteModuleQuery, DeleteModuleResponse,
        UpdateModuleRequest,
    },
    module_models::Module,
};

fn module_not_found() -> AppError {
    AppError::NotFound("Module not found".to_string())
}

/// List the caller's modules by name
#[utoipa::path(
    get,
    path = "/api/modules",
    responses(
        (status = 200, description = "List of modules", body = Vec<Module>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "modules",
    security(("bearer_auth" = []))
)]
pub async fn get_modules(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<Module>>> {
    let modules = state.module_repository.find_all(user_id).await?;
    Ok(Json(modules))
}

#[utoipa::path(
    get,
    path = "/api/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Module", body = Module),
        (status = 404, description = "Module not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "modules",
    security(("bearer_auth" = []))
)]
pub async fn get_module(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<Module>> {
    let module = state
        .module_repository
        .find_by_id(module_id, user_id)
        .await?
        .ok_or_else(module_not_found)?;
    Ok(Json(module))
}

/// Create a module
#[utoipa::path(
    post,
    path = "/api/modules",
    request_body = CreateModuleRequest,
    responses(
        (status = 201, description = "Module created", body = Module),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "modules",
    security(("bearer_auth" = []))
)]
pub async fn create_module(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<CreateModuleRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let module = state.module_repository.create(user_id, &payload).await?;
    tracing::debug!(module_id = %module.id, "Module created");
    Ok((StatusCode::CREATED, Json(module)))
}

#[utoipa::path(
    put,
    path = "/api/modules/{id}",
    params(("id" = Uuid, Path, description = "Module ID")),
    request_body = UpdateModuleRequest,
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Module not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "modules",
    security(("bearer_auth" = []))
)]
pub async fn update_module(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<UpdateModuleRequest>,
) -> Result<Json<Module>> {
    payload.validate()?;

    let module = state
        .module_repository
        .update(module_id, user_id, &payload)
        .await?
        .ok_or_else(module_not_found)?;
    Ok(Json(module))
}

/// Number of the caller's assignments in a module
#[utoipa::path(
    get,
    path = "/api/modules/{id}/assignments/count",
    params(("id" = Uuid, Path, description = "Module ID")),
    responses(
        (status = 200, description = "Assignment count", body = AssignmentCountResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "modules",
    security(("bearer_auth" = []))
)]
pub async fn count_module_assignments(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<AssignmentCountResponse>> {
    let count = state
        .module_repository
        .count_assignments(module_id, user_id)
        .await?;
    Ok(Json(AssignmentCountResponse { count }))
}

/// Delete a module. Its assignments are deleted too unless `unlink_only=true`
#[utoipa::path(
    delete,
    path = "/api/modules/{id}",
    params(
        ("id" = Uuid, Path, description = "Module ID"),
        ("unlink_only" = Option<bool>, Query, description = "Keep assignments and detach them from the module")
    ),
    responses(
        (status = 200, description = "Module deleted", body = DeleteModuleResponse),
        (status = 404, description = "Module not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "modules",
    security(("bearer_auth" = []))
)]
pub async fn delete_module(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(module_id): Path<Uuid>,
    Query(query): Query<DeleteModuleQuery>,
) -> Result<Json<DeleteModuleResponse>> {
    let rows_affected = state
        .module_repository
        .delete(module_id, user_id, query.unlink_only)
        .await?;

    if rows_affected == 0 {
        return Err(module_not_found());
    }

    Ok(Json(DeleteModuleResponse::for_mode(query.unlink_only)))
}
