use crate::{
    assignment::{
        self, Assignment, AssignmentStatus, AssignmentWithModule, CreateAssignmentRequest,
        UpdateAssignmentRequest, UpdateAssignmentStatusRequest,
    },
    middleware::auth_middleware,
    module::{
        self, AssignmentCountResponse, CreateModuleRequest, DeleteModuleResponse, Module,
        UpdateModuleRequest,
    },
    preference::{self, NotificationPreferencesResponse, UpdateNotificationPreferencesRequest},
    reminder::{self, Reminder, TriggerResponse},
    state::AppState,
};
use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        assignment::assignment_handlers::get_assignments,
        assignment::assignment_handlers::get_assignment,
        assignment::assignment_handlers::create_assignment,
        assignment::assignment_handlers::update_assignment,
        assignment::assignment_handlers::update_assignment_status,
        assignment::assignment_handlers::delete_assignment,
        module::module_handlers::get_modules,
        module::module_handlers::get_module,
        module::module_handlers::create_module,
        module::module_handlers::update_module,
        module::module_handlers::count_module_assignments,
        module::module_handlers::delete_module,
        preference::preference_handlers::get_preferences,
        preference::preference_handlers::update_preferences,
        reminder::reminder_handlers::trigger_reminders,
        reminder::reminder_handlers::get_assignment_reminders,
    ),
    components(
        schemas(
            Assignment,
            AssignmentStatus,
            AssignmentWithModule,
            CreateAssignmentRequest,
            UpdateAssignmentRequest,
            UpdateAssignmentStatusRequest,
            Module,
            CreateModuleRequest,
            UpdateModuleRequest,
            DeleteModuleResponse,
            AssignmentCountResponse,
            NotificationPreferencesResponse,
            UpdateNotificationPreferencesRequest,
            Reminder,
            TriggerResponse,
        )
    ),
    tags(
        (name = "assignments", description = "Assignment management endpoints"),
        (name = "modules", description = "Module management endpoints"),
        (name = "preferences", description = "Reminder preference endpoints"),
        (name = "reminders", description = "Deadline reminder endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assignment_routes = Router::new()
        .route(
            "/",
            get(assignment::get_assignments).post(assignment::create_assignment),
        )
        .route(
            "/:id",
            get(assignment::get_assignment)
                .put(assignment::update_assignment)
                .delete(assignment::delete_assignment),
        )
        .route("/:id/status", patch(assignment::update_assignment_status))
        .route("/:id/reminders", get(reminder::get_assignment_reminders))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let module_routes = Router::new()
        .route("/", get(module::get_modules).post(module::create_module))
        .route(
            "/:id",
            get(module::get_module)
                .put(module::update_module)
                .delete(module::delete_module),
        )
        .route("/:id/assignments/count", get(module::count_module_assignments))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let preference_routes = Router::new()
        .route(
            "/",
            get(preference::get_preferences).put(preference::update_preferences),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let reminder_routes = Router::new()
        .route("/trigger", post(reminder::trigger_reminders))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .nest("/assignments", assignment_routes)
        .nest("/modules", module_routes)
        .nest("/preferences", preference_routes)
        .nest("/reminders", reminder_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
