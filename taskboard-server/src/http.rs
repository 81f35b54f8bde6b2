//! HTTP surface: axum router, handlers, and error mapping.
//!
//! Every task operation passes the bearer gate first; the coordinator
//! then compares the claimed owner against the verified identity. The
//! registration and catalog endpoints are open, matching the upstream
//! service contract (a user must be able to register before holding a
//! token).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use taskboard_proto::api::{
    AckResponse, AvailabilityResponse, CreateTaskRequest, CreatedResponse, DeletedResponse,
    ErrorBody, ErrorKind, MoveTaskRequest, NewUserRequest, OwnerQuery, TokenRequest, TokenResponse,
    UpdateTaskRequest, UpdatedResponse,
};
use taskboard_proto::task::TaskId;
use uuid::Uuid;

use crate::auth::{AuthError, AuthGate};
use crate::catalog::CategoryCatalog;
use crate::coordinator::{Coordinator, CoordinatorError};
use crate::index::{IndexError, UserIndex};
use crate::store::TaskStore;

/// Shared application state: the coordinator plus direct handles for
/// the surfaces that bypass it (registration, catalog listing).
pub struct AppState {
    /// Saga orchestrator for all task mutations.
    pub coordinator: Coordinator,
    /// User registry, reached directly by the registration endpoints.
    pub index: Arc<UserIndex>,
    /// Category catalog, shared with the coordinator.
    pub catalog: Arc<CategoryCatalog>,
    /// Token issuer and verifier.
    pub gate: AuthGate,
}

impl AppState {
    /// Builds fresh components wired to one coordinator.
    #[must_use]
    pub fn new(gate: AuthGate) -> Self {
        let store = Arc::new(TaskStore::new());
        let index = Arc::new(UserIndex::new());
        let catalog = Arc::new(CategoryCatalog::new());
        let coordinator =
            Coordinator::new(store, Arc::clone(&index), Arc::clone(&catalog));
        Self {
            coordinator,
            index,
            catalog,
            gate,
        }
    }
}

/// A failure response: status code plus machine-readable body.
struct ApiFailure {
    status: StatusCode,
    body: ErrorBody,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for ApiFailure {
    fn from(error: AuthError) -> Self {
        let status = match error {
            AuthError::Missing | AuthError::Invalid => StatusCode::UNAUTHORIZED,
            AuthError::Signing => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let kind = match error {
            AuthError::Missing | AuthError::Invalid => ErrorKind::Unauthorized,
            AuthError::Signing => ErrorKind::ServerError,
        };
        Self {
            status,
            body: ErrorBody::new(kind, error.to_string()),
        }
    }
}

impl From<CoordinatorError> for ApiFailure {
    fn from(error: CoordinatorError) -> Self {
        let (status, kind) = match &error {
            CoordinatorError::Forbidden => (StatusCode::FORBIDDEN, ErrorKind::Forbidden),
            CoordinatorError::TaskNotFound(_) => (StatusCode::NOT_FOUND, ErrorKind::TaskNotFound),
            CoordinatorError::UserNotFound(_) => (StatusCode::NOT_FOUND, ErrorKind::UserNotFound),
            CoordinatorError::CategoryNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorKind::CategoryNotFound)
            }
            CoordinatorError::TitleEmpty | CoordinatorError::TitleTooLong => {
                (StatusCode::BAD_REQUEST, ErrorKind::InvalidRequest)
            }
            CoordinatorError::PartialInconsistency { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::PartialInconsistency,
            ),
        };
        let completed_steps = error.completed_step_names();
        Self {
            status,
            body: ErrorBody {
                kind,
                message: error.to_string(),
                completed_steps,
            },
        }
    }
}

impl From<IndexError> for ApiFailure {
    fn from(error: IndexError) -> Self {
        let (status, kind) = match error {
            IndexError::UserNotFound(_) => (StatusCode::NOT_FOUND, ErrorKind::UserNotFound),
            IndexError::EmailTaken => (StatusCode::CONFLICT, ErrorKind::Conflict),
        };
        Self {
            status,
            body: ErrorBody::new(kind, error.to_string()),
        }
    }
}

/// Extracts the bearer token from the `Authorization` header.
fn bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::Missing)
}

/// Runs the bearer gate, yielding the verified email.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, ApiFailure> {
    let token = bearer(headers)?;
    Ok(state.gate.verify(token)?)
}

/// Builds the service router.
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/auth/token", axum::routing::post(issue_token))
        .route("/auth/logout", axum::routing::post(logout))
        .route("/users", axum::routing::post(create_user))
        .route(
            "/users/{email}/availability",
            axum::routing::get(availability),
        )
        .route("/users/{email}", axum::routing::get(get_user))
        .route("/categories", axum::routing::get(categories))
        .route(
            "/tasks",
            axum::routing::post(create_task).get(task_ids),
        )
        .route(
            "/tasks/{id}",
            axum::routing::get(task_details)
                .patch(update_task)
                .delete(delete_task),
        )
        .route("/tasks/{id}/category", axum::routing::patch(move_task))
        .with_state(state)
}

/// Starts the server on the given address and returns the bound address
/// and a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code;
/// binding to `127.0.0.1:0` yields an OS-assigned port.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((bound_addr, handle))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiFailure> {
    let token = state.gate.issue(&request.email)?;
    tracing::info!(email = %request.email, "token issued");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Bearer tokens are not tracked server-side; logout is an
/// acknowledgment so clients can treat the flow uniformly.
async fn logout() -> Json<AckResponse> {
    Json(AckResponse { success: true })
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiFailure> {
    state.index.create_user(&request.email).await?;
    tracing::info!(email = %request.email, "user registered");
    Ok((StatusCode::CREATED, Json(CreatedResponse { created: true })))
}

async fn availability(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Json<AvailabilityResponse> {
    let exists = state.index.contains_user(&email).await;
    Json(AvailabilityResponse { exists })
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Response, ApiFailure> {
    match state.index.snapshot(&email).await {
        Some(record) => Ok(Json(record).into_response()),
        None => Err(IndexError::UserNotFound(email).into()),
    }
}

async fn categories(State(state): State<Arc<AppState>>) -> Response {
    Json(state.catalog.list()).into_response()
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiFailure> {
    let email = authenticate(&state, &headers)?;
    state
        .coordinator
        .create_task(&email, &request.owner_email, request.task)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { created: true })))
}

async fn task_ids(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OwnerQuery>,
) -> Result<Response, ApiFailure> {
    let email = authenticate(&state, &headers)?;
    let slice = state.coordinator.task_ids(&email, &query.owner_email).await?;
    Ok(Json(slice).into_response())
}

async fn task_details(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Response, ApiFailure> {
    let email = authenticate(&state, &headers)?;
    let task = state
        .coordinator
        .get_task(&email, &query.owner_email, TaskId::from_uuid(id))
        .await?;
    Ok(Json(task).into_response())
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<UpdatedResponse>, ApiFailure> {
    let email = authenticate(&state, &headers)?;
    state
        .coordinator
        .update_task_fields(&email, &request.owner_email, TaskId::from_uuid(id), &request.patch)
        .await?;
    Ok(Json(UpdatedResponse { updated: true }))
}

async fn move_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<MoveTaskRequest>,
) -> Result<Json<UpdatedResponse>, ApiFailure> {
    let email = authenticate(&state, &headers)?;
    state
        .coordinator
        .move_task(
            &email,
            &request.owner_email,
            TaskId::from_uuid(id),
            request.category_id,
        )
        .await?;
    Ok(Json(UpdatedResponse { updated: true }))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<DeletedResponse>, ApiFailure> {
    let email = authenticate(&state, &headers)?;
    state
        .coordinator
        .delete_task(&email, &query.owner_email, TaskId::from_uuid(id))
        .await?;
    Ok(Json(DeletedResponse { deleted: true }))
}
