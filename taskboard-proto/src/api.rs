//! Request and response bodies for the `Taskboard` HTTP surface.
//!
//! Every operation returns a definite outcome: a success body with a
//! machine-readable flag, or an [`ErrorBody`] whose [`ErrorKind`]
//! distinguishes clean failures from partial ones. A partial failure
//! additionally reports which saga steps committed, so an operator can
//! reconcile the index against the authoritative task records.

use serde::{Deserialize, Serialize};

use crate::category::CategoryId;
use crate::task::{TaskDraft, TaskPatch};

/// Request body for issuing an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Email to embed as the identity claim.
    pub email: String,
}

/// Response body carrying a freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token.
    pub token: String,
}

/// Generic acknowledgment body (logout and similar no-result operations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    /// Always `true` on a 2xx response.
    pub success: bool,
}

/// Request body for registering a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserRequest {
    /// Unique identity key for the new user.
    pub email: String,
}

/// Response body for the registration availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// `true` if a user with the probed email already exists.
    pub exists: bool,
}

/// Request body for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    /// Claimed owner; must match the authenticated identity.
    pub owner_email: String,
    /// The task fields, including the initial bucket.
    pub task: TaskDraft,
}

/// Request body for a partial field update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    /// Claimed owner; must match the authenticated identity.
    pub owner_email: String,
    /// Fields to change. Cannot carry a category change.
    pub patch: TaskPatch,
}

/// Request body for moving a task to another category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTaskRequest {
    /// Claimed owner; must match the authenticated identity.
    pub owner_email: String,
    /// Target catalog entry; its name must resolve to a bucket.
    pub category_id: CategoryId,
}

/// Query parameters for owner-scoped reads and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerQuery {
    /// Claimed owner; must match the authenticated identity.
    pub owner_email: String,
}

/// Success body for task creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// Always `true` on a 2xx response.
    pub created: bool,
}

/// Success body for field updates and moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedResponse {
    /// Always `true` on a 2xx response.
    pub updated: bool,
}

/// Success body for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    /// Always `true` on a 2xx response.
    pub deleted: bool,
}

/// Machine-readable failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or invalid bearer token.
    Unauthorized,
    /// Claimed owner does not match the authenticated identity.
    Forbidden,
    /// Referenced task does not exist.
    TaskNotFound,
    /// Referenced user does not exist.
    UserNotFound,
    /// Referenced category does not exist or is outside the bucket set.
    CategoryNotFound,
    /// A resource with that key already exists.
    Conflict,
    /// Malformed request body or parameters.
    InvalidRequest,
    /// A saga committed some but not all steps; the index may be stale.
    PartialInconsistency,
    /// Storage unavailable or another internal fault.
    ServerError,
}

/// Wire shape of every failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Failure class.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// For partial failures: names of the saga steps that committed
    /// before the failing one, in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_steps: Vec<String>,
}

impl ErrorBody {
    /// Builds a clean-failure body with no completed steps.
    #[must_use]
    pub const fn new(kind: ErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            completed_steps: Vec::new(),
        }
    }
}
