//! End-to-end tests of the HTTP surface: registration, token issue,
//! and the full task lifecycle driven through the router, with status
//! code and body assertions for the success and failure paths.
//!
//! Verification command: `cargo test --test http_api`

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;
use taskboard_proto::api::{AckResponse, ErrorBody, ErrorKind, TokenResponse};
use taskboard_proto::category::Category;
use taskboard_proto::task::{Bucket, Task, TaskId};
use taskboard_proto::user::CategoryIndex;
use taskboard_server::auth::AuthGate;
use taskboard_server::http::{AppState, router};
use tower::ServiceExt;

const ALICE: &str = "alice@x.com";
const BOB: &str = "bob@x.com";

struct Client {
    app: Router,
    state: Arc<AppState>,
}

impl Client {
    fn new() -> Self {
        let state = Arc::new(AppState::new(AuthGate::new("test-secret", 3600)));
        let app = router(Arc::clone(&state));
        Self { app, state }
    }

    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn register(&self, email: &str) {
        let response = self
            .send(post("/users", None, &json!({ "email": email })))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    async fn token_for(&self, email: &str) -> String {
        let response = self
            .send(post("/auth/token", None, &json!({ "email": email })))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: TokenResponse = body_json(response).await;
        body.token
    }

    async fn category_id(&self, name: &str) -> String {
        let response = self
            .send(Request::builder().uri("/categories").body(Body::empty()).unwrap())
            .await;
        let listed: Vec<Category> = body_json(response).await;
        listed
            .into_iter()
            .find(|category| category.name == name)
            .map(|category| category.id.to_string())
            .unwrap()
    }

    async fn task_ids(&self, token: &str, owner: &str) -> CategoryIndex {
        let uri = format!("/tasks?owner_email={owner}");
        let response = self.send(get(&uri, Some(token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }
}

fn post(uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    request("POST", uri, token, body)
}

fn patch(uri: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    request("PATCH", uri, token, body)
}

fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn task_body(owner: &str, title: &str, category: &str) -> serde_json::Value {
    json!({
        "owner_email": owner,
        "task": {
            "title": title,
            "description": "over http",
            "deadline": 1_735_689_600_000u64,
            "category": category,
        }
    })
}

#[tokio::test]
async fn full_lifecycle_over_http() {
    let client = Client::new();
    client.register(ALICE).await;
    let token = client.token_for(ALICE).await;

    // Create.
    let response = client
        .send(post("/tasks", Some(&token), &task_body(ALICE, "Ship it", "To Do")))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let slice = client.task_ids(&token, ALICE).await;
    assert_eq!(slice.to_do.len(), 1);
    let id = slice.to_do[0];

    // Read back the details.
    let response = client
        .send(get(&format!("/tasks/{id}?owner_email={ALICE}"), Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let task: Task = body_json(response).await;
    assert_eq!(task.title, "Ship it");
    assert_eq!(task.category, Bucket::ToDo);

    // Move to Done via the catalog id.
    let done = client.category_id("Done").await;
    let response = client
        .send(patch(
            &format!("/tasks/{id}/category"),
            Some(&token),
            &json!({ "owner_email": ALICE, "category_id": done }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let slice = client.task_ids(&token, ALICE).await;
    assert!(slice.to_do.is_empty());
    assert_eq!(slice.done, vec![id]);

    // Patch the fields.
    let response = client
        .send(patch(
            &format!("/tasks/{id}"),
            Some(&token),
            &json!({ "owner_email": ALICE, "patch": { "title": "Shipped" } }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Delete.
    let response = client
        .send(delete(&format!("/tasks/{id}?owner_email={ALICE}"), Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .send(get(&format!("/tasks/{id}?owner_email={ALICE}"), Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::TaskNotFound);

    let slice = client.task_ids(&token, ALICE).await;
    assert!(slice.is_empty());
}

#[tokio::test]
async fn missing_and_garbage_tokens_are_unauthorized() {
    let client = Client::new();
    client.register(ALICE).await;

    let response = client
        .send(post("/tasks", None, &task_body(ALICE, "T", "To Do")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .send(post(
            "/tasks",
            Some("not.a.token"),
            &task_body(ALICE, "T", "To Do"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::Unauthorized);
}

#[tokio::test]
async fn claiming_another_owner_is_forbidden() {
    let client = Client::new();
    client.register(ALICE).await;
    client.register(BOB).await;
    let bob_token = client.token_for(BOB).await;

    // Bob's token, Alice's name in the payload.
    let response = client
        .send(post(
            "/tasks",
            Some(&bob_token),
            &task_body(ALICE, "Planted", "To Do"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::Forbidden);

    // Nothing landed in either index.
    let alice_token = client.token_for(ALICE).await;
    assert!(client.task_ids(&alice_token, ALICE).await.is_empty());
    assert!(client.task_ids(&bob_token, BOB).await.is_empty());
}

#[tokio::test]
async fn patch_carrying_a_category_is_rejected() {
    let client = Client::new();
    client.register(ALICE).await;
    let token = client.token_for(ALICE).await;

    let response = client
        .send(post("/tasks", Some(&token), &task_body(ALICE, "Fixed", "To Do")))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = client.task_ids(&token, ALICE).await.to_do[0];

    // The patch decoder rejects unknown fields, so a smuggled category
    // never reaches the store.
    let response = client
        .send(patch(
            &format!("/tasks/{id}"),
            Some(&token),
            &json!({ "owner_email": ALICE, "patch": { "category": "Done" } }),
        ))
        .await;
    assert!(response.status().is_client_error());

    let slice = client.task_ids(&token, ALICE).await;
    assert_eq!(slice.to_do, vec![id]);
    assert!(slice.done.is_empty());
}

#[tokio::test]
async fn move_to_unknown_category_is_not_found() {
    let client = Client::new();
    client.register(ALICE).await;
    let token = client.token_for(ALICE).await;

    client
        .send(post("/tasks", Some(&token), &task_body(ALICE, "Still", "To Do")))
        .await;
    let id = client.task_ids(&token, ALICE).await.to_do[0];

    let phantom = TaskId::new();
    let response = client
        .send(patch(
            &format!("/tasks/{id}/category"),
            Some(&token),
            &json!({ "owner_email": ALICE, "category_id": phantom.to_string() }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::CategoryNotFound);

    assert_eq!(client.task_ids(&token, ALICE).await.to_do, vec![id]);
}

#[tokio::test]
async fn empty_title_is_a_bad_request() {
    let client = Client::new();
    client.register(ALICE).await;
    let token = client.token_for(ALICE).await;

    let response = client
        .send(post("/tasks", Some(&token), &task_body(ALICE, "", "To Do")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::InvalidRequest);
    assert!(client.task_ids(&token, ALICE).await.is_empty());
}

#[tokio::test]
async fn create_for_unregistered_owner_reports_partial_inconsistency() {
    // A valid token for an email that never registered: the record
    // insert commits, the index append fails, and the response names
    // the committed step.
    let client = Client::new();
    let token = client.token_for("ghost@x.com").await;

    let response = client
        .send(post(
            "/tasks",
            Some(&token),
            &task_body("ghost@x.com", "Orphan", "To Do"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::PartialInconsistency);
    assert_eq!(body.completed_steps, vec!["task_insert"]);
}

#[tokio::test]
async fn user_snapshot_and_availability_endpoints() {
    let client = Client::new();
    client.register(ALICE).await;

    let response = client.send(get(&format!("/users/{ALICE}"), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.send(get(&format!("/users/{BOB}"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.kind, ErrorKind::UserNotFound);

    let response = client
        .send(get(&format!("/users/{ALICE}/availability"), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_acknowledges() {
    let client = Client::new();
    let response = client.send(post("/auth/logout", None, &json!({}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: AckResponse = body_json(response).await;
    assert!(body.success);
}

#[tokio::test]
async fn state_is_shared_across_cloned_routers() {
    // Registration through one clone is visible through another; the
    // underlying components live in the shared state, not the router.
    let client = Client::new();
    client.register(ALICE).await;
    assert!(client.state.index.contains_user(ALICE).await);
}
