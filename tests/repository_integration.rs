//! Integration tests for repository and storage adapters
//!
//! These tests verify that the HTTP template repository speaks the template
//! service's REST dialect (run against an in-process mock service) and that
//! the usage log persists correctly through the SQLite store.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use costkatana_templates::domain::errors::TemplateError;
use costkatana_templates::domain::repositories::{KeyValueStore, TemplateRepository};
use costkatana_templates::domain::template::{
    estimate, NewTemplate, TemplateCategory, TemplateMetadata, VariableDefinition, VariableValues,
};
use costkatana_templates::domain::usage::{UsageLog, UsageRecord, USAGE_LOG_KEY};
use costkatana_templates::infrastructure::repositories::HttpTemplateRepository;
use costkatana_templates::infrastructure::storage::SqliteKeyValueStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

const TOKEN: &str = "test-token";

/// State of the mock template service
#[derive(Default)]
struct MockService {
    templates: Vec<Value>,
    uses: Vec<(String, Value)>,
    next_id: u32,
}

type Shared = Arc<Mutex<MockService>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid token"}))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "Template not found"}))).into_response()
}

async fn list(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().await;
    Json(json!({"success": true, "data": state.templates})).into_response()
}

async fn fetch(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().await;
    match state.templates.iter().find(|t| t["_id"] == id) {
        Some(template) => Json(template.clone()).into_response(),
        None => not_found(),
    }
}

async fn record_use(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.lock().await.uses.push((id, body));
    Json(json!({"success": true})).into_response()
}

async fn create(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut state = state.lock().await;
    state.next_id += 1;
    body["_id"] = json!(format!("srv-{}", state.next_id));
    body["createdAt"] = json!("2024-06-01T00:00:00Z");
    body["usage"] = json!({"count": 0});
    state.templates.push(body.clone());
    (StatusCode::CREATED, Json(json!({"success": true, "data": body}))).into_response()
}

async fn replace(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().await;
    match state.templates.iter_mut().find(|t| t["_id"] == id) {
        Some(existing) => {
            body["_id"] = json!(id);
            *existing = body.clone();
            Json(json!({"success": true, "data": body})).into_response()
        }
        None => not_found(),
    }
}

async fn remove(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().await;
    let before = state.templates.len();
    state.templates.retain(|t| t["_id"] != id);
    if state.templates.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Start the mock service on an ephemeral port, returning its API root
async fn spawn_service(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock service");
    let addr = listener.local_addr().expect("mock service address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock service failed");
    });
    format!("http://{}/api", addr)
}

async fn setup_mock_service() -> (HttpTemplateRepository, Shared) {
    let state: Shared = Arc::new(Mutex::new(MockService {
        templates: vec![
            json!({
                "_id": "tpl-1",
                "name": "Blog Post",
                "description": "Draft an article",
                "content": "Write about {{topic}}",
                "category": "writing",
                "variables": [{"name": "topic", "defaultValue": "AI costs", "type": "text"}],
                "metadata": {"tags": ["content"]},
                "usage": {"count": 3},
                "createdAt": "2024-01-10T08:00:00Z"
            }),
            json!({
                "_id": "tpl-2",
                "name": "Code Review",
                "content": "Review {{code}}",
                "category": "coding",
                "variables": [{"name": "code", "required": true, "type": "textarea"}],
                "createdAt": "2024-02-10T08:00:00Z"
            }),
        ],
        ..MockService::default()
    }));

    let app = Router::new()
        .route("/api/templates", get(list).post(create))
        .route(
            "/api/templates/:id",
            get(fetch).put(replace).delete(remove),
        )
        .route("/api/templates/:id/use", post(record_use))
        .with_state(state.clone());

    let base_url = spawn_service(app).await;
    let repo = HttpTemplateRepository::new(base_url, Some(TOKEN.to_string()))
        .expect("create repository");
    (repo, state)
}

fn new_template(name: &str) -> NewTemplate {
    NewTemplate {
        name: name.to_string(),
        description: "Made in a test".to_string(),
        content: "Summarize {{text}}".to_string(),
        category: TemplateCategory::Analysis,
        variables: vec![VariableDefinition::new("text").required()],
        metadata: TemplateMetadata::default(),
    }
}

#[tokio::test]
async fn test_http_repository_lists_enveloped_templates() {
    let (repo, _) = setup_mock_service().await;

    let templates = repo.list().await.expect("list templates");

    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0].id, "tpl-1");
    assert_eq!(templates[0].category, TemplateCategory::Writing);
    assert_eq!(templates[0].usage.count, 3);
    assert_eq!(templates[0].variables[0].default_value.as_deref(), Some("AI costs"));
    assert_eq!(templates[1].usage.count, 0, "Missing usage defaults to zero");
}

#[tokio::test]
async fn test_http_repository_get_bare_template_and_missing() {
    let (repo, _) = setup_mock_service().await;

    let found = repo.get("tpl-2").await.expect("get template");
    assert_eq!(found.map(|t| t.name), Some("Code Review".to_string()));

    let missing = repo.get("nope").await.expect("get missing template");
    assert!(missing.is_none(), "404 should map to None");
}

#[tokio::test]
async fn test_http_repository_keeps_reserved_characters_in_ids() {
    let (repo, state) = setup_mock_service().await;
    state.lock().await.templates.push(json!({
        "_id": "team/alpha?v=2",
        "name": "Scoped",
        "content": "Scoped {{x}}"
    }));

    let found = repo.get("team/alpha?v=2").await.expect("get template");
    assert_eq!(found.map(|t| t.name), Some("Scoped".to_string()));

    repo.record_use("team/alpha?v=2", &VariableValues::new())
        .await
        .expect("record use");
    assert_eq!(state.lock().await.uses[0].0, "team/alpha?v=2");
}

#[tokio::test]
async fn test_http_repository_records_use_with_variables() {
    let (repo, state) = setup_mock_service().await;

    let mut variables = VariableValues::new();
    variables.insert("topic".to_string(), "token budgets".to_string());
    repo.record_use("tpl-1", &variables)
        .await
        .expect("record use");

    let state = state.lock().await;
    assert_eq!(state.uses.len(), 1);
    assert_eq!(state.uses[0].0, "tpl-1");
    assert_eq!(state.uses[0].1["variables"]["topic"], "token budgets");
}

#[tokio::test]
async fn test_http_repository_create_update_delete() {
    let (repo, state) = setup_mock_service().await;

    let created = repo.create(&new_template("Summary")).await.expect("create");
    assert_eq!(created.id, "srv-1");
    assert_eq!(created.category, TemplateCategory::Analysis);

    let updated = repo
        .update(&created.id, &new_template("Short summary"))
        .await
        .expect("update");
    assert_eq!(updated.name, "Short summary");

    repo.delete(&created.id).await.expect("delete");
    assert_eq!(state.lock().await.templates.len(), 2);

    let result = repo.delete(&created.id).await;
    assert!(matches!(result, Err(TemplateError::TemplateNotFound(_))));
}

#[tokio::test]
async fn test_http_repository_surfaces_auth_failure() {
    let (_, state) = setup_mock_service().await;
    let app = Router::new()
        .route("/api/templates", get(list))
        .with_state(state);
    let base_url = spawn_service(app).await;
    let repo = HttpTemplateRepository::new(base_url, None).expect("create repository");

    let err = repo.list().await.expect_err("missing token should fail");

    match err {
        TemplateError::RemoteStatus { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid token");
        }
        other => panic!("Expected RemoteStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_repository_unreachable_service() {
    // Bind then drop a listener so the port is very likely closed
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let repo = HttpTemplateRepository::new(format!("http://{}/api", addr), None).unwrap();
    let err = repo.list().await.expect_err("closed port should fail");

    assert!(err.is_remote());
}

#[tokio::test]
async fn test_http_repository_malformed_payload() {
    let app = Router::new().route(
        "/api/templates",
        get(|| async { Json(json!({"success": true, "data": "not a list"})) }),
    );
    let base_url = spawn_service(app).await;
    let repo = HttpTemplateRepository::new(base_url, None).unwrap();

    let err = repo.list().await.expect_err("malformed payload should fail");

    assert!(matches!(err, TemplateError::Decode(_)));
}

fn usage_record(n: usize) -> UsageRecord {
    let mut variables = VariableValues::new();
    variables.insert("n".to_string(), n.to_string());
    let prompt = format!("Prompt number {}", n);
    let estimate = estimate(&prompt);
    UsageRecord::new(format!("tpl-{}", n), variables, prompt, estimate)
}

#[tokio::test]
async fn test_usage_log_round_trips_through_sqlite() {
    let store = Arc::new(
        SqliteKeyValueStore::connect("sqlite::memory:")
            .await
            .expect("open sqlite store"),
    );
    let record = usage_record(1);

    UsageLog::new(store.clone())
        .append(record.clone())
        .await
        .expect("append");

    // A fresh log over the same store sees the persisted record
    let reloaded = UsageLog::new(store).load_all().await.expect("load");
    assert_eq!(reloaded, vec![record]);
}

#[tokio::test]
async fn test_usage_log_cap_in_sqlite() {
    let store = Arc::new(SqliteKeyValueStore::connect("sqlite::memory:").await.unwrap());
    let log = UsageLog::new(store.clone());

    for n in 1..=12 {
        log.append(usage_record(n)).await.unwrap();
    }

    let records = log.load_all().await.unwrap();
    assert_eq!(records.len(), 10);
    assert_eq!(records[0].template_id, "tpl-12");
    assert_eq!(records[9].template_id, "tpl-3");
    assert!(records
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));

    // Stored as one JSON array in a single slot
    let raw = store.get(USAGE_LOG_KEY).await.unwrap().expect("slot written");
    let stored: Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(stored.as_array().map(Vec::len), Some(10));
    assert!(stored[0]["generatedPrompt"].is_string());
}

#[tokio::test]
async fn test_usage_log_recovers_from_corrupt_sqlite_slot() {
    let store = Arc::new(SqliteKeyValueStore::connect("sqlite::memory:").await.unwrap());
    store
        .set(USAGE_LOG_KEY, b"[{\"templateId\": 42}]".to_vec())
        .await
        .unwrap();

    let log = UsageLog::new(store);

    assert!(log.load_all().await.unwrap().is_empty());
    log.append(usage_record(1)).await.unwrap();
    assert_eq!(log.load_all().await.unwrap().len(), 1);
}
