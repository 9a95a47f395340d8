use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use entity_browser::app::{app, AppState};
use entity_browser::auth::HttpAuthGateway;
use entity_browser::config::AppConfig;
use entity_browser::sdk::HttpEntityApi;

pub const PROJECT_ID: &str = "proj-1";
pub const VALID_CODE: &str = "good-code";
pub const SESSION_TOKEN: &str = "tok-1";

/// One request received by the fake upstream
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Clone)]
struct UpstreamState {
    definitions: Arc<Vec<Value>>,
    instances: Arc<HashMap<String, Vec<Value>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    failing: Arc<AtomicBool>,
}

/// Entity and auth service stand-in listening on an ephemeral port
pub struct Upstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    failing: Arc<AtomicBool>,
}

impl Upstream {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path ends with `suffix`
    pub fn requests_to(&self, suffix: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path.ends_with(suffix)).collect()
    }

    /// Make every instances request fail with 500
    pub fn fail_instances(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

pub fn definitions() -> Vec<Value> {
    vec![
        json!({
            "id": "products-def",
            "name": "Products",
            "slug": "products",
            "description": "Everything we sell",
            "pageSize": 2,
            "titleSection0": "General",
            "titleSection1": "Media",
            "fields": [
                {"id": "f-name", "name": "name", "label": "Name", "dbType": "varchar",
                 "displayInTable": true, "searchable": true},
                {"id": "f-category", "name": "category", "label": "Category", "dbType": "manyToOne",
                 "relatedEntityDefinitionId": "categories-def", "filterableInList": true, "displayInTable": true},
                {"id": "f-status", "name": "status", "label": "Status", "dbType": "varchar",
                 "filterableInList": true, "options": [{"id": "new", "name": "New"}, {"id": "old", "name": "Old"}]},
                {"id": "f-photos", "name": "photos", "label": "Photos", "dbType": "files", "type": "images",
                 "sectionIndex": 1},
            ]
        }),
        json!({
            "id": "categories-def",
            "name": "Categories",
            "slug": "categories",
            "fields": [
                {"id": "f-code", "name": "code", "label": "Code", "dbType": "varchar", "displayInTable": true},
                {"id": "f-title", "name": "title", "label": "Title", "dbType": "varchar", "isOptionTitleField": true},
            ]
        }),
    ]
}

pub fn instances() -> HashMap<String, Vec<Value>> {
    let mut instances = HashMap::new();
    instances.insert(
        "products-def".to_string(),
        vec![
            json!({"id": "p1", "slug": "boots", "name": "Boots", "status": "new",
                   "category": {"id": "c1", "title": "Shoes"},
                   "photos": [{"id": "ph1", "fileName": "boots.png", "fileUrl": "https://cdn.test/boots.png"}]}),
            json!({"id": "p2", "slug": "cap", "name": "Cap", "status": "old",
                   "category": {"id": "c2", "title": "Hats"}}),
            json!({"id": "p3", "slug": "scarf", "name": "Scarf", "status": "new", "category": null}),
        ],
    );
    instances.insert(
        "categories-def".to_string(),
        vec![
            json!({"id": "c1", "code": "S", "title": "Shoes"}),
            json!({"id": "c2", "code": "H", "title": "Hats"}),
        ],
    );
    instances
}

pub async fn spawn_upstream() -> Upstream {
    let state = UpstreamState {
        definitions: Arc::new(definitions()),
        instances: Arc::new(instances()),
        requests: Arc::new(Mutex::new(Vec::new())),
        failing: Arc::new(AtomicBool::new(false)),
    };

    let router = Router::new()
        .route("/projects/:project/entity-definitions", get(list_definitions))
        .route("/projects/:project/entity-definitions/:id", get(definition_config))
        .route("/projects/:project/entity-definitions/:id/instances", get(list_instances))
        .route("/projects/:project/entity-definitions/:id/instances/by-slug/:slug", get(instance_by_slug))
        .route("/auth/exchange", post(exchange))
        .route("/auth/session", get(session))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Upstream {
        base_url: format!("http://{}", addr),
        requests: state.requests,
        failing: state.failing,
    }
}

fn record(state: &UpstreamState, path: String, query: &HashMap<String, String>) {
    state.requests.lock().unwrap().push(Recorded {
        path,
        query: query.clone(),
    });
}

async fn list_definitions(
    State(state): State<UpstreamState>,
    Path(project): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    record(&state, format!("/projects/{}/entity-definitions", project), &query);
    Json(Value::Array(state.definitions.to_vec()))
}

async fn definition_config(
    State(state): State<UpstreamState>,
    Path((project, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, format!("/projects/{}/entity-definitions/{}", project, id), &query);
    match state.definitions.iter().find(|d| d["id"] == id.as_str()) {
        Some(definition) => Json(definition.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "definition not found"}))).into_response(),
    }
}

async fn list_instances(
    State(state): State<UpstreamState>,
    Path((project, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(&state, format!("/projects/{}/entity-definitions/{}/instances", project, id), &query);
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "database offline"}))).into_response();
    }

    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1).max(1);
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20).max(1);
    let search = query.get("search").map(|s| s.to_lowercase());
    let filters: HashMap<String, Vec<String>> = query
        .get("filters")
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();

    let matching: Vec<Value> = state
        .instances
        .get(&id)
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|record| match &search {
            Some(text) => record["name"].as_str().map_or(false, |n| n.to_lowercase().contains(text)),
            None => true,
        })
        .filter(|record| {
            filters.iter().all(|(field, ids)| {
                let value = &record[field.as_str()];
                let id = value.get("id").and_then(Value::as_str).or_else(|| value.as_str());
                id.map_or(false, |id| ids.iter().any(|wanted| wanted == id))
            })
        })
        .collect();

    let total = matching.len();
    let total_pages = (total + limit - 1) / limit;
    let data: Vec<Value> = matching.into_iter().skip((page - 1) * limit).take(limit).collect();

    Json(json!({
        "data": data,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total_pages,
            "hasNextPage": page < total_pages,
            "hasPreviousPage": page > 1,
        }
    }))
    .into_response()
}

async fn instance_by_slug(
    State(state): State<UpstreamState>,
    Path((project, id, slug)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(
        &state,
        format!("/projects/{}/entity-definitions/{}/instances/by-slug/{}", project, id, slug),
        &query,
    );
    let found = state
        .instances
        .get(&id)
        .and_then(|records| records.iter().find(|r| r["slug"] == slug.as_str()).cloned());
    match found {
        Some(instance) => Json(instance).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "instance not found"}))).into_response(),
    }
}

fn session_body() -> Value {
    json!({
        "accessToken": SESSION_TOKEN,
        "user": {"id": "u1", "email": "ada@example.com", "firstName": "Ada", "lastName": "Lovelace"}
    })
}

async fn exchange(State(state): State<UpstreamState>, Json(body): Json<Value>) -> Response {
    record(&state, "/auth/exchange".to_string(), &HashMap::new());
    if body["code"] == VALID_CODE {
        Json(session_body()).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "invalid code"}))).into_response()
    }
}

async fn session(State(state): State<UpstreamState>, headers: HeaderMap) -> Response {
    record(&state, "/auth/session".to_string(), &HashMap::new());
    let bearer = format!("Bearer {}", SESSION_TOKEN);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(value) if value == bearer => Json(session_body()).into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

pub fn test_config(upstream: &Upstream) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = upstream.base_url.clone();
    config.api.project_id = Some(PROJECT_ID.to_string());
    config.auth.service_url = upstream.base_url.clone();
    config.cache.retry_delay_ms = 10;
    config.server.enable_request_logging = false;
    config
}

/// App router talking to `upstream` over real HTTP
pub fn build_app(upstream: &Upstream) -> Router {
    let config = test_config(upstream);
    let api = HttpEntityApi::new(&config.api, PROJECT_ID).expect("entity api client");
    let auth = HttpAuthGateway::new(&config.auth).expect("auth gateway client");
    app(AppState::new(config, Arc::new(api), Arc::new(auth)))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("json body")
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get("location").and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// GET as the user the auth proxy identified as `u1`
pub async fn get_as_user(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .uri(uri)
        .header("x-user-id", "u1")
        .header("x-user-email", "ada@example.com")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_anonymous(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}
