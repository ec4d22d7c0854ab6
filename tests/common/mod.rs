#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use folio::config::AppConfig;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const CLIENT_EMAIL: &str = "client@example.com";
pub const PASSWORD: &str = "correct-horse";

/// Mint a credential the way the backend does
pub fn mint(id: &str, role: &str, expires_in_secs: i64) -> String {
    let claims = json!({
        "id": id,
        "email": format!("{}@example.com", id),
        "role": role,
        "exp": Utc::now().timestamp() + expires_in_secs,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend-only")).unwrap()
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_env();
    config.routing = Default::default();
    config.session = Default::default();
    config
}

#[derive(Default)]
pub struct Backend {
    pub projects: Mutex<Vec<Value>>,
    pub list_calls: AtomicUsize,
    pub last_authorization: Mutex<Option<String>>,
    next_id: AtomicUsize,
}

impl Backend {
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn seed(&self, title: &str) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.projects.lock().unwrap().push(json!({
            "_id": format!("p{}", id),
            "title": title,
            "description": format!("{} description", title),
        }));
    }
}

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if password != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid email or password" })));
    }
    let token = match email {
        ADMIN_EMAIL => mint("admin", "admin", 3600),
        CLIENT_EMAIL => mint("client", "client", 3600),
        _ => return (StatusCode::NOT_FOUND, Json(json!({ "error": "User not found" }))),
    };
    (StatusCode::OK, Json(json!({ "token": token })))
}

async fn list_projects(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Json<Value> {
    backend.list_calls.fetch_add(1, Ordering::SeqCst);
    *backend.last_authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(Value::Array(backend.projects.lock().unwrap().clone()))
}

async fn get_project(State(backend): State<Arc<Backend>>, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    let projects = backend.projects.lock().unwrap();
    match projects.iter().find(|p| p["_id"] == id.as_str()) {
        Some(project) => (StatusCode::OK, Json(project.clone())),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Project not found" }))),
    }
}

fn is_admin(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| folio::auth::decode_credential(token).ok())
        .map(|claims| claims.role == folio::auth::Role::Admin)
        .unwrap_or(false)
}

async fn read_fields(mut multipart: Multipart) -> serde_json::Map<String, Value> {
    let mut fields = serde_json::Map::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("image").to_string();
            let _ = field.bytes().await;
            fields.insert("image".to_string(), json!(format!("/uploads/{}", file_name)));
            continue;
        }
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, json!(value));
    }
    fields
}

async fn create_project(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    if !is_admin(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not authorized" })));
    }

    let mut project = read_fields(multipart).await;
    let id = backend.next_id.fetch_add(1, Ordering::SeqCst);
    project.insert("_id".to_string(), json!(format!("p{}", id)));
    let project = Value::Object(project);
    backend.projects.lock().unwrap().push(project.clone());

    (StatusCode::CREATED, Json(json!({ "message": "Project created", "project": project })))
}

async fn update_project(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    if !is_admin(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not authorized" })));
    }

    let fields = read_fields(multipart).await;
    let mut projects = backend.projects.lock().unwrap();
    match projects.iter_mut().find(|p| p["_id"] == id.as_str()) {
        Some(Value::Object(project)) => {
            project.extend(fields);
            let project = Value::Object(project.clone());
            (StatusCode::OK, Json(json!({ "message": "Project updated", "project": project })))
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "Project not found" }))),
    }
}

async fn delete_project(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if !is_admin(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Not authorized" })));
    }
    backend.projects.lock().unwrap().retain(|p| p["_id"] != id.as_str());
    (StatusCode::OK, Json(json!({ "message": "Project deleted" })))
}

/// Spawn a stub backend on an unused port inside the current runtime
pub async fn spawn_backend() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let backend = Arc::new(Backend::default());

    let app = Router::new()
        .route("/api/users/login", post(login))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind stub backend")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    // Give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(20)).await;

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}/api", port),
        backend,
    })
}
