//! HTTP boundary to the portfolio backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::error::{AuthError, NetworkError};
use crate::projects::{Project, ProjectApi, ProjectForm};
use crate::session::{AuthApi, SessionStore};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectEnvelope {
    project: Project,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

/// reqwest client for the auth and project endpoints.
///
/// Reads the stored credential to attach a bearer header; never writes it.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Option<Arc<SessionStore>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NetworkError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| NetworkError::Transport(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(NetworkError::Transport(format!("invalid base URL '{}'", base_url)));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NetworkError::from)?;

        Ok(Self {
            http,
            base_url,
            session: None,
        })
    }

    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.as_ref().and_then(|s| s.credential()) {
            Some(credential) => request.bearer_auth(credential),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, NetworkError> {
        let response = self.authorize(request).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        Err(NetworkError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// `{error}` first, then `{message}`
fn error_message(body: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str).filter(|msg| !msg.is_empty()))
        .map(str::to_string)
}

fn multipart(form: &ProjectForm) -> Form {
    let mut multipart = Form::new();
    for (name, value) in form.text_fields() {
        multipart = multipart.text(name, value);
    }
    if let Some(image) = &form.image {
        let part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        multipart = multipart.part("image", part);
    }
    multipart
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let request = self
            .http
            .post(self.endpoint(&["users", "login"]))
            .json(&json!({ "email": email, "password": password }));

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Login request failed: {}", e);
                return Err(AuthError::authentication_failed(None));
            }
        };

        if !response.status().is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            let message = body.get("error").and_then(Value::as_str).map(str::to_string);
            return Err(AuthError::authentication_failed(message));
        }

        match response.json::<LoginResponse>().await {
            Ok(LoginResponse { token: Some(token) }) if !token.is_empty() => Ok(token),
            _ => Err(AuthError::authentication_failed(None)),
        }
    }
}

#[async_trait]
impl ProjectApi for ApiClient {
    async fn list(&self) -> Result<Vec<Project>, NetworkError> {
        let response = self.send(self.http.get(self.endpoint(&["projects"]))).await?;
        Ok(response.json().await?)
    }

    async fn get(&self, id: &str) -> Result<Project, NetworkError> {
        let response = self.send(self.http.get(self.endpoint(&["projects", id]))).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, form: &ProjectForm) -> Result<Project, NetworkError> {
        let request = self
            .http
            .post(self.endpoint(&["projects"]))
            .multipart(multipart(form));
        let envelope: ProjectEnvelope = self.send(request).await?.json().await?;
        Ok(envelope.project)
    }

    async fn update(&self, id: &str, form: &ProjectForm) -> Result<Project, NetworkError> {
        let request = self
            .http
            .put(self.endpoint(&["projects", id]))
            .multipart(multipart(form));
        let envelope: ProjectEnvelope = self.send(request).await?.json().await?;
        Ok(envelope.project)
    }

    async fn delete(&self, id: &str) -> Result<String, NetworkError> {
        let response = self.send(self.http.delete(self.endpoint(&["projects", id]))).await?;
        let body: MessageResponse = response.json().await?;
        Ok(body.message)
    }
}
