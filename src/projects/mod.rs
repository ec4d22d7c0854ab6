pub mod cache;

pub use cache::{ProjectCache, ProjectCacheEntry};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::NetworkError;

/// Portfolio project as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_demo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Image attached to a create/update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Multipart payload for create and update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub github_link: Option<String>,
    pub live_demo: Option<String>,
    pub image: Option<ImageUpload>,
}

impl ProjectForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Text fields in wire order; empty optional links are omitted
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
        ];
        if let Some(link) = self.github_link.as_ref().filter(|l| !l.is_empty()) {
            fields.push(("githubLink", link.clone()));
        }
        if let Some(link) = self.live_demo.as_ref().filter(|l| !l.is_empty()) {
            fields.push(("liveDemo", link.clone()));
        }
        fields
    }
}

/// Project listing and mutation endpoint
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Project>, NetworkError>;
    async fn get(&self, id: &str) -> Result<Project, NetworkError>;
    async fn create(&self, form: &ProjectForm) -> Result<Project, NetworkError>;
    async fn update(&self, id: &str, form: &ProjectForm) -> Result<Project, NetworkError>;
    /// Returns the server's confirmation message
    async fn delete(&self, id: &str) -> Result<String, NetworkError>;
}

/// Project reads through the cache; every write invalidates it
pub struct ProjectService {
    api: Arc<dyn ProjectApi>,
    cache: Arc<ProjectCache>,
}

impl ProjectService {
    pub fn new(api: Arc<dyn ProjectApi>, cache: Arc<ProjectCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &Arc<ProjectCache> {
        &self.cache
    }

    pub async fn list(&self) -> Result<Arc<Vec<Project>>, NetworkError> {
        self.cache.read().await
    }

    pub async fn get(&self, id: &str) -> Result<Project, NetworkError> {
        self.api.get(id).await
    }

    pub async fn create(&self, form: &ProjectForm) -> Result<Project, NetworkError> {
        let project = self.api.create(form).await?;
        self.cache.invalidate();
        info!("Created project {:?}", project.id);
        Ok(project)
    }

    pub async fn update(&self, id: &str, form: &ProjectForm) -> Result<Project, NetworkError> {
        let project = self.api.update(id, form).await?;
        self.cache.invalidate();
        info!("Updated project {}", id);
        Ok(project)
    }

    pub async fn delete(&self, id: &str) -> Result<String, NetworkError> {
        let message = self.api.delete(id).await?;
        self.cache.invalidate();
        info!("Deleted project {}", id);
        Ok(message)
    }
}
