pub mod memory;

use std::env;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::CatalogError;
use crate::models::{
    Course, CourseInstance, CoursePayload, InstanceKey, InstancePayload, Semester, YearWindow,
};

pub use memory::InMemoryCatalog;

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: String,
    pub year_span: i32,
}

impl CatalogConfig {
    pub fn new_from_env() -> Result<Self, CatalogError> {
        let base_url = env::var("CATALOG_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let year_span = match env::var("CATALOG_YEAR_SPAN") {
            Ok(raw) => raw.parse().map_err(|_| {
                CatalogError::Validation(format!("CATALOG_YEAR_SPAN is not a number: {}", raw))
            })?,
            Err(_) => YearWindow::DEFAULT_SPAN,
        };

        Ok(Self {
            base_url,
            year_span,
        })
    }

    pub fn year_window(&self) -> YearWindow {
        YearWindow {
            span: self.year_span,
        }
    }
}

/// The operation set the admin front end needs against the remote store,
/// independent of transport. Courses are addressed by their server-assigned
/// id, instances by the natural composite key, end to end. All calls are
/// plain request/response; retry and backoff, if any, belong to the
/// transport collaborator, not here.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError>;
    async fn get_course(&self, id: i64) -> Result<Course, CatalogError>;
    async fn create_course(&self, payload: &CoursePayload) -> Result<Course, CatalogError>;
    async fn update_course(
        &self,
        id: i64,
        payload: &CoursePayload,
    ) -> Result<Course, CatalogError>;
    async fn delete_course(&self, id: i64) -> Result<(), CatalogError>;

    async fn list_instances(&self) -> Result<Vec<CourseInstance>, CatalogError>;
    async fn list_instances_for_term(
        &self,
        year: i32,
        semester: Semester,
    ) -> Result<Vec<CourseInstance>, CatalogError>;
    async fn get_instance(&self, key: &InstanceKey) -> Result<CourseInstance, CatalogError>;
    async fn create_instance(
        &self,
        payload: &InstancePayload,
    ) -> Result<CourseInstance, CatalogError>;
    async fn update_instance(
        &self,
        key: &InstanceKey,
        payload: &InstancePayload,
    ) -> Result<CourseInstance, CatalogError>;
    async fn delete_instance(&self, key: &InstanceKey) -> Result<(), CatalogError>;
}

/// HTTP/JSON implementation of the catalog contract.
pub struct CatalogHttpClient {
    client: Client,
    config: CatalogConfig,
}

impl CatalogHttpClient {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn instance_path(key: &InstanceKey) -> String {
        format!(
            "/api/instances/{}/{}/{}",
            key.year,
            key.semester.code(),
            key.course_id
        )
    }

    /// Maps the service's failure statuses onto the error taxonomy. The body
    /// text is carried through for conflict and validation responses so the
    /// UI can show the service's own message.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => CatalogError::NotFound,
            StatusCode::CONFLICT => CatalogError::Conflict(body),
            StatusCode::BAD_REQUEST => CatalogError::Validation(body),
            _ => CatalogError::Transport(format!("catalog service error {}: {}", status, body)),
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CatalogError> {
        let response = Self::check(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("failed to decode catalog response: {}", e);
            CatalogError::Transport(format!("malformed catalog response: {}", e))
        })
    }
}

#[async_trait]
impl CatalogApi for CatalogHttpClient {
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError> {
        let response = self.client.get(self.url("/api/courses")).send().await?;
        Self::decode(response).await
    }

    async fn get_course(&self, id: i64) -> Result<Course, CatalogError> {
        let response = self
            .client
            .get(self.url(&format!("/api/courses/{}", id)))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn create_course(&self, payload: &CoursePayload) -> Result<Course, CatalogError> {
        let response = self
            .client
            .post(self.url("/api/courses"))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_course(
        &self,
        id: i64,
        payload: &CoursePayload,
    ) -> Result<Course, CatalogError> {
        let response = self
            .client
            .put(self.url(&format!("/api/courses/{}", id)))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_course(&self, id: i64) -> Result<(), CatalogError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/courses/{}", id)))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_instances(&self) -> Result<Vec<CourseInstance>, CatalogError> {
        let response = self.client.get(self.url("/api/instances")).send().await?;
        Self::decode(response).await
    }

    async fn list_instances_for_term(
        &self,
        year: i32,
        semester: Semester,
    ) -> Result<Vec<CourseInstance>, CatalogError> {
        let response = self
            .client
            .get(self.url(&format!("/api/instances/{}/{}", year, semester.code())))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get_instance(&self, key: &InstanceKey) -> Result<CourseInstance, CatalogError> {
        let response = self
            .client
            .get(self.url(&Self::instance_path(key)))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn create_instance(
        &self,
        payload: &InstancePayload,
    ) -> Result<CourseInstance, CatalogError> {
        let response = self
            .client
            .post(self.url("/api/instances"))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_instance(
        &self,
        key: &InstanceKey,
        payload: &InstancePayload,
    ) -> Result<CourseInstance, CatalogError> {
        let response = self
            .client
            .put(self.url(&Self::instance_path(key)))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_instance(&self, key: &InstanceKey) -> Result<(), CatalogError> {
        let response = self
            .client
            .delete(self.url(&Self::instance_path(key)))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
