//! In-process mock of the remote catalog service, backed by
//! `InMemoryCatalog`, exposing the same wire table the real service does.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use catalog_admin::catalog::{CatalogApi, CatalogConfig, CatalogHttpClient, InMemoryCatalog};
use catalog_admin::error::CatalogError;
use catalog_admin::models::{
    Course, CourseInstance, CoursePayload, InstanceKey, InstancePayload, Semester, YearWindow,
};

pub struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            CatalogError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            CatalogError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            CatalogError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            CatalogError::ReferenceNotFound(key) => {
                (StatusCode::BAD_REQUEST, format!("unresolved reference: {}", key))
            }
            CatalogError::UnknownSemester(code) => {
                (StatusCode::BAD_REQUEST, format!("unknown semester code: {}", code))
            }
            CatalogError::Transport(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, message).into_response()
    }
}

type Catalog = Arc<InMemoryCatalog>;

pub fn router(catalog: Catalog) -> Router {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route(
            "/api/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/api/instances", get(list_instances).post(create_instance))
        .route("/api/instances/{year}/{semester}", get(list_term))
        .route(
            "/api/instances/{year}/{semester}/{course_id}",
            get(get_instance).put(update_instance).delete(delete_instance),
        )
        .with_state(catalog)
}

/// Binds the mock service on an ephemeral port and returns its base url plus
/// a handle to the backing store for out-of-band edits.
pub async fn spawn() -> (String, Catalog) {
    let catalog = Arc::new(InMemoryCatalog::new());
    let app = router(catalog.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock catalog server");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock catalog server died");
    });
    (format!("http://{}", addr), catalog)
}

pub async fn spawn_client() -> (CatalogHttpClient, Catalog) {
    let (base_url, catalog) = spawn().await;
    let config = CatalogConfig {
        base_url,
        year_span: YearWindow::DEFAULT_SPAN,
    };
    let client = CatalogHttpClient::new(config).expect("failed to build catalog client");
    (client, catalog)
}

async fn list_courses(State(catalog): State<Catalog>) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(catalog.list_courses().await?))
}

async fn create_course(
    State(catalog): State<Catalog>,
    Json(payload): Json<CoursePayload>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let created = catalog.create_course(&payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_course(
    State(catalog): State<Catalog>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, ApiError> {
    Ok(Json(catalog.get_course(id).await?))
}

async fn update_course(
    State(catalog): State<Catalog>,
    Path(id): Path<i64>,
    Json(payload): Json<CoursePayload>,
) -> Result<Json<Course>, ApiError> {
    Ok(Json(catalog.update_course(id, &payload).await?))
}

async fn delete_course(
    State(catalog): State<Catalog>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    catalog.delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_instances(
    State(catalog): State<Catalog>,
) -> Result<Json<Vec<CourseInstance>>, ApiError> {
    Ok(Json(catalog.list_instances().await?))
}

async fn create_instance(
    State(catalog): State<Catalog>,
    Json(payload): Json<InstancePayload>,
) -> Result<(StatusCode, Json<CourseInstance>), ApiError> {
    let created = catalog.create_instance(&payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_term(
    State(catalog): State<Catalog>,
    Path((year, code)): Path<(i32, i32)>,
) -> Result<Json<Vec<CourseInstance>>, ApiError> {
    let semester = Semester::from_code(code)?;
    Ok(Json(catalog.list_instances_for_term(year, semester).await?))
}

fn key_from_path(year: i32, code: i32, course_id: String) -> Result<InstanceKey, ApiError> {
    Ok(InstanceKey {
        year,
        semester: Semester::from_code(code)?,
        course_id,
    })
}

async fn get_instance(
    State(catalog): State<Catalog>,
    Path((year, code, course_id)): Path<(i32, i32, String)>,
) -> Result<Json<CourseInstance>, ApiError> {
    let key = key_from_path(year, code, course_id)?;
    Ok(Json(catalog.get_instance(&key).await?))
}

async fn update_instance(
    State(catalog): State<Catalog>,
    Path((year, code, course_id)): Path<(i32, i32, String)>,
    Json(payload): Json<InstancePayload>,
) -> Result<Json<CourseInstance>, ApiError> {
    let key = key_from_path(year, code, course_id)?;
    Ok(Json(catalog.update_instance(&key, &payload).await?))
}

async fn delete_instance(
    State(catalog): State<Catalog>,
    Path((year, code, course_id)): Path<(i32, i32, String)>,
) -> Result<StatusCode, ApiError> {
    let key = key_from_path(year, code, course_id)?;
    catalog.delete_instance(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
