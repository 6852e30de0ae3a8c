use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::job::Job;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /api/jobs/search. Public; a pure pass-through to the external gateway.
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, AppError> {
    let query = params.q.unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::MissingFields("q".into()));
    }
    let results = state.search.search(&query).await?;
    Ok(Json(results))
}

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub company_id: Option<i64>,
    pub experience_level: Option<String>,
    pub application_link: Option<String>,
    pub location: Option<String>,
    pub application_deadline: Option<NaiveDate>,
}

/// POST /api/jobs
///
/// `location` defaults to "Remote"; `job_status` and `date_posted` come from
/// the schema defaults. A dangling `company_id` fails the foreign key and is
/// reported as a company `NotFound`.
pub async fn create_job(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let (
        Some(job_title),
        Some(description),
        Some(job_type),
        Some(category),
        Some(company_id),
        Some(experience_level),
        Some(application_link),
    ) = (
        req.job_title,
        req.description,
        req.job_type,
        req.category,
        req.company_id,
        req.experience_level,
        req.application_link,
    )
    else {
        return Err(AppError::MissingFields(
            "job_title, description, job_type, category, company_id, experience_level, application_link".into(),
        ));
    };
    let location = req.location.unwrap_or_else(|| "Remote".to_string());

    let job: Job = sqlx::query_as(
        r#"
        INSERT INTO jobs
            (job_title, description, job_type, location, application_deadline,
             category, company_id, experience_level, application_link)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(&job_title)
    .bind(&description)
    .bind(&job_type)
    .bind(&location)
    .bind(req.application_deadline)
    .bind(&category)
    .bind(company_id)
    .bind(&experience_level)
    .bind(&application_link)
    .fetch_one(&state.db)
    .await
    .map_err(map_company_fk)?;

    info!("Created job {} ({})", job.id, job.job_title);
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs: Vec<Job> = sqlx::query_as("SELECT * FROM jobs ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(jobs))
}

/// GET /api/jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(job_id): Path<i64>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(find_job(&state.db, job_id).await?))
}

/// Allow-listed patch. `company_id` is deliberately absent: a posting cannot
/// be moved to another company through the update path.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub category: Option<String>,
    pub experience_level: Option<String>,
    pub job_status: Option<String>,
    pub application_link: Option<String>,
}

/// PUT /api/jobs/:id
pub async fn update_job(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(job_id): Path<i64>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<Job>, AppError> {
    let job: Option<Job> = sqlx::query_as(
        r#"
        UPDATE jobs SET
            job_title = COALESCE($2, job_title),
            description = COALESCE($3, description),
            job_type = COALESCE($4, job_type),
            location = COALESCE($5, location),
            application_deadline = COALESCE($6, application_deadline),
            category = COALESCE($7, category),
            experience_level = COALESCE($8, experience_level),
            job_status = COALESCE($9, job_status),
            application_link = COALESCE($10, application_link)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(&req.job_title)
    .bind(&req.description)
    .bind(&req.job_type)
    .bind(&req.location)
    .bind(req.application_deadline)
    .bind(&req.category)
    .bind(&req.experience_level)
    .bind(&req.job_status)
    .bind(&req.application_link)
    .fetch_optional(&state.db)
    .await?;

    let job = job.ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    info!("Updated job {}", job.id);
    Ok(Json(job))
}

/// DELETE /api/jobs/:id
pub async fn delete_job(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(job_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    info!("Deleted job {job_id}");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_job(db: &PgPool, id: i64) -> Result<Job, AppError> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

fn map_company_fk(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_foreign_key_violation() {
            return AppError::NotFound("Company not found".to_string());
        }
    }
    AppError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::routes::build_router;
    use crate::search::JobSearchProvider;
    use crate::state::AppState;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn test_update_patch_has_no_company_id() {
        // A company_id in the body is dropped, not applied.
        let patch: UpdateJobRequest = serde_json::from_value(json!({
            "job_title": "Senior Engineer",
            "company_id": 999
        }))
        .unwrap();
        assert_eq!(patch.job_title.as_deref(), Some("Senior Engineer"));
    }

    #[test]
    fn test_create_request_deadline_parses_dates() {
        let req: CreateJobRequest = serde_json::from_value(json!({
            "job_title": "Engineer",
            "application_deadline": "2026-12-31"
        }))
        .unwrap();
        assert_eq!(
            req.application_deadline,
            NaiveDate::from_ymd_opt(2026, 12, 31)
        );
    }

    struct StubSearch(Value);

    #[async_trait]
    impl JobSearchProvider for StubSearch {
        async fn search(&self, _query: &str) -> Result<Value, AppError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl JobSearchProvider for FailingSearch {
        async fn search(&self, _query: &str) -> Result<Value, AppError> {
            Err(AppError::SearchUnavailable)
        }
    }

    fn test_state(search: Arc<dyn JobSearchProvider>) -> AppState {
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        AppState {
            db,
            config: Config {
                database_url: "postgres://localhost/unused".into(),
                jwt_secret: "test-secret".into(),
                apijobs_api_key: "test-key".into(),
                upload_dir: "./uploads".into(),
                port: 0,
                rust_log: "info".into(),
                enforce_ownership: false,
            },
            search,
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_relays_provider_json() {
        let hits = json!({"hits": [{"title": "Rust Engineer"}], "count": 1});
        let app = build_router(test_state(Arc::new(StubSearch(hits.clone()))));

        let response = app.oneshot(get("/api/jobs/search?q=rust")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, hits);
    }

    #[tokio::test]
    async fn test_search_without_query_rejected() {
        let app = build_router(test_state(Arc::new(StubSearch(json!({})))));

        let response = app.oneshot(get("/api/jobs/search")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "MISSING_FIELDS");
    }

    #[tokio::test]
    async fn test_search_provider_failure_is_bad_gateway() {
        let app = build_router(test_state(Arc::new(FailingSearch)));

        let response = app.oneshot(get("/api/jobs/search?q=rust")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "SEARCH_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_list_jobs_requires_token() {
        let app = build_router(test_state(Arc::new(StubSearch(json!({})))));

        let response = app.oneshot(get("/api/jobs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_bearer_token_rejected() {
        let app = build_router(test_state(Arc::new(StubSearch(json!({})))));

        let request = Request::builder()
            .method("GET")
            .uri("/api/jobs")
            .header("authorization", "Bearer not.a.jwt")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
