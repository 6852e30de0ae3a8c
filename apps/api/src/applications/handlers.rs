use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::application::Application;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ApplyRequest {
    pub job_id: Option<i64>,
    pub cover_letter: Option<String>,
}

/// POST /api/applications/apply
pub async fn apply_for_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let Some(job_id) = req.job_id else {
        return Err(AppError::MissingFields("job_id".into()));
    };

    let job_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?;
    if job_exists.is_none() {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    // One active application per (user, job). A withdrawn application frees
    // the slot, so re-applying after withdrawal succeeds.
    let application: Application = sqlx::query_as(
        r#"
        INSERT INTO applications (user_id, job_id, cover_letter, status)
        VALUES ($1, $2, $3, 'submitted')
        RETURNING *
        "#,
    )
    .bind(auth.id)
    .bind(job_id)
    .bind(&req.cover_letter)
    .fetch_one(&state.db)
    .await
    .map_err(map_apply_err)?;

    info!(
        "User {} applied to job {} (application {})",
        auth.id, job_id, application.id
    );
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/applications/:id
pub async fn get_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(application_id): Path<i64>,
) -> Result<Json<Application>, AppError> {
    let application = find_application(&state.db, application_id).await?;
    check_ownership(&state, auth, &application)?;
    Ok(Json(application))
}

/// GET /api/applications/user_applications
pub async fn user_applications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications: Vec<Application> =
        sqlx::query_as("SELECT * FROM applications WHERE user_id = $1 ORDER BY id")
            .bind(auth.id)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(applications))
}

/// DELETE /api/applications/:id
///
/// Withdrawal is a status change, not a row delete; the updated application
/// is returned.
pub async fn withdraw_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(application_id): Path<i64>,
) -> Result<Json<Application>, AppError> {
    let application = find_application(&state.db, application_id).await?;
    check_ownership(&state, auth, &application)?;

    let application: Application =
        sqlx::query_as("UPDATE applications SET status = 'withdrawn' WHERE id = $1 RETURNING *")
            .bind(application_id)
            .fetch_one(&state.db)
            .await?;

    info!("Application {} withdrawn", application.id);
    Ok(Json(application))
}

async fn find_application(db: &PgPool, id: i64) -> Result<Application, AppError> {
    sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
}

/// By default any authenticated user may fetch or withdraw any application
/// by id. ENFORCE_OWNERSHIP=true turns on the owner-scoped variant.
fn check_ownership(
    state: &AppState,
    auth: AuthUser,
    application: &Application,
) -> Result<(), AppError> {
    if state.config.enforce_ownership && application.user_id != auth.id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn map_apply_err(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::DuplicateApplication;
        }
        if db.is_foreign_key_violation() {
            return AppError::NotFound("Job not found".to_string());
        }
    }
    AppError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::search::JobSearchProvider;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::Value;
    use std::sync::Arc;

    struct NoSearch;

    #[async_trait]
    impl JobSearchProvider for NoSearch {
        async fn search(&self, _query: &str) -> Result<Value, AppError> {
            Err(AppError::SearchUnavailable)
        }
    }

    fn test_state(enforce_ownership: bool) -> AppState {
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
                enforce_ownership,
            },
            search: Arc::new(NoSearch),
        }
    }

    fn application_owned_by(user_id: i64) -> Application {
        Application {
            id: 1,
            user_id,
            job_id: 7,
            application_date: Utc::now(),
            status: "submitted".to_string(),
            resume: None,
            cover_letter: None,
        }
    }

    #[tokio::test]
    async fn test_permissive_mode_allows_any_user() {
        let state = test_state(false);
        let application = application_owned_by(1);
        assert!(check_ownership(&state, AuthUser { id: 2 }, &application).is_ok());
    }

    #[tokio::test]
    async fn test_enforcing_mode_rejects_other_users() {
        let state = test_state(true);
        let application = application_owned_by(1);
        assert!(matches!(
            check_ownership(&state, AuthUser { id: 2 }, &application),
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_enforcing_mode_allows_owner() {
        let state = test_state(true);
        let application = application_owned_by(2);
        assert!(check_ownership(&state, AuthUser { id: 2 }, &application).is_ok());
    }
}
