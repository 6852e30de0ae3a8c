use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::issue_token;
use crate::auth::{authorize_self, AuthUser};
use crate::errors::AppError;
use crate::models::user::{User, UserPublic};
use crate::state::AppState;
use crate::uploads::store_if_allowed;

// ────────────────────────────────────────────────────────────────────────────
// Multipart form collection
// ────────────────────────────────────────────────────────────────────────────

/// The allow-listed field set for registration and update. Anything else in
/// the form is dropped; clients cannot reach arbitrary columns.
#[derive(Default)]
struct UserForm {
    fullname: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
    skills: Option<String>,
    location: Option<String>,
    experience_level: Option<String>,
    profile_picture: Option<(String, Bytes)>,
    resume: Option<(String, Bytes)>,
}

async fn collect_user_form(multipart: &mut Multipart) -> Result<UserForm, AppError> {
    let mut form = UserForm::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "fullname" => form.fullname = Some(field.text().await.map_err(malformed)?),
            "email" => form.email = Some(field.text().await.map_err(malformed)?),
            "password" => form.password = Some(field.text().await.map_err(malformed)?),
            "role" => form.role = Some(field.text().await.map_err(malformed)?),
            "skills" => form.skills = Some(field.text().await.map_err(malformed)?),
            "location" => form.location = Some(field.text().await.map_err(malformed)?),
            "experience_level" => {
                form.experience_level = Some(field.text().await.map_err(malformed)?)
            }
            "profile_picture" | "resume" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(malformed)?;
                if name == "profile_picture" {
                    form.profile_picture = Some((filename, data));
                } else {
                    form.resume = Some((filename, data));
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("malformed multipart request: {e}"))
}

/// Stores both optional attachments, silently skipping disallowed ones.
async fn store_attachments(
    upload_dir: &str,
    profile_picture: Option<(String, Bytes)>,
    resume: Option<(String, Bytes)>,
) -> Result<(Option<String>, Option<String>), AppError> {
    let dir = std::path::Path::new(upload_dir);
    let mut stored_picture = None;
    if let Some((filename, data)) = profile_picture {
        stored_picture = store_if_allowed(dir, &filename, data).await?;
    }
    let mut stored_resume = None;
    if let Some((filename, data)) = resume {
        stored_resume = store_if_allowed(dir, &filename, data).await?;
    }
    Ok((stored_picture, stored_resume))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/users/register
pub async fn register_user(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UserPublic>), AppError> {
    let form = collect_user_form(&mut multipart).await?;
    let (Some(fullname), Some(email), Some(password)) = (form.fullname, form.email, form.password)
    else {
        return Err(AppError::MissingFields("fullname, email, password".into()));
    };
    let role = form.role.unwrap_or_else(|| "job_seeker".to_string());
    let password_hash = hash_password(&password)?;

    let (profile_picture, resume) =
        store_attachments(&state.config.upload_dir, form.profile_picture, form.resume).await?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (fullname, email, password_hash, role, profile_picture, resume)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&fullname)
    .bind(&email)
    .bind(&password_hash)
    .bind(&role)
    .bind(&profile_picture)
    .bind(&resume)
    .fetch_one(&state.db)
    .await
    .map_err(map_unique_email)?;

    info!("Registered user {} ({})", user.id, user.email);
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(AppError::MissingFields("email, password".into()));
    };

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    // Unknown email and wrong password produce the same error.
    let Some(user) = user else {
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let access_token = issue_token(user.id, &state.config.jwt_secret)?;
    info!("User {} logged in", user.id);

    Ok(Json(json!({
        "message": "Login successful",
        "access_token": access_token,
        "user": UserPublic::from(user)
    })))
}

/// GET /api/users/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let user = find_user(&state.db, auth.id).await?;
    Ok(Json(json!({ "user": UserPublic::from(user) })))
}

#[derive(Deserialize)]
pub struct ListUsersParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub items: Vec<UserPublic>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<UserListResponse>, AppError> {
    let (page, per_page, offset) = page_window(params.page, params.per_page);
    let pattern = format!("%{}%", params.search.as_deref().unwrap_or(""));

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE fullname ILIKE $1")
        .bind(&pattern)
        .fetch_one(&state.db)
        .await?;

    let users: Vec<User> =
        sqlx::query_as("SELECT * FROM users WHERE fullname ILIKE $1 ORDER BY id LIMIT $2 OFFSET $3")
            .bind(&pattern)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(UserListResponse {
        items: users.into_iter().map(UserPublic::from).collect(),
        total,
        page,
        per_page,
    }))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserPublic>, AppError> {
    Ok(Json(find_user(&state.db, user_id).await?.into()))
}

/// PUT /api/users/:id
///
/// Self-only. The multipart form is applied as an allow-listed patch: absent
/// fields keep their stored values, a supplied `password` is re-hashed, and
/// attachments go through the same lenient storage path as registration.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<UserPublic>, AppError> {
    authorize_self(auth.id, user_id)?;

    let form = collect_user_form(&mut multipart).await?;
    let password_hash = match form.password.as_deref() {
        Some(p) => Some(hash_password(p)?),
        None => None,
    };
    let (profile_picture, resume) =
        store_attachments(&state.config.upload_dir, form.profile_picture, form.resume).await?;

    let user: Option<User> = sqlx::query_as(
        r#"
        UPDATE users SET
            fullname = COALESCE($2, fullname),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            role = COALESCE($5, role),
            skills = COALESCE($6, skills),
            location = COALESCE($7, location),
            experience_level = COALESCE($8, experience_level),
            profile_picture = COALESCE($9, profile_picture),
            resume = COALESCE($10, resume)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&form.fullname)
    .bind(&form.email)
    .bind(&password_hash)
    .bind(&form.role)
    .bind(&form.skills)
    .bind(&form.location)
    .bind(&form.experience_level)
    .bind(&profile_picture)
    .bind(&resume)
    .fetch_optional(&state.db)
    .await
    .map_err(map_unique_email)?;

    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    info!("Updated user {}", user.id);
    Ok(Json(user.into()))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    authorize_self(auth.id, user_id)?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    info!("Deleted user {user_id}");
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn find_user(db: &PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

fn map_unique_email(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::DuplicateEmail;
        }
    }
    AppError::Database(e)
}

/// Pagination window: 1-based page, defaults page=1 / per_page=10.
fn page_window(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(10).max(1);
    (page, per_page, (page - 1) * per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_defaults() {
        assert_eq!(page_window(None, None), (1, 10, 0));
    }

    #[test]
    fn test_page_window_second_page() {
        // 12 seeded users at per_page=5: page 2 covers rows 6-10.
        assert_eq!(page_window(Some(2), Some(5)), (2, 5, 5));
    }

    #[test]
    fn test_page_window_clamps_nonpositive() {
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(-3), Some(-1)), (1, 1, 0));
    }

    #[test]
    fn test_page_window_large_page() {
        let (page, per_page, offset) = page_window(Some(100), Some(10));
        assert_eq!((page, per_page), (100, 10));
        assert_eq!(offset, 990);
    }
}
