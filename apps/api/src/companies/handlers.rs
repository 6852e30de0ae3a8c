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
use crate::models::company::Company;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateCompanyRequest {
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub contact_email: Option<String>,
    pub logo: Option<String>,
}

/// POST /api/companies
pub async fn create_company(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    let (
        Some(company_name),
        Some(description),
        Some(website_url),
        Some(company_size),
        Some(industry),
        Some(contact_email),
    ) = (
        req.company_name,
        req.description,
        req.website_url,
        req.company_size,
        req.industry,
        req.contact_email,
    )
    else {
        return Err(AppError::MissingFields(
            "company_name, description, website_url, company_size, industry, contact_email".into(),
        ));
    };

    let company: Company = sqlx::query_as(
        r#"
        INSERT INTO companies
            (company_name, description, website_url, company_size, industry, logo, contact_email)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&company_name)
    .bind(&description)
    .bind(&website_url)
    .bind(&company_size)
    .bind(&industry)
    .bind(&req.logo)
    .bind(&contact_email)
    .fetch_one(&state.db)
    .await?;

    info!("Created company {} ({})", company.id, company.company_name);
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/companies. Public.
pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<Company>>, AppError> {
    let companies: Vec<Company> = sqlx::query_as("SELECT * FROM companies ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(companies))
}

/// GET /api/companies/:id. Public.
pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<i64>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(find_company(&state.db, company_id).await?))
}

/// Allow-listed patch: absent fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub logo: Option<String>,
    pub contact_email: Option<String>,
}

/// PUT /api/companies/:id
pub async fn update_company(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<Company>, AppError> {
    let company: Option<Company> = sqlx::query_as(
        r#"
        UPDATE companies SET
            company_name = COALESCE($2, company_name),
            description = COALESCE($3, description),
            website_url = COALESCE($4, website_url),
            company_size = COALESCE($5, company_size),
            industry = COALESCE($6, industry),
            logo = COALESCE($7, logo),
            contact_email = COALESCE($8, contact_email)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(company_id)
    .bind(&req.company_name)
    .bind(&req.description)
    .bind(&req.website_url)
    .bind(&req.company_size)
    .bind(&req.industry)
    .bind(&req.logo)
    .bind(&req.contact_email)
    .fetch_optional(&state.db)
    .await?;

    let company = company.ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;
    info!("Updated company {}", company.id);
    Ok(Json(company))
}

/// DELETE /api/companies/:id
pub async fn delete_company(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(company_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(company_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Company not found".to_string()));
    }

    info!("Deleted company {company_id}");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_company(db: &PgPool, id: i64) -> Result<Company, AppError> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))
}
