use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Idempotent schema bootstrap, run once at startup.
///
/// Duplicate detection lives here rather than in handler pre-checks: the
/// unique constraint on `users.email` and the partial unique index on active
/// applications turn concurrent identical inserts into constraint violations
/// the handlers map to typed errors.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        fullname VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        role VARCHAR(20) NOT NULL,
        date_created TIMESTAMPTZ NOT NULL DEFAULT now(),
        skills TEXT,
        location VARCHAR(100),
        experience_level VARCHAR(50),
        profile_picture VARCHAR(255),
        resume VARCHAR(255)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id BIGSERIAL PRIMARY KEY,
        company_name VARCHAR(100) NOT NULL,
        description TEXT NOT NULL,
        website_url VARCHAR(255) NOT NULL,
        company_size VARCHAR(50) NOT NULL,
        industry VARCHAR(100) NOT NULL,
        logo VARCHAR(255),
        contact_email VARCHAR(100) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id BIGSERIAL PRIMARY KEY,
        job_title VARCHAR(100) NOT NULL,
        description TEXT NOT NULL,
        job_type VARCHAR(50) NOT NULL,
        location VARCHAR(100) NOT NULL DEFAULT 'Remote',
        date_posted TIMESTAMPTZ NOT NULL DEFAULT now(),
        application_deadline DATE,
        category VARCHAR(100) NOT NULL,
        company_id BIGINT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
        experience_level VARCHAR(50) NOT NULL,
        job_status VARCHAR(20) NOT NULL DEFAULT 'active',
        application_link VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        job_id BIGINT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
        application_date TIMESTAMPTZ NOT NULL DEFAULT now(),
        status VARCHAR(50) NOT NULL DEFAULT 'applied',
        resume VARCHAR(255),
        cover_letter TEXT
    )
    "#,
    // Withdrawn rows are excluded so a user may re-apply after withdrawing.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS applications_user_job_active_idx
        ON applications (user_id, job_id)
        WHERE status <> 'withdrawn'
    "#,
];

/// Creates the tables if they don't exist. Runs once at startup; every
/// statement is idempotent.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
