use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job application. Observed status values: applied, submitted,
/// under_review, accepted, rejected, withdrawn. Withdrawal is a status
/// change, never a row delete.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub job_id: i64,
    pub application_date: DateTime<Utc>,
    pub status: String,
    pub resume: Option<String>,
    pub cover_letter: Option<String>,
}
