use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job posting. `job_status` is a free-form string; `active` and `closed`
/// are the values the frontend uses, but no transition set is enforced.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub job_title: String,
    pub description: String,
    pub job_type: String,
    pub location: String,
    pub date_posted: DateTime<Utc>,
    pub application_deadline: Option<NaiveDate>,
    pub category: String,
    pub company_id: i64,
    pub experience_level: String,
    pub job_status: String,
    pub application_link: String,
}
