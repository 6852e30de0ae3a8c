use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: i64,
    pub company_name: String,
    pub description: String,
    pub website_url: String,
    pub company_size: String,
    pub industry: String,
    pub logo: Option<String>,
    pub contact_email: String,
}
