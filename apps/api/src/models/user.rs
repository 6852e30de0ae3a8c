use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row. Deliberately not `Serialize`: the password hash must never
/// leave the process. Responses go through [`UserPublic`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub date_created: DateTime<Utc>,
    pub skills: Option<String>,
    pub location: Option<String>,
    pub experience_level: Option<String>,
    pub profile_picture: Option<String>,
    pub resume: Option<String>,
}

/// The public projection of a user returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub role: String,
    pub date_created: DateTime<Utc>,
    pub skills: Option<String>,
    pub location: Option<String>,
    pub experience_level: Option<String>,
    pub profile_picture: Option<String>,
    pub resume: Option<String>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            fullname: user.fullname,
            email: user.email,
            role: user.role,
            date_created: user.date_created,
            skills: user.skills,
            location: user.location,
            experience_level: user.experience_level,
            profile_picture: user.profile_picture,
            resume: user.resume,
        }
    }
}
