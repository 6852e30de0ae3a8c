pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{applications, companies, jobs, uploads, users};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users
        .route("/api/users/register", post(users::handlers::register_user))
        .route("/api/users/login", post(users::handlers::login))
        .route("/api/users/dashboard", get(users::handlers::dashboard))
        .route("/api/users", get(users::handlers::list_users))
        .route(
            "/api/users/:id",
            get(users::handlers::get_user)
                .put(users::handlers::update_user)
                .delete(users::handlers::delete_user),
        )
        // Companies
        .route(
            "/api/companies",
            get(companies::handlers::list_companies).post(companies::handlers::create_company),
        )
        .route(
            "/api/companies/:id",
            get(companies::handlers::get_company)
                .put(companies::handlers::update_company)
                .delete(companies::handlers::delete_company),
        )
        // Jobs
        .route("/api/jobs/search", get(jobs::handlers::search_jobs))
        .route(
            "/api/jobs",
            get(jobs::handlers::list_jobs).post(jobs::handlers::create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handlers::get_job)
                .put(jobs::handlers::update_job)
                .delete(jobs::handlers::delete_job),
        )
        // Applications
        .route(
            "/api/applications/apply",
            post(applications::handlers::apply_for_job),
        )
        .route(
            "/api/applications/user_applications",
            get(applications::handlers::user_applications),
        )
        .route(
            "/api/applications/:id",
            get(applications::handlers::get_application)
                .delete(applications::handlers::withdraw_application),
        )
        // File upload
        .route("/api/upload", post(uploads::upload_file))
        .with_state(state)
}
