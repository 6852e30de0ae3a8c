//! File-upload handling: extension allow-list, filename sanitization, and
//! the `/api/upload` endpoint. Uploaded bytes land under `UPLOAD_DIR`
//! (created at startup); callers associate the returned filename with the
//! owning entity themselves.

use std::path::Path;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

/// Extensions accepted for profile pictures and resumes.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf", "doc", "docx"];

/// True if the filename has an extension on the allow-list.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Strips path components and non-portable characters from a client-supplied
/// filename. The result never escapes the upload directory.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches('.').to_string()
}

/// Strict storage path used by `/api/upload`: every failure is a typed error.
pub async fn store_file(dir: &Path, filename: &str, data: Bytes) -> Result<String, AppError> {
    if filename.is_empty() {
        return Err(AppError::EmptyFilename);
    }
    let name = sanitize_filename(filename);
    if name.is_empty() {
        return Err(AppError::EmptyFilename);
    }
    if !allowed_file(&name) {
        return Err(AppError::DisallowedExtension);
    }
    tokio::fs::write(dir.join(&name), &data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to store upload: {e}")))?;
    Ok(name)
}

/// Lenient storage path used for the optional attachments on user
/// register/update: a disallowed or unusable filename skips the field
/// silently instead of failing the request. Only I/O errors surface.
pub async fn store_if_allowed(
    dir: &Path,
    filename: &str,
    data: Bytes,
) -> Result<Option<String>, AppError> {
    let name = sanitize_filename(filename);
    if name.is_empty() || !allowed_file(&name) {
        return Ok(None);
    }
    tokio::fs::write(dir.join(&name), &data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to store upload: {e}")))?;
    Ok(Some(name))
}

/// POST /api/upload
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        if filename.is_empty() {
            return Err(AppError::EmptyFilename);
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?;

        let stored = store_file(Path::new(&state.config.upload_dir), &filename, data).await?;
        info!("Stored upload {stored}");
        return Ok((
            StatusCode::CREATED,
            Json(json!({
                "message": "File uploaded successfully",
                "filename": stored
            })),
        ));
    }

    Err(AppError::NoFilePart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::routes::build_router;
    use crate::search::JobSearchProvider;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn test_allowed_file_accepts_listed_extensions() {
        assert!(allowed_file("resume.pdf"));
        assert!(allowed_file("photo.PNG"));
        assert!(allowed_file("cv.docx"));
    }

    #[test]
    fn test_allowed_file_rejects_others() {
        assert!(!allowed_file("resume.exe"));
        assert!(!allowed_file("script.sh"));
        assert!(!allowed_file("noextension"));
    }

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("resume.pdf"), "resume.pdf");
        assert_eq!(sanitize_filename("my-cv_2.docx"), "my-cv_2.docx");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("/tmp/evil.pdf"), "evil.pdf");
        assert_eq!(sanitize_filename("..\\..\\evil.pdf"), "evil.pdf");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_filename("my resume (1).pdf"), "my_resume__1_.pdf");
    }

    #[test]
    fn test_sanitize_dot_only_names_collapse_to_empty() {
        assert_eq!(sanitize_filename("..."), "");
        assert_eq!(sanitize_filename(".."), "");
    }

    struct NoSearch;

    #[async_trait]
    impl JobSearchProvider for NoSearch {
        async fn search(&self, _query: &str) -> Result<Value, AppError> {
            Err(AppError::SearchUnavailable)
        }
    }

    fn test_state(upload_dir: &std::path::Path) -> crate::state::AppState {
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        crate::state::AppState {
            db,
            config: Config {
                database_url: "postgres://localhost/unused".into(),
                jwt_secret: "test-secret".into(),
                apijobs_api_key: "test-key".into(),
                upload_dir: upload_dir.to_string_lossy().into_owned(),
                port: 0,
                rust_log: "info".into(),
                enforce_ownership: false,
            },
            search: Arc::new(NoSearch),
        }
    }

    fn multipart_request(filename: &str, content: &str) -> Request<Body> {
        let boundary = "XUPLOADBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_pdf_accepted_and_stored() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));

        let response = app
            .oneshot(multipart_request("resume.pdf", "%PDF-1.4 test"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["filename"], "resume.pdf");
        assert!(dir.path().join("resume.pdf").exists());
    }

    #[tokio::test]
    async fn test_upload_exe_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));

        let response = app
            .oneshot(multipart_request("resume.exe", "MZ"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "DISALLOWED_EXTENSION");
        assert!(!dir.path().join("resume.exe").exists());
    }

    #[tokio::test]
    async fn test_upload_traversal_name_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));

        let response = app
            .oneshot(multipart_request("../escape.pdf", "%PDF-1.4"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(dir.path().join("escape.pdf").exists());
    }

    #[tokio::test]
    async fn test_upload_without_file_part_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(dir.path()));

        let boundary = "XUPLOADBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"other\"\r\n\r\n\
             value\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NO_FILE_PART");
    }
}
