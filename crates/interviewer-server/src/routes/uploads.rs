//! Recording upload endpoint.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::state::{AppState, INVALID_LINK};
use crate::upload::UploadRequest;

/// Content type assumed when the client does not send one.
const DEFAULT_MIME_TYPE: &str = "video/webm";

/// Response for a stored recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// Id assigned by the storage provider.
    #[serde(rename = "fileId")]
    pub file_id: String,
}

struct VideoPart {
    file_name: String,
    mime_type: String,
    data: Bytes,
}

/// Name a recording is stored under.
///
/// `interview_{link}_q{index}_{YYYYmmdd_HHMMSS}.webm`
pub fn recording_file_name(link_id: &str, question_index: &str, at: DateTime<Utc>) -> String {
    format!(
        "interview_{}_q{}_{}.webm",
        link_id,
        question_index,
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Keep the question index safe to embed in a file name.
fn sanitize_index(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(32)
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

fn multipart_error(e: impl std::fmt::Display) -> ServerError {
    ServerError::BadRequest(format!("Malformed multipart body: {e}"))
}

/// POST /api/upload/{id} - Forward a recorded answer to storage.
///
/// Multipart fields: `video` (file) and optional `questionIndex` (text).
pub async fn upload_recording_handler(
    State(state): State<AppState>,
    Path(link_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    if !state.interview_exists(&link_id) {
        return Err(ServerError::NotFound(INVALID_LINK.to_string()));
    }

    let mut video = None;
    let mut question_index = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("video") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                video = Some(VideoPart {
                    file_name,
                    mime_type,
                    data,
                });
            }
            Some("questionIndex") => {
                question_index = Some(field.text().await.map_err(multipart_error)?);
            }
            other => debug!(field = ?other, "Ignoring unexpected multipart field"),
        }
    }

    let video = video.ok_or_else(|| ServerError::BadRequest("No video file part".to_string()))?;
    if video.file_name.is_empty() || video.data.is_empty() {
        return Err(ServerError::BadRequest("No selected file".to_string()));
    }

    let folder_id = state.config.storage_folder_id.clone().ok_or_else(|| {
        ServerError::Config("Google Drive Folder ID not configured".to_string())
    })?;

    let question_index = sanitize_index(question_index.as_deref().unwrap_or("unknown"));
    let uploaded_at = Utc::now();
    let file_name = recording_file_name(&link_id, &question_index, uploaded_at);
    let size = video.data.len();

    let file_id = state
        .uploads
        .upload(UploadRequest {
            file_name: file_name.clone(),
            folder_id,
            mime_type: video.mime_type,
            data: video.data,
        })
        .await?;

    // The interview may have been closed while the upload was in flight.
    if let Err(e) = state.record_upload(
        &link_id,
        json!({
            "fileId": file_id,
            "fileName": file_name,
            "questionIndex": question_index,
            "size": size,
            "uploadedAt": uploaded_at.to_rfc3339(),
        }),
    ) {
        warn!(session = %link_id, file_id = %file_id, "Recording stored for a closed interview");
        return Err(e);
    }

    info!(
        session = %link_id,
        file_id = %file_id,
        question_index = %question_index,
        gateway = state.uploads.name(),
        "Recording stored"
    );

    Ok(Json(UploadResponse {
        message: "Upload successful".to_string(),
        file_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::error::ErrorResponse;
    use crate::upload::MockGateway;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::post,
    };
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use crate::routes::delete_interview_handler;
    use crate::upload::{UploadError, UploadGateway};

    use interviewer_session::SessionCache;

    const BOUNDARY: &str = "X-INTERVIEW-BOUNDARY";

    /// Build a multipart body: `(name, Some(filename), content)` for files,
    /// `(name, None, text)` for text fields.
    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: video/webm\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(link: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/upload/{link}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn setup(config: ServerConfig, gateway: MockGateway) -> (AppState, Arc<MockGateway>, Router) {
        let gateway = Arc::new(gateway);
        let state = AppState::with_cache(config, SessionCache::new(), gateway.clone());
        let router = Router::new()
            .route("/upload/{id}", post(upload_recording_handler))
            .with_state(state.clone());
        (state, gateway, router)
    }

    async fn error_body(response: axum::response::Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_recording_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            recording_file_name("abc", "2", at),
            "interview_abc_q2_20240309_140507.webm"
        );
    }

    #[test]
    fn test_sanitize_index() {
        assert_eq!(sanitize_index("3"), "3");
        assert_eq!(sanitize_index(" 4 "), "4");
        assert_eq!(sanitize_index("../etc"), "etc");
        assert_eq!(sanitize_index(""), "unknown");
    }

    #[tokio::test]
    async fn test_upload_success_records_association() {
        let (state, gateway, app) = setup(
            ServerConfig::new().with_storage_folder("folder-1"),
            MockGateway::new(),
        );
        let key = state.create_interview(vec!["Q1".into()]);

        let body = multipart_body(&[
            ("video", Some("recording_q0.webm"), "webm-data"),
            ("questionIndex", None, "0"),
        ]);
        let response = app.oneshot(upload_request(key.as_str(), body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: UploadResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.message, "Upload successful");
        assert_eq!(body.file_id, "mock-file-1");

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].folder_id, "folder-1");
        assert_eq!(requests[0].mime_type, "video/webm");
        assert_eq!(&requests[0].data[..], b"webm-data");
        assert!(
            requests[0]
                .file_name
                .starts_with(&format!("interview_{key}_q0_"))
        );

        let uploads = state.uploads_for(key.as_str());
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0]["fileId"], "mock-file-1");
        assert_eq!(uploads[0]["questionIndex"], "0");
    }

    #[tokio::test]
    async fn test_upload_without_index_uses_unknown() {
        let (state, gateway, app) = setup(
            ServerConfig::new().with_storage_folder("folder-1"),
            MockGateway::new(),
        );
        let key = state.create_interview(vec!["Q1".into()]);

        let body = multipart_body(&[("video", Some("r.webm"), "data")]);
        let response = app.oneshot(upload_request(key.as_str(), body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(gateway.requests()[0].file_name.contains("_qunknown_"));
    }

    #[tokio::test]
    async fn test_upload_unknown_link() {
        let (_state, gateway, app) = setup(
            ServerConfig::new().with_storage_folder("folder-1"),
            MockGateway::new(),
        );

        let body = multipart_body(&[("video", Some("r.webm"), "data")]);
        let response = app.oneshot(upload_request("bogus", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_body(response).await.error, "Invalid interview link");
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_missing_video_part() {
        let (state, _gateway, app) = setup(
            ServerConfig::new().with_storage_folder("folder-1"),
            MockGateway::new(),
        );
        let key = state.create_interview(vec!["Q1".into()]);

        let body = multipart_body(&[("questionIndex", None, "1")]);
        let response = app.oneshot(upload_request(key.as_str(), body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.error, "No video file part");
    }

    #[tokio::test]
    async fn test_upload_empty_file() {
        let (state, _gateway, app) = setup(
            ServerConfig::new().with_storage_folder("folder-1"),
            MockGateway::new(),
        );
        let key = state.create_interview(vec!["Q1".into()]);

        let body = multipart_body(&[("video", Some("r.webm"), "")]);
        let response = app.oneshot(upload_request(key.as_str(), body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.error, "No selected file");
    }

    #[tokio::test]
    async fn test_upload_without_folder_configured() {
        let (state, gateway, app) = setup(ServerConfig::new(), MockGateway::new());
        let key = state.create_interview(vec!["Q1".into()]);

        let body = multipart_body(&[("video", Some("r.webm"), "data")]);
        let response = app.oneshot(upload_request(key.as_str(), body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_gateway_failure() {
        let (state, _gateway, app) = setup(
            ServerConfig::new().with_storage_folder("folder-1"),
            MockGateway::failing("quota exceeded"),
        );
        let key = state.create_interview(vec!["Q1".into()]);

        let body = multipart_body(&[("video", Some("r.webm"), "data")]);
        let response = app.oneshot(upload_request(key.as_str(), body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(state.uploads_for(key.as_str()).is_empty());
    }

    /// Holds every upload until released.
    #[derive(Default)]
    struct HeldGateway {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl UploadGateway for HeldGateway {
        async fn upload(&self, _request: UploadRequest) -> Result<String, UploadError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok("held-file".to_string())
        }

        fn name(&self) -> &str {
            "held"
        }
    }

    #[tokio::test]
    async fn test_close_during_upload_leaves_no_upload_list() {
        let gateway = Arc::new(HeldGateway::default());
        let state = AppState::with_cache(
            ServerConfig::new().with_storage_folder("folder-1"),
            SessionCache::new(),
            gateway.clone(),
        );
        let app = Router::new()
            .route("/upload/{id}", post(upload_recording_handler))
            .route("/interviews/{id}", axum::routing::delete(delete_interview_handler))
            .with_state(state.clone());
        let key = state.create_interview(vec!["Q1".into()]);

        let body = multipart_body(&[
            ("video", Some("r.webm"), "data"),
            ("questionIndex", None, "0"),
        ]);
        let upload = tokio::spawn(app.clone().oneshot(upload_request(key.as_str(), body)));
        gateway.entered.notified().await;

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/interviews/{key}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        gateway.release.notify_one();
        let response = upload.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_body(response).await.error, INVALID_LINK);

        assert!(state.sessions.is_empty(), "keys left: {:?}", state.sessions.keys());
    }
}
