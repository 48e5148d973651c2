//! `GET /photos/{*path}`: serves stored photos behind signed URLs.

use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use api::storage::{content_type_for, photo_store};

#[derive(Debug, Deserialize)]
pub struct Signature {
    expires: i64,
    sig: String,
}

pub async fn serve_photo(Path(path): Path<String>, Query(signature): Query<Signature>) -> Response {
    let photos = photo_store();

    if let Err(e) = photos.verify(&path, signature.expires, &signature.sig, chrono::Utc::now()) {
        tracing::debug!("Rejected photo request for {}: {}", path, e);
        return (StatusCode::FORBIDDEN, e.to_string()).into_response();
    }

    match photos.read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type_for(&path)),
                (header::CACHE_CONTROL, "private, max-age=3600"),
            ],
            bytes,
        )
            .into_response(),
        Err(audit::Error::NotFound { .. }) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!("Failed to read photo {}: {}", path, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
