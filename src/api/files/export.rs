use std::sync::Arc;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;

use crate::state::AppState;

use super::common::{drive_service, google_disk, ApiResult};

const PDF_MIME: &str = "application/pdf";

/// GET /export/:filename - convert a Drive-native document to PDF through
/// the provider export API and stream the converted bytes back
pub async fn export_pdf(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let disk = google_disk(&state).await?;

    let file = disk.metadata(&filename).await?;

    let service = drive_service(&disk)?;
    let stream = service.export(&file.path, PDF_MIME).await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_MIME)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}.pdf", filename),
        )
        .body(Body::from_stream(stream))?)
}
