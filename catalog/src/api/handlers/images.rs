use crate::errors::Result;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

#[utoipa::path(
    get,
    path = "/images/{name}",
    tag = "images",
    summary = "Download a stored image",
    params(("name" = String, Path, description = "File name as returned in a product's `image` field")),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "No such image"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(name = %name))]
pub async fn get_image(State(state): State<AppState>, Path(name): Path<String>) -> Result<impl IntoResponse> {
    let content = state.media.retrieve(&name).await?;
    let mime = mime_guess::from_path(&name).first_or_octet_stream();

    Ok(([(header::CONTENT_TYPE, mime.to_string())], content))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use axum::http::StatusCode;

    #[sqlx::test]
    #[test_log::test]
    async fn test_serves_stored_bytes_with_content_type(pool: sqlx::PgPool) {
        let (app, media) = create_test_app(pool).await;
        std::fs::write(media.path().join("abcdefghij.webp"), b"RIFF....WEBP").unwrap();

        let response = app.get("/api/images/abcdefghij.webp").await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/webp");
        assert_eq!(response.as_bytes().as_ref(), b"RIFF....WEBP");
    }

    #[sqlx::test]
    async fn test_missing_image_is_404(pool: sqlx::PgPool) {
        let (app, _media) = create_test_app(pool).await;

        app.get("/api/images/missing.jpg").await.assert_status(StatusCode::NOT_FOUND);
        // traversal never leaves the media root
        app.get("/api/images/..%2Fconfig.yaml")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
