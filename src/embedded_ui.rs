use crate::core::shared::state::AppState;
use axum::{
    body::Body,
    extract::Path,
    http::{header, Response, StatusCode},
    routing::get,
    Router,
};
use rust_embed::Embed;
use std::sync::Arc;

#[derive(Embed)]
#[folder = "static/"]
struct EmbeddedUi;

async fn serve_embedded_file(Path(path): Path<String>) -> Response<Body> {
    let path = path.trim_start_matches('/');

    match EmbeddedUi::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .header(header::CACHE_CONTROL, "public, max-age=3600")
                .body(Body::from(content.data.into_owned()))
                .unwrap_or_else(|_| plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))
        }
        None => plain(StatusCode::NOT_FOUND, "Not Found"),
    }
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

pub fn configure_static_routes() -> Router<Arc<AppState>> {
    Router::new().route("/static/*path", get(serve_embedded_file))
}

pub fn list_embedded_files() -> Vec<String> {
    EmbeddedUi::iter().map(|f| f.to_string()).collect()
}
