//! Static files embedded into the binary with [`rust-embed`](rust_embed).

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "../../assets/public/"]
pub struct Public;
impl Public {
    /// Respond with the named asset, or a bare 404 if it isn't embedded.
    pub fn respond(name: &str) -> Response {
        let Some(file) = Self::get(name) else {
            return StatusCode::NOT_FOUND.into_response();
        };
        let mime = mime_guess::from_path(name).first_or_octet_stream();
        let content_type = HeaderValue::from_str(mime.as_ref())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        ([(header::CONTENT_TYPE, content_type)], file.data).into_response()
    }
}
