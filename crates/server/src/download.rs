//! File download responses.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use naslink_links::Link;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Bytes escaped in an RFC 5987 `filename*` value.
const FILENAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Stream the linked file back as an attachment.
///
/// Returns `None` if the file can't be opened. It passed its integrity check
/// a moment ago, so that only happens if it disappeared in between.
pub(crate) async fn attachment(link: &Link) -> Option<Response> {
    let file = match File::open(&link.path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %link.path.display(), error = %e, "Verified file could not be opened");
            return None;
        },
    };
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, content_type(link));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(link.size));
    headers.insert(header::CONTENT_DISPOSITION, content_disposition(link.filename().unwrap_or("download")));
    let body = Body::from_stream(ReaderStream::new(file));
    Some((StatusCode::OK, headers, body).into_response())
}

fn content_type(link: &Link) -> HeaderValue {
    let mime = mime_guess::from_path(&link.path).first_or_octet_stream();
    HeaderValue::from_str(mime.as_ref()).unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

/// `attachment` with the file's base name, as a quoted ASCII fallback plus
/// the exact name in RFC 5987 form for clients that understand it.
pub(crate) fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();
    let mut value = format!("attachment; filename=\"{fallback}\"");
    if !filename.is_ascii() || fallback != filename {
        value.push_str("; filename*=UTF-8''");
        value.extend(utf8_percent_encode(filename, FILENAME));
    }
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
