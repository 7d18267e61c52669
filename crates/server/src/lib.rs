//! HTTP transport for naslink.
//!
//! `/` serves the landing page and a couple of embedded assets ride along for
//! it. Every other path is treated as a link identifier and handed to
//! [`Naslinks::resolve`]: intact files are streamed back as attachments,
//! everything else gets the same 404 page. Nothing in the response
//! distinguishes an identifier that never existed from one that was just
//! invalidated, or from a registry failure.

mod assets;
mod download;
pub mod error;
mod pages;

use crate::assets::Public;
use crate::error::{ErrorKind, Result};
use crate::pages::Pages;
use axum::Router;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use exn::ResultExt;
use naslink_links::{Caller, Naslinks, Resolution};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
struct AppState {
    links: Naslinks,
    pages: Arc<Pages>,
}

/// Build the application router.
pub fn router(links: Naslinks) -> Result<Router> {
    let state = AppState { links, pages: Arc::new(Pages::new()?) };
    Ok(Router::new()
        .route("/logo.svg", get(|| async { Public::respond("logo.svg") }))
        .route("/favicon.ico", get(|| async { Public::respond("favicon.ico") }))
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Listen on `host:port` and serve links until interrupted.
pub async fn serve(host: &str, port: u16, links: Naslinks) -> Result<()> {
    let app = router(links)?;
    let address = format!("{host}:{port}");
    let listener = TcpListener::bind((host, port)).await.or_raise(|| ErrorKind::Bind(address.clone()))?;
    tracing::info!(%address, "Serving naslinks");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .or_raise(|| ErrorKind::Serve)?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    remote: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    let caller = caller(method, &headers, remote.map(|ConnectInfo(addr)| addr));
    match state.links.resolve(uri.path(), &caller).await {
        Ok(Resolution::Landing) => Html(state.pages.landing().to_string()).into_response(),
        Ok(Resolution::Serve(link)) => match download::attachment(&link).await {
            Some(response) => response,
            None => not_found(&state),
        },
        Ok(Resolution::NotFound) => not_found(&state),
        Err(e) => {
            tracing::error!(error = ?e, path = uri.path(), "Failed to resolve naslink");
            not_found(&state)
        },
    }
}

fn not_found(state: &AppState) -> Response {
    (StatusCode::NOT_FOUND, Html(state.pages.invalid().to_string())).into_response()
}

fn caller(method: Method, headers: &HeaderMap, remote: Option<SocketAddr>) -> Caller {
    let forwarded_for: Vec<&str> =
        headers.get_all("x-forwarded-for").iter().filter_map(|v| v.to_str().ok()).collect();
    Caller {
        method: method.to_string(),
        user_agent: headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string),
        remote_addr: remote.map(|addr| addr.to_string()),
        forwarded_for: (!forwarded_for.is_empty()).then(|| forwarded_for.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use naslink_registry::Database;
    use std::fs;
    use tower::ServiceExt;

    async fn app() -> (Router, Naslinks) {
        let db = Database::connect_in_memory().await.unwrap();
        let links = Naslinks::from(&db);
        (router(links.clone()).unwrap(), links)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_is_landing_page() {
        let (app, _) = app().await;
        let response = get(&app, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Welcome to naslink!"));
    }

    #[tokio::test]
    async fn test_assets_are_served() {
        let (app, _) = app().await;
        let logo = get(&app, "/logo.svg").await;
        assert_eq!(logo.status(), StatusCode::OK);
        assert_eq!(logo.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert_eq!(get(&app, "/favicon.ico").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_404_page() {
        let (app, _) = app().await;
        let response = get(&app, "/4b0f7bd5-0000-4000-8000-000000000000").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Requested file was changed or removed."));
    }

    #[tokio::test]
    async fn test_registry_failure_is_404_page() {
        let db = Database::connect_in_memory().await.unwrap();
        let app = router(Naslinks::from(&db)).unwrap();
        db.close().await;
        let response = get(&app, "/4b0f7bd5-0000-4000-8000-000000000000").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Requested file was changed or removed."));
    }

    #[tokio::test]
    async fn test_download_then_invalidate() {
        let (app, links) = app().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"0123456789").unwrap();
        let link = links.create(&path).await.unwrap();
        let uri = format!("/{}", link.id);

        let response = get(&app, &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "attachment; filename=\"notes.txt\"");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body_text(response).await, "0123456789");

        // Trailing slashes are ignored.
        assert_eq!(get(&app, &format!("{uri}/")).await.status(), StatusCode::OK);

        fs::write(&path, b"01234").unwrap();
        assert_eq!(get(&app, &uri).await.status(), StatusCode::NOT_FOUND);
        assert!(links.enumerate().await.unwrap().is_empty());
        fs::write(&path, b"0123456789").unwrap();
        assert_eq!(get(&app, &uri).await.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_caller_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, "curl/8.0".parse().unwrap());
        headers.append("x-forwarded-for", "203.0.113.7".parse().unwrap());
        headers.append("x-forwarded-for", "10.0.0.1".parse().unwrap());
        let caller = caller(Method::GET, &headers, Some("192.0.2.1:5555".parse().unwrap()));
        assert_eq!(caller.method, "GET");
        assert_eq!(caller.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(caller.remote_addr.as_deref(), Some("192.0.2.1:5555"));
        assert_eq!(caller.forwarded_for.as_deref(), Some("203.0.113.7, 10.0.0.1"));

        let bare = super::caller(Method::HEAD, &HeaderMap::new(), None);
        assert!(bare.user_agent.is_none() && bare.remote_addr.is_none() && bare.forwarded_for.is_none());
    }
}
