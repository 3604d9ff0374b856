//! Inbound HTTP API
//!
//! - `POST /notify`: relay a video tag update
//! - `POST /reload`: reload the term catalog
//! - `GET /__health`, `GET /__gtg`: dependency checks

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use metadata_notifier_domain::{
    CatalogSource, Notifier,
    usecases::{CatalogReloader, NotifyUseCase},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::health::HealthChecker;

/// Header carrying the transaction id, inbound and outbound
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub notify: Arc<NotifyUseCase<dyn Notifier>>,
    pub reloader: Arc<CatalogReloader<dyn CatalogSource>>,
    pub health: Arc<HealthChecker>,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/notify", post(notify))
        .route("/reload", post(reload))
        .route("/__health", get(health))
        .route("/__gtg", get(good_to_go))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Transaction id from the request, or a freshly generated one
pub fn transaction_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(new_transaction_id)
}

/// `tid_` followed by 10 random hex characters
pub fn new_transaction_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("tid_{}", &random[..10])
}

async fn notify(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let transaction_id = transaction_id(&headers);
    let span = tracing::info_span!("notify", transaction_id = %transaction_id);

    async move {
        tracing::info!("Received video");

        match state.notify.handle(&body, &transaction_id).await {
            Ok(_) => StatusCode::OK,
            Err(e) if e.is_client_error() => {
                tracing::warn!(error = %e, "Rejected video notification");
                StatusCode::BAD_REQUEST
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to relay video notification");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
    .instrument(span)
    .await
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    entries: usize,
    rejected: usize,
}

async fn reload(State(state): State<AppState>) -> Response {
    match state.reloader.reload().await {
        Ok(summary) => Json(ReloadResponse {
            entries: summary.entries,
            rejected: summary.rejected,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Reloading mappings failed, keeping current table");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Response {
    Json(state.health.report().await).into_response()
}

async fn good_to_go(State(state): State<AppState>) -> StatusCode {
    if state.health.good_to_go().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::CheckInfo;
    use crate::stub::{RecordingNotifier, StubCatalogSource};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use metadata_notifier_domain::{
        CatalogRecord, MappingStore, MappingTable, PublicationEnvelope, Term,
    };
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        notifier: Arc<RecordingNotifier>,
        catalog: Arc<StubCatalogSource>,
        store: Arc<MappingStore>,
    }

    fn record(search_term: &str, stream_url: &str) -> CatalogRecord {
        [
            ("brightcovesearchterm".to_string(), search_term.to_string()),
            ("streamurl".to_string(), stream_url.to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn test_app_with(notifier: RecordingNotifier, catalog: StubCatalogSource) -> TestApp {
        let mut table = MappingTable::new();
        table.insert(
            "Commodities".to_string(),
            Term::new("MTA1-U2VjdGlvbnM=", "Sections"),
        );
        let store = Arc::new(MappingStore::with_table(table));
        let notifier = Arc::new(notifier);
        let catalog = Arc::new(catalog);

        let state = AppState {
            notify: Arc::new(NotifyUseCase::<dyn Notifier>::new(
                store.clone(),
                notifier.clone(),
            )),
            reloader: Arc::new(CatalogReloader::<dyn CatalogSource>::new(
                catalog.clone(),
                store.clone(),
            )),
            health: Arc::new(
                HealthChecker::new()
                    .with_check(CheckInfo::notifier_reachable(), notifier.clone())
                    .with_check(CheckInfo::catalog_available(), catalog.clone()),
            ),
        };

        TestApp {
            router: build_router(state),
            notifier,
            catalog,
            store,
        }
    }

    fn test_app() -> TestApp {
        test_app_with(
            RecordingNotifier::new(),
            StubCatalogSource::with_records(vec![]),
        )
    }

    fn post_notify(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/notify")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_notify_status_codes() {
        let cases = [
            (r#"{"scenario" : invalidJson"}"#, StatusCode::INTERNAL_SERVER_ERROR),
            (r#"{"scenario" : "no uuid"}"#, StatusCode::BAD_REQUEST),
            (
                r#"{"scenario" : "tags list empty", "uuid" : "1a78d8e7-473d-4e9f-ae2e-7f20a45e31fc", "tags" : []}"#,
                StatusCode::OK,
            ),
        ];

        for (body, expected) in cases {
            let app = test_app();
            let response = app.router.oneshot(post_notify(body)).await.unwrap();

            assert_eq!(response.status(), expected, "body: {body}");
            assert!(app.notifier.sent().is_empty());
        }
    }

    #[tokio::test]
    async fn test_notify_delivers_and_propagates_request_id() {
        let app = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/notify")
            .header("X-Request-Id", "tid_inbound")
            .body(Body::from(r#"{"uuid": "1234", "tags": ["Commodities", "Unknown"]}"#))
            .unwrap();

        let response = app.router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let sent = app.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].transaction_id, "tid_inbound");

        let envelope: PublicationEnvelope = serde_json::from_slice(&sent[0].payload).unwrap();
        let xml = String::from_utf8(STANDARD.decode(envelope.value).unwrap()).unwrap();
        assert_eq!(envelope.uuid, "1234");
        assert!(xml.contains(r#"<term taxonomy="Sections" id="MTA1-U2VjdGlvbnM="></term>"#));
        assert_eq!(xml.matches("<tag>").count(), 1);
    }

    #[tokio::test]
    async fn test_notify_generates_transaction_id_when_missing() {
        let app = test_app();

        let response = app
            .router
            .oneshot(post_notify(r#"{"uuid": "1234", "tags": ["Commodities"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let transaction_id = &app.notifier.sent()[0].transaction_id;
        assert!(transaction_id.starts_with("tid_"));
        assert_eq!(transaction_id.len(), 14);
    }

    #[tokio::test]
    async fn test_notify_delivery_failure_is_server_error() {
        let app = test_app_with(
            RecordingNotifier::rejecting(503),
            StubCatalogSource::with_records(vec![]),
        );

        let response = app
            .router
            .oneshot(post_notify(r#"{"uuid": "1234", "tags": ["Commodities"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_replaces_mappings() {
        let app = test_app();
        app.catalog.set_records(vec![
            record("World", "/stream/sectionsId/MQ==-U2VjdGlvbnM="),
            record("Broken", "/stream/sectionsId/MQ=="),
        ]);

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({"entries": 1, "rejected": 1}));
        assert!(app.store.lookup("World").is_some());
        assert!(app.store.lookup("Commodities").is_none());
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_mappings() {
        let app = test_app_with(RecordingNotifier::new(), StubCatalogSource::unavailable());

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(app.store.lookup("Commodities").is_some());
    }

    #[tokio::test]
    async fn test_health_and_gtg() {
        let healthy = test_app();
        let response = healthy
            .router
            .clone()
            .oneshot(Request::get("/__health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let report: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["ok"], true);

        let response = healthy
            .router
            .oneshot(Request::get("/__gtg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let unhealthy = test_app_with(RecordingNotifier::new(), StubCatalogSource::unavailable());
        let response = unhealthy
            .router
            .oneshot(Request::get("/__gtg").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_transaction_id_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "tid_given".parse().unwrap());
        assert_eq!(transaction_id(&headers), "tid_given");

        headers.insert(REQUEST_ID_HEADER, "  ".parse().unwrap());
        assert!(transaction_id(&headers).starts_with("tid_"));
    }

    #[test]
    fn test_generated_transaction_id_is_ten_hex_characters() {
        let id = new_transaction_id();
        let suffix = id.strip_prefix("tid_").unwrap();

        assert_eq!(suffix.len(), 10);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
