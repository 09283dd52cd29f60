use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use rentwise_core::{
    estimate_message, CategoricalField, ListingInput, NumericField, PredictionPipeline,
    PredictionRecord, RentError, EMPTY_HISTORY_MESSAGE,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::sessions::{SessionId, SessionRegistry};

const INDEX_HTML: &str = include_str!("index.html");

pub struct AppState {
    pub pipeline: PredictionPipeline,
    pub sessions: SessionRegistry,
    pub currency_symbol: String,
    model_fingerprint: String,
    start_time: Instant,
}

impl AppState {
    pub fn new(pipeline: PredictionPipeline, config: &ServiceConfig) -> Self {
        let model_fingerprint = pipeline.model().fingerprint();
        Self {
            pipeline,
            sessions: SessionRegistry::new(
                config.history.max_sessions,
                config.history.record_limit(),
            ),
            currency_symbol: config.display.currency_symbol.clone(),
            model_fingerprint,
            start_time: Instant::now(),
        }
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_fingerprint: String,
    active_sessions: usize,
    uptime_secs: u64,
}

#[derive(Debug, Serialize)]
struct CategoricalFieldView {
    field: CategoricalField,
    label: &'static str,
    values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct NumericFieldView {
    field: NumericField,
    label: &'static str,
    min: i64,
    max: i64,
    default: i64,
}

#[derive(Debug, Serialize)]
struct VocabularyResponse {
    numeric: Vec<NumericFieldView>,
    categorical: Vec<CategoricalFieldView>,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    session_id: SessionId,
}

#[derive(Debug, Serialize)]
struct PredictionResponse {
    predicted_rent: f64,
    message: String,
    history_len: usize,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    records: Vec<PredictionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn session_not_found(id: &SessionId) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("session {id} not found"))
    }
}

impl From<RentError> for ApiError {
    fn from(err: RentError) -> Self {
        let status = if err.is_input_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            error!("Prediction failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(Arc::new(state));
    let listener = bind_listener(addr).await?;
    info!("RentWise listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/api/health", get(handle_health))
        .route("/api/vocabulary", get(handle_vocabulary))
        .route("/api/sessions", post(handle_create_session))
        .route("/api/sessions/:id", delete(handle_end_session))
        .route("/api/sessions/:id/predictions", post(handle_predict))
        .route("/api/sessions/:id/history", get(handle_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model_fingerprint: state.model_fingerprint.clone(),
        active_sessions: state.sessions.len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn handle_vocabulary(State(state): State<SharedState>) -> Json<VocabularyResponse> {
    let numeric = NumericField::ALL
        .into_iter()
        .map(|field| {
            let bounds = field.bounds();
            NumericFieldView {
                field,
                label: field.label(),
                min: bounds.min,
                max: bounds.max,
                default: bounds.default,
            }
        })
        .collect();

    let categorical = CategoricalField::ALL
        .into_iter()
        .map(|field| CategoricalFieldView {
            field,
            label: field.label(),
            values: state.pipeline.vocabulary_for(field).to_vec(),
        })
        .collect();

    Json(VocabularyResponse {
        numeric,
        categorical,
    })
}

async fn handle_create_session(
    State(state): State<SharedState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session_id = state.sessions.create();
    (StatusCode::CREATED, Json(SessionResponse { session_id }))
}

async fn handle_end_session(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<SessionId>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.end(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::session_not_found(&id))
    }
}

async fn handle_predict(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<SessionId>,
    payload: Result<Json<ListingInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let history = state
        .sessions
        .history(&id)
        .ok_or_else(|| ApiError::session_not_found(&id))?;

    let Json(listing) = payload.map_err(|rejection| {
        warn!("Session {} sent an unreadable listing: {}", id, rejection.body_text());
        ApiError::from(rejection)
    })?;

    let mut history = history.lock();
    let predicted_rent = state
        .pipeline
        .predict(listing, &mut history)
        .map_err(|err| {
            if err.is_input_error() {
                warn!("Session {} prediction rejected: {}", id, err);
            }
            ApiError::from(err)
        })?;

    Ok(Json(PredictionResponse {
        predicted_rent,
        message: estimate_message(predicted_rent, &state.currency_symbol),
        history_len: history.len(),
    }))
}

async fn handle_history(
    State(state): State<SharedState>,
    AxumPath(id): AxumPath<SessionId>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state
        .sessions
        .history(&id)
        .ok_or_else(|| ApiError::session_not_found(&id))?;

    let records: Vec<PredictionRecord> = history.lock().all().iter().cloned().collect();
    let message = records.is_empty().then_some(EMPTY_HISTORY_MESSAGE);
    Ok(Json(HistoryResponse { records, message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use rentwise_core::gbdt::{GbdtModel, Node, Tree, SCALE};
    use rentwise_core::EncoderRegistry;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const ENCODERS: &str = r#"{
        "city": ["Bangalore", "Delhi", "Mumbai"],
        "neighborhood": ["Andheri", "Indiranagar", "Saket"],
        "furnishing": ["Furnished", "Semi-Furnished", "Unfurnished"],
        "area_type": ["Built Area", "Carpet", "Super Area"],
        "tenant_preferred": ["Bachelors", "Bachelors/Family", "Family"]
    }"#;

    fn test_router(config: ServiceConfig) -> Router {
        let tree = Tree::new(
            vec![
                Node::split(0, 0, 1000 * SCALE, 1, 2),
                Node::leaf(1, 18_000 * SCALE),
                Node::leaf(2, 27_500 * SCALE),
            ],
            SCALE,
        );
        let registry = EncoderRegistry::from_json_str(ENCODERS).unwrap();
        let pipeline = PredictionPipeline::new(registry, GbdtModel::new(vec![tree], 125)).unwrap();
        build_router(Arc::new(AppState::new(pipeline, &config)))
    }

    fn listing(area: i64, city: &str) -> Value {
        json!({
            "area": area,
            "bedrooms": 2,
            "bathrooms": 2,
            "floor": 1,
            "city": city,
            "neighborhood": "Andheri",
            "furnishing": "Furnished",
            "area_type": "Carpet",
            "tenant_preferred": "Family"
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = send(app, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_router(ServiceConfig::default());
        let (status, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model_fingerprint"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_vocabulary_lists_fields() {
        let app = test_router(ServiceConfig::default());
        let (status, body) = send(&app, Method::GET, "/api/vocabulary", None).await;
        assert_eq!(status, StatusCode::OK);

        let categorical = body["categorical"].as_array().unwrap();
        assert_eq!(categorical.len(), 5);
        assert_eq!(categorical[0]["field"], "city");
        assert_eq!(categorical[0]["values"], json!(["Bangalore", "Delhi", "Mumbai"]));

        let numeric = body["numeric"].as_array().unwrap();
        assert_eq!(numeric[0], json!({"field": "area", "label": "Area (sq ft)", "min": 100, "max": 10000, "default": 1000}));
    }

    #[tokio::test]
    async fn test_history_empty_before_prediction() {
        let app = test_router(ServiceConfig::default());
        let id = new_session(&app).await;

        let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], json!([]));
        assert_eq!(body["message"], "No predictions made yet.");
    }

    #[tokio::test]
    async fn test_predict_and_list_history() {
        let app = test_router(ServiceConfig::default());
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/predictions");

        let (status, body) = send(&app, Method::POST, &uri, Some(listing(1000, "Mumbai"))).await;
        assert_eq!(status, StatusCode::OK);
        // 18000.125 rounds half to even
        assert_eq!(body["predicted_rent"], 18_000.12);
        assert_eq!(body["message"], "Estimated Monthly Rent: ₹18000.12");
        assert_eq!(body["history_len"], 1);

        let (_, body) = send(&app, Method::POST, &uri, Some(listing(2400, "Delhi"))).await;
        assert_eq!(body["predicted_rent"], 27_500.12);

        let (_, body) = send(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["city"], "Mumbai");
        assert_eq!(records[1]["city"], "Delhi");
        assert_eq!(records[1]["predicted_rent"], 27_500.12);
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_rejected_prediction_leaves_history() {
        let app = test_router(ServiceConfig::default());
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/predictions");

        let (status, body) = send(&app, Method::POST, &uri, Some(listing(1000, "Mumbay"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("Mumbay"));

        let (status, _) = send(&app, Method::POST, &uri, Some(listing(50, "Mumbai"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, body) = send(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(body["records"], json!([]));
    }

    #[tokio::test]
    async fn test_unreadable_listing_reports_json_error() {
        let app = test_router(ServiceConfig::default());
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/predictions");

        let mut cleared = listing(1000, "Mumbai");
        cleared["area"] = Value::Null;
        let (status, body) = send(&app, Method::POST, &uri, Some(cleared)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("area"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(&uri)
                    .body(Body::from("area=1000"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());

        let (_, body) = send(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(body["records"], json!([]));
    }

    #[tokio::test]
    async fn test_sessions_isolated() {
        let app = test_router(ServiceConfig::default());
        let first = new_session(&app).await;
        let second = new_session(&app).await;

        send(&app, Method::POST, &format!("/api/sessions/{first}/predictions"), Some(listing(1000, "Mumbai"))).await;

        let (_, body) = send(&app, Method::GET, &format!("/api/sessions/{second}/history"), None).await;
        assert_eq!(body["records"], json!([]));
    }

    #[tokio::test]
    async fn test_ended_session_not_found() {
        let app = test_router(ServiceConfig::default());
        let id = new_session(&app).await;

        let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains(&id));
    }

    #[tokio::test]
    async fn test_history_cap_from_config() {
        let mut config = ServiceConfig::default();
        config.history.max_records = 1;
        let app = test_router(config);
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/predictions");

        send(&app, Method::POST, &uri, Some(listing(1000, "Mumbai"))).await;
        send(&app, Method::POST, &uri, Some(listing(2400, "Delhi"))).await;

        let (_, body) = send(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["city"], "Delhi");
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = test_router(ServiceConfig::default());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("RentWise"));
        assert!(html.contains("Predict Rent"));
        // Evicted sessions are replaced instead of failing every request
        assert!(html.contains("res.status === 404"));
        assert!(html.contains("JSON.parse(text)"));
    }
}
