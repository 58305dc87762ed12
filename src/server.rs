//! HTTP front end.
//!
//! `GET <telemetry_path>?target=<host>&user=<u>&pass=<p>` runs one scrape
//! against `target` and answers with the Prometheus text format. `GET /`
//! serves a small landing page linking to the telemetry path.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    config::web::WebConfig,
    core::{
        exporter::Exporter,
        exposition::{build_info, PrometheusSink},
        fetch::Target,
        metrics::MetricSink,
    },
};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[derive(Clone)]
pub struct AppState {
    exporter: Arc<Exporter>,
    telemetry_path: Arc<str>,
}

impl AppState {
    pub fn new(exporter: Arc<Exporter>, telemetry_path: &str) -> Self {
        Self {
            exporter,
            telemetry_path: Arc::from(telemetry_path),
        }
    }
}

/// Query string of a scrape request. Missing parameters are empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScrapeParams {
    target: String,
    user: String,
    pass: String,
}

pub fn router(state: AppState) -> Router {
    let telemetry_path = state.telemetry_path.to_string();
    Router::new()
        .route("/", get(landing_page))
        .route(&telemetry_path, get(scrape_handler))
        .with_state(state)
}

async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>ServerTech Exporter</title></head>\n\
         <body>\n\
         <h1>ServerTech Exporter</h1>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.telemetry_path
    ))
}

async fn scrape_handler(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    if params.target.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "'target' parameter must be specified",
        )
            .into_response();
    }

    let target = Target::new(params.target, params.user, params.pass);
    let sink = Arc::new(PrometheusSink::new());
    sink.emit(build_info());

    let reports = state.exporter.scrape(&target, sink.clone()).await;
    debug!(
        "Scrape of {} finished: {}/{} collector(s) up",
        target.host,
        reports.iter().filter(|r| r.up).count(),
        reports.len()
    );

    match sink.render() {
        Ok(body) => ([(header::CONTENT_TYPE, sink.content_type())], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics for {}: {}", target.host, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Binds `config.listen_address` and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: &WebConfig, exporter: Arc<Exporter>) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .map_err(|source| ServerError::Bind {
            address: config.listen_address.clone(),
            source,
        })?;

    info!(
        "Listening on {} (telemetry path {})",
        config.listen_address, config.telemetry_path
    );

    let app = router(AppState::new(exporter, &config.telemetry_path));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
