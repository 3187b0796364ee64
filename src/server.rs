use crate::{body::ChannelReader, notify, Config, Driver, Error, RaceRegistry, Report};
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::mpsc};
use tower_http::decompression::RequestDecompressionLayer;

/// Body chunks buffered ahead of a running aggregation
const BODY_CHANNEL_CAPACITY: usize = 16;

/// Shared state of all handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    driver: Driver,
    races: Arc<RaceRegistry>,
}

impl AppState {
    /// Creates the state for a server running with `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let driver = Driver::new(config.racer_id.clone()).progress_interval(config.progress_interval);

        Self {
            config: Arc::new(config),
            driver,
            races: Arc::new(RaceRegistry::new()),
        }
    }

    /// Race sessions of this server.
    #[must_use]
    pub fn races(&self) -> &RaceRegistry {
        &self.races
    }
}

/// Message exchanged on the race endpoints.
///
/// All fields are always present on the wire, missing ones read as empty.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RaceMessage {
    /// Race token
    pub token: String,

    /// Race ID
    pub id: String,

    /// Identity of the serving process
    #[serde(rename = "racerid")]
    pub racer_id: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Io(_) | Self::Decode(_) | Self::UnexpectedToken { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidConfig { .. } | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}

/// Builds the HTTP routes.
///
/// Compressed request bodies are decompressed before they reach a handler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/temperatures", post(temperatures))
        .route("/races", post(start_race))
        .route("/races/{race_id}/laps", post(lap))
        .layer(RequestDecompressionLayer::new())
        .with_state(state)
}

/// Streams the request body through a fresh aggregation.
///
/// The driver runs on a blocking thread and pulls body chunks through a
/// bounded channel. If this future is dropped the channel closes, the
/// driver fails on the truncated input and its state is discarded.
async fn temperatures(State(state): State<AppState>, body: Body) -> crate::Result<Json<Report>> {
    log::info!("starting aggregation ({})", state.config.precision);

    let (tx, rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);

    let driver = state.driver.clone();
    let precision = state.config.precision;
    let worker =
        tokio::task::spawn_blocking(move || driver.run_with(precision, ChannelReader::new(rx)));

    let mut chunks = body.into_data_stream();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(std::io::Error::other);
        let failed = chunk.is_err();

        // NOTE: A failed send means the driver already stopped on an error
        if tx.send(chunk).await.is_err() || failed {
            break;
        }
    }

    drop(tx);

    let report = worker.await??;
    Ok(Json(report))
}

async fn start_race(
    State(state): State<AppState>,
    body: Bytes,
) -> crate::Result<(StatusCode, Json<RaceMessage>)> {
    log::info!("starting race");

    let message: RaceMessage = serde_json::from_slice(&body)?;
    let race_id = state.races.start(message.token);

    Ok((
        StatusCode::CREATED,
        Json(RaceMessage {
            id: race_id,
            racer_id: state.config.racer_id.clone(),
            ..Default::default()
        }),
    ))
}

async fn lap(
    State(state): State<AppState>,
    Path(race_id): Path<String>,
    token: Bytes,
) -> Json<RaceMessage> {
    log::info!("lap for {race_id}");

    // NOTE: Tokens are opaque, invalid UTF-8 is replaced rather than rejected
    let token = String::from_utf8_lossy(&token).into_owned();
    let last_token = state.races.lap(&race_id, token);

    Json(RaceMessage {
        token: last_token,
        racer_id: state.config.racer_id.clone(),
        ..Default::default()
    })
}

/// Binds the configured port, signals readiness and serves until Ctrl-C.
///
/// # Errors
///
/// Returns error if the port could not be bound or the server failed.
pub async fn serve(config: Config) -> crate::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    log::info!(
        "racer {} listening on {} ({})",
        config.racer_id,
        listener.local_addr()?,
        config.precision,
    );

    match notify::ready() {
        Ok(true) => log::debug!("service manager notified"),
        Ok(false) => {}
        Err(e) => log::warn!("could not notify service manager: {e}"),
    }

    axum::serve(listener, router(AppState::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }

    log::info!("shutting down");
}
