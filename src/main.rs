#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
mod executor;
mod structures;

use std::net::SocketAddr;

use axum::{
    extract::{Path, Query},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::structures::{BedrockPingResponse, ErrorSerialization, PingParams};

#[macro_use]
extern crate tracing;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() {
    start_tracing();
    let port: u16 = std::env::var("PORT").map_or(DEFAULT_PORT, |v| {
        v.parse().expect("PORT must be a valid port number")
    });
    let socket_address = SocketAddr::from(([0, 0, 0, 0], port));
    let tcp = TcpListener::bind(socket_address)
        .await
        .expect("failed to bind listener");
    info!(%socket_address, "listening");
    axum::serve(tcp, app())
        .with_graceful_shutdown(vss::shutdown_signal())
        .await
        .expect("server error");
}

static ROBOTS_NAME: HeaderName = HeaderName::from_static("x-robots-tag");
static ROBOTS_VALUE: HeaderValue = HeaderValue::from_static("noindex");
static CACHE_CONTROL_AGE: HeaderValue = HeaderValue::from_static("s-maxage=30");

fn app() -> Router {
    Router::new()
        .route("/api/:address", get(handle_bedrock_ping))
        .route("/api/bedrock/:address", get(handle_bedrock_ping))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    ROBOTS_NAME.clone(),
                    ROBOTS_VALUE.clone(),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    CACHE_CONTROL,
                    CACHE_CONTROL_AGE.clone(),
                )),
        )
}

async fn handle_bedrock_ping(
    Path(address): Path<String>,
    Query(params): Query<PingParams>,
) -> Result<Json<BedrockPingResponse>, Failure> {
    executor::ping_bedrock(&address, params).await.map(Json)
}

#[derive(thiserror::Error, Debug)]
pub enum Failure {
    #[error("Invalid server address")]
    InvalidAddress,
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidAddress => StatusCode::BAD_REQUEST,
        };
        error!(error = ?self, "Error processing request");
        let ser = ErrorSerialization {
            error: self.to_string(),
        };
        (status, Json(ser)).into_response()
    }
}

pub struct Json<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        static JSON_CTYPE: HeaderValue = HeaderValue::from_static("application/json;charset=utf-8");

        let body = serde_json::to_vec_pretty(&self.0).unwrap_or_else(|_| {
            r#"{"error": "JSON Serialization failed, please make a bug report"}"#
                .as_bytes()
                .to_vec()
        });
        ([(CONTENT_TYPE, JSON_CTYPE.clone())], body).into_response()
    }
}

/// Logs go through an `EnvFilter` read from `LOG`; `LOG_FORMAT=json` switches
/// to JSON lines.
fn start_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(concat!(env!("CARGO_PKG_NAME"), "=info").parse().unwrap())
        .with_env_var("LOG")
        .from_env()
        .expect("failed to parse env");
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(env_filter)
        .init();
}
