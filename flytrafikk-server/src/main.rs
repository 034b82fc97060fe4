//! flytrafikk server - HTTP entry point
//!
//! This binary exposes the aggregation library over HTTP for the map UI.

mod error;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use flytrafikk::airlines::AirlineTable;
use flytrafikk::config::AppConfig;
use flytrafikk::logging;
use flytrafikk::orchestrator::Orchestrator;
use flytrafikk::provider::ReqwestClient;

use error::ServerError;
use routes::AppState;

#[derive(Parser)]
#[command(name = "flytrafikk-server")]
#[command(about = "Serve aggregated live flight data over HTTP", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8787")]
    port: u16,

    /// Directory holding the airline code table
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for log files
    #[arg(long, default_value = logging::default_log_dir())]
    log_dir: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        e.exit();
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let _logging_guard = logging::init_logging(&args.log_dir, logging::default_log_file())
        .map_err(ServerError::LoggingInit)?;

    info!(version = flytrafikk::VERSION, "starting");
    let mut config = AppConfig::from_env();
    config.data_dir = args.data_dir;

    // Loaded once; classification degrades gracefully if the file is
    // missing.
    let table = AirlineTable::global(&config.data_dir);

    let client = ReqwestClient::new().map_err(ServerError::HttpClient)?;
    let state = Arc::new(AppState {
        budget_ceiling: config.budget.ceiling(),
        orchestrator: Orchestrator::new(client, config, table),
    });

    // The UI is served from a different origin, so every response needs
    // CORS headers and the preflight OPTIONS must succeed.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/flights", get(routes::flights))
        .layer(cors)
        .with_state(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|error| ServerError::Bind {
            addr: addr.clone(),
            error,
        })?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app).await.map_err(ServerError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_defaults_come_from_the_library() {
        let args = Args::parse_from(["flytrafikk-server"]);
        assert_eq!(args.port, 8787);
        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.log_dir, logging::default_log_dir());
    }

    #[test]
    fn arguments_override_defaults() {
        let args = Args::parse_from(["flytrafikk-server", "--port", "9000", "--log-dir", "/tmp/l"]);
        assert_eq!(args.port, 9000);
        assert_eq!(args.log_dir, "/tmp/l");
    }
}
