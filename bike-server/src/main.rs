use std::process;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bike_server::config::DashboardConfig;
use bike_server::geo::BoundaryService;
use bike_server::seoul::{MockBikeClient, SeoulBikeClient, StationFeed};
use bike_server::session::{SessionConfig, SessionStore};
use bike_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DashboardConfig::from_env().unwrap_or_else(|e| {
        error!(error = %e, "invalid configuration");
        process::exit(1);
    });

    // Mock pages win over the live API when both are configured
    let feed = match &config.mock_data {
        Some(dir) => match MockBikeClient::new(dir) {
            Ok(client) => {
                info!(dir = ?dir, pages = client.page_count(), "using mock station data");
                StationFeed::Mock(client)
            }
            Err(e) => {
                error!(error = %e, "failed to load mock station data");
                process::exit(1);
            }
        },
        None => {
            if config.api_key.is_none() {
                warn!("SEOUL_API_KEY not set. API calls will fail.");
            }
            match SeoulBikeClient::new(config.bike_config()) {
                Ok(client) => StationFeed::Live(client),
                Err(e) => {
                    error!(error = %e, "failed to create API client");
                    process::exit(1);
                }
            }
        }
    };

    let boundary = BoundaryService::new(config.boundary_config()).unwrap_or_else(|e| {
        error!(error = %e, "failed to create boundary client");
        process::exit(1);
    });

    let sessions = SessionStore::new(&SessionConfig::default());
    let state = AppState::new(feed, sessions, boundary, config.utc_offset_secs);
    let app = create_router(state, &config.static_dir);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "failed to bind");
            process::exit(1);
        }
    };

    info!("Seoul bike dashboard listening on http://{}", config.bind_addr);
    info!("  GET  /              - Dashboard");
    info!("  GET  /api/status    - Classification summary");
    info!("  GET  /api/stations  - Map markers");
    info!("  GET  /api/boundary  - District boundaries");
    info!("  GET  /health        - Health check");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        process::exit(1);
    }
}
