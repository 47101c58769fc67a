//! Curfew - A state-managed HTTP service that enforces inactivity logout
//!
//! This is the main entry point for the curfew application.

use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use tracing::info;

use curfew::{
    api::create_router,
    boundary::{LocalSessionAuthority, Navigator, NoticeBoard, Notifier, RedirectSink, SessionAuthority},
    config::Config,
    monitor::{spawn_idle_monitor, MonitorConfig, MonitorDeps},
    state::{AppState, SessionState},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("curfew={},tower_http=info", config.log_level()))
        .init();

    info!("Starting curfew server v1.1.0");
    info!(
        "Configuration: host={}, port={}, inactivity timeout={}s, warning period={}s",
        config.host, config.port, config.inactivity_timeout, config.warning_period
    );

    // Reject timing configurations the countdown cannot honor
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    // Shared state and collaborator wiring
    let session = Arc::new(Mutex::new(SessionState::new()));
    let board = Arc::new(NoticeBoard::new());
    let redirects = Arc::new(RedirectSink::new());

    let deps = MonitorDeps {
        authority: Arc::new(LocalSessionAuthority::new(Arc::clone(&session)))
            as Arc<dyn SessionAuthority>,
        notifier: Arc::clone(&board) as Arc<dyn Notifier>,
        navigator: Arc::clone(&redirects) as Arc<dyn Navigator>,
    };
    let monitor_config = MonitorConfig {
        inactivity_timeout: config.inactivity_timeout(),
        warning_period: config.warning_period(),
        login_path: config.login_path.clone(),
    };

    // Start the idle monitor background task
    let monitor = spawn_idle_monitor(monitor_config, deps);

    // Create application state
    let state = Arc::new(AppState::new(&config, monitor, session, board, redirects));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /session/start  - Begin an authenticated session");
    info!("  POST /session/end    - End the session (external logout)");
    info!("  POST /activity       - Report a qualifying input event");
    info!("  POST /stay-connected - Keep the session alive from the warning");
    info!("  GET  /status         - Session, phase and countdown status");
    info!("  GET  /notices        - Currently visible notices");
    info!("  GET  /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
