//! Ferry Chat - terminal client for the ferry-booking assistant

mod terminal;

use ferry_chat::config::ChatConfig;
use ferry_chat::runtime::{
    DatabaseStore, InMemoryStore, ProductionController, SessionController, SessionStore,
};
use ferry_chat::service::{HttpAnswerService, LoggingService};
use ferry_chat::state_machine::SessionContext;
use ferry_chat::storage::SessionDb;
use std::sync::Arc;
use terminal::TerminalView;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the chat
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferry_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env()?;

    let store: Arc<dyn SessionStore> = if config.ephemeral {
        tracing::info!("Using in-memory session store");
        Arc::new(InMemoryStore::new())
    } else {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = SessionDb::open(&config.db_path)?;
        tracing::info!(path = %config.db_path.display(), "Database initialized");
        Arc::new(DatabaseStore::new(db, config.session_id.clone()))
    };

    let service = HttpAnswerService::new(&config.api_base_url, config.request_timeout)?;
    let client = LoggingService::new(Arc::new(service));
    tracing::info!(
        endpoint = %config.api_base_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Answering service configured"
    );

    let context = SessionContext::new(config.session_id.clone());
    let controller: ProductionController = SessionController::open(context, store, client).await;

    let handle = controller.handle();
    let view = TerminalView::from_state(controller.state()).shared();
    let renderer = tokio::spawn(terminal::render(handle.subscribe(), view.clone()));
    let runner = tokio::spawn(controller.run());

    let result = terminal::repl(handle, view).await;

    // The controller never runs out of events on its own; stop it explicitly
    runner.abort();
    renderer.abort();
    tracing::info!(session_id = %config.session_id, "Session closed");
    Ok(result?)
}
