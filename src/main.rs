//! Drive proxy server binary.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use drive_proxy::{
	api::{self, AppState},
	config::{self, AppConfig},
	obs, session,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let dotenv = config::load_dotenv();

	obs::init_tracing();

	if let Some(path) = dotenv {
		tracing::debug!(path = %path.display(), "Loaded environment file.");
	}

	let config = AppConfig::from_env()?;
	let addr = config.listen_addr();
	let credentials: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let state = AppState::new(config, credentials)?;

	session::spawn_expired_sweep(state.sessions.clone(), session::SESSION_SWEEP_PERIOD);

	let router = api::router(state);
	let listener = TcpListener::bind(&addr).await?;

	tracing::info!(%addr, "Listening.");

	axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for the shutdown signal.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutting down.");
}
