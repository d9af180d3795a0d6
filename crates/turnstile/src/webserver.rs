//! HTTP listener with graceful shutdown

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::prelude::*;

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		error!("Cannot listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutdown signal received, draining connections");
}

/// Serve `router` on the configured address until Ctrl-C
///
/// The peer address is attached to every request, standalone mode reads the
/// client address from it.
pub async fn serve(app: App, router: Router) -> TsResult<()> {
	let listener = TcpListener::bind(app.opts.listen.as_ref()).await.inspect_err(|e| {
		error!("FATAL: Cannot bind {}: {}", app.opts.listen, e);
	})?;
	info!(mode = ?app.opts.mode, "Listening on HTTP {}", app.opts.listen);

	axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	info!("Server stopped");
	Ok(())
}

// vim: ts=4
