//! Listener binding and shutdown

use anyhow::Result;
use axum::Router;
use receipt_core::Settings;
use std::future::Future;
use tokio::net::TcpListener;

/// Bind the configured port and serve submissions until SIGINT or SIGTERM.
pub async fn start_server(settings: &Settings, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", settings.server_port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(
        addr = %addr,
        environment = %settings.environment,
        config_store = %settings.config_store_ref,
        max_request_body_bytes = settings.max_request_body_bytes,
        "Receipt intake listening"
    );

    serve_until(listener, app, shutdown_signal()).await
}

/// Serve `app` on `listener`, draining open requests once `shutdown` resolves.
pub async fn serve_until<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Receipt intake stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutdown requested, finishing open submissions");
}
