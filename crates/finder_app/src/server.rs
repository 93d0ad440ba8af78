use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use finder_core::{JobRegistry, SearchService};
use finder_engine::{EngineHandle, FetchError};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::config::AppConfig;
use crate::routes::{router, AppState};

/// Wires the registry, engine and router together. The registry lives for
/// as long as the returned state does.
pub fn build_state(config: &AppConfig, runtime: Handle) -> Result<AppState, FetchError> {
    let registry = Arc::new(JobRegistry::new());
    let engine = EngineHandle::new(config.fetch.to_settings(), runtime)?;
    Ok(AppState {
        service: SearchService::new(registry, Arc::new(engine), config.max_urls),
    })
}

/// Serves until Ctrl-C or SIGTERM, then drains open connections for at most
/// `shutdown_grace_secs`.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    engine_info!("Listening on {}", addr);

    let state = build_state(&config, Handle::current()).context("failed to build http client")?;
    let app = router(state, config.max_body_bytes);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .into_future(),
    );

    tokio::select! {
        _ = shutdown_signal() => {
            engine_info!("Shutdown requested");
        }
        finished = &mut server => {
            finished.context("server task failed")??;
            return Ok(());
        }
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(config.shutdown_grace(), server).await {
        Ok(finished) => finished.context("server task failed")??,
        Err(_) => engine_warn!(
            "Connections still open after {:?}; exiting anyway",
            config.shutdown_grace()
        ),
    }
    engine_info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            engine_warn!("Could not listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                engine_warn!("Could not listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
