use crate::components::cache::RedisActorHandle;
use crate::components::ComponentManager;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Set up signal handlers for graceful shutdown
pub async fn handle_signals(
    shutdown_send: oneshot::Sender<()>,
    component_manager: Arc<ComponentManager>,
    redis_handle: Option<RedisActorHandle>,
) {
    // Wait for a termination signal
    if let Err(e) = wait_for_signal().await {
        error!("Failed to install signal handlers: {}", e);
        return;
    }

    // Shut down all components
    if let Err(e) = component_manager.shutdown_all().await {
        error!("Error shutting down components: {:?}", e);
    } else {
        info!("All components shut down successfully");
    }

    // Shut down Redis actor
    if let Some(redis_handle) = redis_handle {
        if let Err(e) = redis_handle.shutdown().await {
            error!("Error shutting down Redis actor: {:?}", e);
        } else {
            info!("Redis actor shut down successfully");
        }
    }

    // Stop the HTTP server
    let _ = shutdown_send.send(());
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal, initiating graceful shutdown");
        }
    }
    Ok(())
}

/// Wait for Ctrl+C or Ctrl+Break
#[cfg(windows)]
pub async fn wait_for_signal() -> std::io::Result<()> {
    let mut ctrlc = ctrl_c()?;
    let mut ctrlbreak = ctrl_break()?;

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, initiating graceful shutdown");
        }
    }
    Ok(())
}
