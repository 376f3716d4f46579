use tokio::{
    select,
    signal::ctrl_c,
    task::{self, JoinHandle},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

#[cfg(unix)]
async fn sigterm_listener() {
    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn sigterm_listener() {
    std::future::pending::<()>().await;
}

pub fn run(cancel_token: CancellationToken) -> JoinHandle<()> {
    task::spawn(async move {
        select! {
            _ = cancel_token.cancelled() => info!("Cancelled"),
            _ = ctrl_c() => warn!("Ctrl+C received"),
            _ = sigterm_listener() => warn!("SIGTERM received"),
        };
        info!("Initiating shutdown");
        cancel_token.cancel();
        info!("Exited");
    })
}
