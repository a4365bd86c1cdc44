use easy_sgr::{Color::*, Style::*};
use tokio::signal;

/// The finishing of this future indicates a shutdown signal
///
/// # Panics
///
/// Panics if either the `ctrl_c` signal or `sigterm`
/// signal for unix fails to be installed
pub async fn shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            eprintln!("{BlueFg}Ctrl-C received, waiting for open requests{Reset}");
        },
        () = terminate => {
            eprintln!("{BlueFg}SIGTERM received, waiting for open requests{Reset}");
        },
    }
}
