//! Localhost WebSocket server that presentation surfaces connect to.

mod connection;

use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tracing::{info, warn};

use crate::controller::DispatcherHandle;

pub use connection::handle_connection;

/// Accept surfaces until the dispatcher stops.
pub async fn serve(listener: TcpListener, dispatcher: DispatcherHandle) {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "IPC server listening");
    }

    while !dispatcher.is_closed() {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, addr, dispatcher).await,
                        Err(e) => {
                            warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "TCP accept error");
            }
        }
    }
}
