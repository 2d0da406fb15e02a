//! Per-connection handler: hello, bind to a window, then shuttle frames.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};
use trellis_common::WindowId;

use crate::controller::DispatcherHandle;
use crate::hub::Outbox;
use crate::protocol::{ClientFrame, Hello, ServerMessage};

const HELLO_TIMEOUT: Duration = Duration::from_secs(10);

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsStream = SplitStream<WebSocketStream<TcpStream>>;

/// Handle a single surface connection.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    dispatcher: DispatcherHandle,
) {
    let (mut sink, mut stream) = ws.split();

    // 1. The first frame names the window this surface was launched for.
    let Some(window) = read_hello(&mut stream, addr).await else {
        let _ = send_message(&mut sink, &ServerMessage::error(None, "expected hello")).await;
        let _ = sink.close().await;
        return;
    };

    // 2. Bind it. Untracked windows are turned away.
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    match dispatcher.attach(window, outbox.clone()).await {
        Ok(true) => {}
        Ok(false) => {
            let message = ServerMessage::error(None, format!("unknown window {window}"));
            let _ = send_message(&mut sink, &message).await;
            let _ = sink.close().await;
            return;
        }
        Err(e) => {
            warn!(peer = %addr, error = %e, "attach failed");
            let _ = sink.close().await;
            return;
        }
    }
    info!(peer = %addr, window = %window, "surface connected");

    // 3. Forwarding loop.
    loop {
        tokio::select! {
            Some(message) = inbox.recv() => {
                let closing = matches!(message, ServerMessage::Close);
                if send_message(&mut sink, &message).await.is_err() || closing {
                    break;
                }
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&dispatcher, window, &text, &outbox);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // 4. Cleanup. Losing the connection closes the window.
    info!(peer = %addr, window = %window, "surface disconnected");
    let _ = sink.close().await;
    let _ = dispatcher.detach(window, outbox);
}

/// Parse one text frame and hand it to the dispatcher.
///
/// Requests (frames with an `id`) get their reply on a spawned task so the
/// read loop never waits on the dispatcher.
fn handle_frame(dispatcher: &DispatcherHandle, window: WindowId, text: &str, outbox: &Outbox) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(window = %window, error = %e, "malformed frame");
            let _ = outbox.send(ServerMessage::error(None, format!("malformed frame: {e}")));
            return;
        }
    };
    let id = value.get("id").and_then(serde_json::Value::as_u64);

    let frame: ClientFrame = match serde_json::from_value(value) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(window = %window, error = %e, "frame rejected");
            let _ = outbox.send(ServerMessage::error(id, format!("invalid message: {e}")));
            return;
        }
    };
    debug!(window = %window, kind = frame.message.kind(), id = ?frame.id, "frame received");

    let Some(id) = frame.id else {
        if let Err(e) = dispatcher.send(Some(window), frame.message) {
            warn!(window = %window, error = %e, "frame dropped");
        }
        return;
    };

    match dispatcher.request(Some(window), frame.message) {
        Ok(pending) => {
            let outbox = outbox.clone();
            tokio::spawn(async move {
                if let Ok(result) = pending.await {
                    let _ = outbox.send(ServerMessage::Reply { id, result });
                }
            });
        }
        Err(e) => {
            let _ = outbox.send(ServerMessage::error(Some(id), e.to_string()));
        }
    }
}

/// Read and parse the first message as a `Hello`.
async fn read_hello(stream: &mut WsStream, addr: SocketAddr) -> Option<WindowId> {
    let frame = tokio::time::timeout(HELLO_TIMEOUT, stream.next()).await;

    match frame {
        Ok(Some(Ok(Message::Text(text)))) => match serde_json::from_str::<Hello>(&text) {
            Ok(Hello::Hello { window }) => Some(window),
            Err(e) => {
                warn!(peer = %addr, error = %e, "Invalid hello message");
                None
            }
        },
        Ok(Some(Ok(_))) => {
            warn!(peer = %addr, "Expected text hello, got something else");
            None
        }
        Ok(Some(Err(e))) => {
            warn!(peer = %addr, error = %e, "WS error during hello");
            None
        }
        Ok(None) => {
            debug!(peer = %addr, "Connection closed before hello");
            None
        }
        Err(_) => {
            warn!(peer = %addr, "Hello timeout (10s)");
            None
        }
    }
}

/// Send a `ServerMessage` as a JSON text frame.
async fn send_message(
    sink: &mut WsSink,
    message: &ServerMessage,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    sink.send(Message::Text(message.to_json().into())).await
}
