//! Ledger node connection manager
//!
//! Maintains a persistent WebSocket connection to the AgriChain ledger node.
//! Handles reconnection and provides a thread-safe interface for sending
//! framed requests.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async_with_config,
    tungstenite::{http::Request, protocol::Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::types::{AgriChainError, Result};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Transport over which framed ledger requests travel.
///
/// [`LedgerConnection`] is the production implementation; tests substitute
/// an in-memory transport serving canned responses.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Send one request frame and wait for the matching response frame
    async fn request(&self, data: Vec<u8>, timeout_ms: u64) -> Result<Vec<u8>>;

    /// Whether the transport currently has a live connection
    async fn is_connected(&self) -> bool;
}

/// Ledger node connection manager
pub struct LedgerConnection {
    /// URL of the node
    #[allow(dead_code)]
    node_url: String,
    /// Channel for sending frames to the node
    tx: mpsc::Sender<(Vec<u8>, oneshot::Sender<Vec<u8>>)>,
    /// Whether the connection is alive
    connected: Arc<RwLock<bool>>,
}

impl LedgerConnection {
    /// Connect to a ledger node
    pub async fn connect(node_url: &str) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<(Vec<u8>, oneshot::Sender<Vec<u8>>)>(1000);
        let connected = Arc::new(RwLock::new(false));

        let conn = Self {
            node_url: node_url.to_string(),
            tx,
            connected: Arc::clone(&connected),
        };

        // Start the connection manager task
        let url = node_url.to_string();
        let connected_flag = Arc::clone(&connected);
        tokio::spawn(async move {
            connection_loop(url, rx, connected_flag).await;
        });

        // Wait for initial connection
        for _ in 0..50 {
            if *conn.connected.read().await {
                return Ok(conn);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        Err(AgriChainError::Ledger(
            "Timeout waiting for ledger node connection".into(),
        ))
    }
}

#[async_trait]
impl LedgerTransport for LedgerConnection {
    async fn request(&self, data: Vec<u8>, timeout_ms: u64) -> Result<Vec<u8>> {
        let (response_tx, response_rx) = oneshot::channel();

        self.tx
            .send((data, response_tx))
            .await
            .map_err(|_| AgriChainError::Ledger("Ledger connection closed".into()))?;

        match timeout(Duration::from_millis(timeout_ms), response_rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(AgriChainError::Ledger("Response channel closed".into())),
            Err(_) => Err(AgriChainError::Ledger("Request timeout".into())),
        }
    }

    async fn is_connected(&self) -> bool {
        *self.connected.read().await
    }
}

/// Main connection loop with reconnection logic
async fn connection_loop(
    node_url: String,
    mut rx: mpsc::Receiver<(Vec<u8>, oneshot::Sender<Vec<u8>>)>,
    connected: Arc<RwLock<bool>>,
) {
    let mut reconnect_delay = Duration::from_millis(100);
    let max_reconnect_delay = Duration::from_secs(30);

    loop {
        info!("Connecting to ledger node at {}", node_url);

        match connect_to_node(&node_url).await {
            Ok((ws_sink, ws_stream)) => {
                *connected.write().await = true;
                reconnect_delay = Duration::from_millis(100);
                info!("Connected to ledger node");

                // Run the message handling loop
                if let Err(e) = handle_messages(ws_sink, ws_stream, &mut rx).await {
                    error!("Ledger connection error: {}", e);
                }

                *connected.write().await = false;
            }
            Err(e) => {
                error!("Failed to connect to ledger node: {}", e);
            }
        }

        // Wait before reconnecting
        warn!("Reconnecting to ledger node in {:?}...", reconnect_delay);
        tokio::time::sleep(reconnect_delay).await;
        reconnect_delay = (reconnect_delay * 2).min(max_reconnect_delay);
    }
}

/// Connect to the node with proper headers
async fn connect_to_node(url: &str) -> Result<(WsSink, WsStream)> {
    let request = Request::builder()
        .uri(url)
        .header("Host", url.split("//").last().unwrap_or("localhost"))
        .header("Origin", "http://localhost")
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header(
            "Sec-WebSocket-Key",
            tokio_tungstenite::tungstenite::handshake::client::generate_key(),
        )
        .body(())
        .map_err(|e| AgriChainError::Ledger(format!("Failed to build request: {}", e)))?;

    let (ws, _) = connect_async_with_config(request, None, false)
        .await
        .map_err(|e| AgriChainError::Ledger(format!("WebSocket connect failed: {}", e)))?;

    Ok(ws.split())
}

/// Handle frames between the request channel and the node WebSocket
async fn handle_messages(
    ws_sink: WsSink,
    mut ws_stream: WsStream,
    rx: &mut mpsc::Receiver<(Vec<u8>, oneshot::Sender<Vec<u8>>)>,
) -> Result<()> {
    // Pending responses in send order; node responses are ordered, so a
    // simple FIFO queue matches them up
    let pending: Arc<Mutex<Vec<oneshot::Sender<Vec<u8>>>>> = Arc::new(Mutex::new(Vec::new()));
    let pending_for_send = Arc::clone(&pending);

    // Wrap sink in Arc<Mutex> for sharing
    let ws_sink = Arc::new(Mutex::new(ws_sink));
    let ws_sink_for_rx = Arc::clone(&ws_sink);

    // Task to handle outgoing requests
    let request_handler = async {
        while let Some((data, response_tx)) = rx.recv().await {
            // Queue the response handler
            {
                let mut pending = pending_for_send.lock().await;
                pending.push(response_tx);
            }

            // Send to the node
            let mut sink = ws_sink_for_rx.lock().await;
            if let Err(e) = sink.send(Message::Binary(data)).await {
                error!("Failed to send to ledger node: {}", e);
                // Remove the pending response
                let mut pending = pending_for_send.lock().await;
                pending.pop();
                break;
            }
        }
    };

    // Task to handle responses from the node
    let response_handler = async {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Binary(data)) => {
                    // Get the next pending response handler
                    let maybe_sender = {
                        let mut pending = pending.lock().await;
                        if !pending.is_empty() {
                            Some(pending.remove(0))
                        } else {
                            None
                        }
                    };

                    if let Some(sender) = maybe_sender {
                        let _ = sender.send(data.to_vec());
                    } else {
                        warn!("Received response with no pending request");
                    }
                }
                Ok(Message::Ping(data)) => {
                    let mut sink = ws_sink.lock().await;
                    let _ = sink.send(Message::Pong(data)).await;
                }
                Ok(Message::Close(frame)) => {
                    info!("Ledger node closed connection: {:?}", frame);
                    break;
                }
                Err(e) => {
                    error!("Ledger WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    };

    // Run both handlers concurrently
    tokio::select! {
        _ = request_handler => {
            debug!("Request handler ended");
        }
        _ = response_handler => {
            debug!("Response handler ended");
        }
    }

    Ok(())
}
