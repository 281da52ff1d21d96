//! STOMP client over a single WebSocket connection.
//!
//! One writer task owns the socket sink and drains an outgoing queue. One
//! reader task owns the stream and routes MESSAGE frames to subscriptions by
//! their `subscription` header.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;

use super::frame::{Command, Frame};
use crate::api::ApiClient;
use crate::errors::{ClientError, Result};

/// How long to wait for the broker's CONNECTED frame.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type Routes = Mutex<HashMap<String, mpsc::UnboundedSender<Frame>>>;

struct Inner {
    outgoing: mpsc::UnboundedSender<Frame>,
    routes: Routes,
    connected: AtomicBool,
    next_id: AtomicU64,
}

impl Inner {
    fn enqueue(&self, frame: Frame) -> Result<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(ClientError::Realtime("Broker connection is closed".to_string()));
        }
        self.outgoing
            .send(frame)
            .map_err(|_| ClientError::Realtime("Broker connection is closed".to_string()))
    }
}

/// Handle to a connected message broker. Clones share the connection.
#[derive(Clone)]
pub struct BrokerClient {
    inner: Arc<Inner>,
}

impl BrokerClient {
    /// Connect to the broker endpoint configured on `api`, presenting the
    /// session cookie from its jar.
    pub async fn connect(api: &ApiClient) -> Result<Self> {
        Self::connect_to(api.ws_url(), api.cookie_header()).await
    }

    pub async fn connect_to(url: &Url, cookie: Option<HeaderValue>) -> Result<Self> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ClientError::Realtime(format!("Invalid broker URL: {}", e)))?;
        if let Some(cookie) = cookie {
            request.headers_mut().insert("cookie", cookie);
        }

        let (socket, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| ClientError::Realtime(format!("WebSocket connect failed: {}", e)))?;
        let (mut sink, mut stream) = socket.split();

        let host = url.host_str().unwrap_or("localhost").to_string();
        let connect = Frame::new(Command::Connect)
            .header("accept-version", "1.2")
            .header("host", host)
            .header("heart-beat", "0,0");
        sink.send(Message::Text(connect.encode()))
            .await
            .map_err(|e| ClientError::Realtime(format!("Failed to send CONNECT: {}", e)))?;

        let handshake = async {
            while let Some(message) = stream.next().await {
                let message = message
                    .map_err(|e| ClientError::Realtime(format!("WebSocket error: {}", e)))?;
                let Some(frame) = decode_message(message)? else {
                    continue;
                };
                return match frame.command {
                    Command::Connected => Ok(frame),
                    Command::Error => Err(ClientError::Realtime(format!(
                        "Broker refused connection: {}",
                        frame.get("message").unwrap_or(&frame.body)
                    ))),
                    other => Err(ClientError::Realtime(format!(
                        "Expected CONNECTED, got {}",
                        other
                    ))),
                };
            }
            Err(ClientError::Realtime(
                "Connection closed during handshake".to_string(),
            ))
        };
        let connected = tokio::time::timeout(CONNECT_TIMEOUT, handshake)
            .await
            .map_err(|_| ClientError::Realtime("Timed out waiting for CONNECTED".to_string()))??;
        tracing::info!(
            "Connected to broker {} (STOMP {})",
            url,
            connected.get("version").unwrap_or("1.2")
        );

        let (outgoing, mut queue) = mpsc::unbounded_channel::<Frame>();
        let inner = Arc::new(Inner {
            outgoing,
            routes: Mutex::new(HashMap::new()),
            connected: AtomicBool::new(true),
            next_id: AtomicU64::new(0),
        });

        let writer_inner = Arc::downgrade(&inner);
        tokio::spawn(async move {
            while let Some(frame) = queue.recv().await {
                let closing = frame.command == Command::Disconnect;
                if let Err(e) = sink.send(Message::Text(frame.encode())).await {
                    tracing::warn!("Broker write failed: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
            let _ = sink.close().await;
            if let Some(inner) = writer_inner.upgrade() {
                inner.connected.store(false, Ordering::SeqCst);
            }
        });

        let reader_inner = Arc::downgrade(&inner);
        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                let Some(inner) = reader_inner.upgrade() else {
                    break;
                };
                let message = match message {
                    Ok(Message::Close(_)) => break,
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!("Broker read failed: {}", e);
                        break;
                    }
                };
                match decode_message(message) {
                    Ok(Some(frame)) => route(&inner, frame),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Dropping broker frame: {}", e),
                }
            }
            if let Some(inner) = reader_inner.upgrade() {
                inner.connected.store(false, Ordering::SeqCst);
                // Dropping the senders ends every subscription stream.
                inner.routes.lock().map(|mut r| r.clear()).ok();
            }
            tracing::info!("Broker connection closed");
        });

        Ok(Self { inner })
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Subscribe to a destination. Dropping the subscription unsubscribes.
    pub fn subscribe(&self, destination: &str) -> Result<Subscription> {
        let id = format!("sub-{}", self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = mpsc::unbounded_channel();
        self.inner
            .routes
            .lock()
            .map_err(|_| ClientError::Realtime("Subscription table poisoned".to_string()))?
            .insert(id.clone(), sender);

        let frame = Frame::new(Command::Subscribe)
            .header("id", id.clone())
            .header("destination", destination)
            .header("ack", "auto");
        if let Err(e) = self.inner.enqueue(frame) {
            self.inner.routes.lock().map(|mut r| r.remove(&id)).ok();
            return Err(e);
        }

        tracing::info!("Subscribed to {} as {}", destination, id);
        Ok(Subscription {
            id,
            destination: destination.to_string(),
            receiver,
            broker: Arc::downgrade(&self.inner),
        })
    }

    /// Publish a JSON body to a destination.
    pub fn publish<T: Serialize>(&self, destination: &str, body: &T) -> Result<()> {
        let frame = Frame::new(Command::Send)
            .header("destination", destination)
            .header("content-type", "application/json")
            .body(serde_json::to_string(body)?);
        self.inner.enqueue(frame)
    }

    /// Send DISCONNECT and let the writer close the socket.
    pub fn disconnect(&self) {
        if self.inner.enqueue(Frame::new(Command::Disconnect)).is_ok() {
            tracing::info!("Disconnecting from broker");
        }
        self.inner.connected.store(false, Ordering::SeqCst);
    }
}

fn decode_message(message: Message) -> Result<Option<Frame>> {
    match message {
        Message::Text(text) => Frame::decode(&text),
        Message::Binary(data) => {
            let text = String::from_utf8(data)
                .map_err(|_| ClientError::Realtime("Binary frame is not UTF-8".to_string()))?;
            Frame::decode(&text)
        }
        _ => Ok(None),
    }
}

fn route(inner: &Inner, frame: Frame) {
    match frame.command {
        Command::Message => {
            let Some(id) = frame.get("subscription").map(str::to_string) else {
                tracing::warn!("MESSAGE without subscription header");
                return;
            };
            let Ok(mut routes) = inner.routes.lock() else {
                return;
            };
            if let Some(sender) = routes.get(&id) {
                if sender.send(frame).is_err() {
                    routes.remove(&id);
                }
            }
        }
        Command::Error => {
            tracing::warn!(
                "Broker error: {}",
                frame.get("message").unwrap_or(&frame.body)
            );
        }
        Command::Receipt => {}
        other => tracing::debug!("Ignoring {} frame", other),
    }
}

/// A live subscription. Yields frames until it is dropped or the connection
/// closes.
pub struct Subscription {
    id: String,
    destination: String,
    receiver: mpsc::UnboundedReceiver<Frame>,
    broker: Weak<Inner>,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub async fn next(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Next message body decoded as JSON. Undecodable bodies are logged and
    /// skipped.
    pub async fn next_json<T: DeserializeOwned>(&mut self) -> Option<T> {
        while let Some(frame) = self.next().await {
            match serde_json::from_str(&frame.body) {
                Ok(value) => return Some(value),
                Err(e) => tracing::warn!("Undecodable message on {}: {}", self.destination, e),
            }
        }
        None
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.broker.upgrade() else {
            return;
        };
        inner.routes.lock().map(|mut r| r.remove(&self.id)).ok();
        let frame = Frame::new(Command::Unsubscribe).header("id", self.id.clone());
        if inner.enqueue(frame).is_ok() {
            tracing::debug!("Unsubscribed {} from {}", self.id, self.destination);
        }
    }
}
