//! One devtools websocket with request/response correlation and event fan-out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::protocol::{Incoming, Request};
use crate::error::{AuditError, Result};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Reply = std::result::Result<Value, String>;

pub(crate) type PendingTable = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;
pub(crate) type ListenerTable = Arc<Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Value>>>>>;

pub struct CdpConnection {
    url: String,
    sink: Mutex<SplitSink<Socket, Message>>,
    next_id: AtomicU64,
    pending: PendingTable,
    listeners: ListenerTable,
    cancel: CancellationToken,
}

impl CdpConnection {
    pub async fn connect(url: &str) -> Result<Self> {
        debug!(%url, "opening devtools socket");
        let (socket, _) = connect_async(url)
            .await
            .map_err(|e| AuditError::connection(format!("cannot open {url}: {e}")))?;
        let (sink, stream) = socket.split();

        let pending: PendingTable = Arc::default();
        let listeners: ListenerTable = Arc::default();
        let cancel = CancellationToken::new();

        tokio::spawn(read_loop(
            stream,
            Arc::clone(&pending),
            Arc::clone(&listeners),
            cancel.clone(),
        ));

        Ok(Self {
            url: url.to_string(),
            sink: Mutex::new(sink),
            next_id: AtomicU64::new(1),
            pending,
            listeners,
            cancel,
        })
    }

    /// Sends one command and waits for the response with the same id.
    pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
        let (_, rx) = self.start(method, params).await?;
        await_reply(method, rx).await
    }

    /// Like [`send`](Self::send) but gives up after `limit`. The command is
    /// forgotten on timeout, so a late response is dropped. `None` on timeout.
    pub async fn send_within(
        &self,
        method: &str,
        params: Value,
        limit: Duration,
    ) -> Result<Option<Value>> {
        let (id, rx) = self.start(method, params).await?;
        match tokio::time::timeout(limit, await_reply(method, rx)).await {
            Ok(reply) => reply.map(Some),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                debug!(id, method, "no response in time, command dropped");
                Ok(None)
            }
        }
    }

    /// Registers a waiter for a fresh id and writes the command frame.
    async fn start(
        &self,
        method: &str,
        params: Value,
    ) -> Result<(u64, oneshot::Receiver<Reply>)> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::to_string(&Request { id, method, params })?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);
        // The reader clears the table only after cancelling, so checking here
        // cannot miss a close.
        if self.cancel.is_cancelled() {
            self.pending.lock().await.remove(&id);
            return Err(AuditError::connection(format!(
                "{method}: connection to {} is closed",
                self.url
            )));
        }

        debug!(id, method, "-> devtools");
        let sent = self.sink.lock().await.send(Message::Text(frame)).await;
        if let Err(e) = sent {
            self.pending.lock().await.remove(&id);
            return Err(e.into());
        }
        Ok((id, rx))
    }

    /// Receives the params of every future event named `method`.
    pub async fn subscribe(&self, method: &str) -> mpsc::UnboundedReceiver<Value> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .await
            .entry(method.to_string())
            .or_default()
            .push(tx);
        rx
    }

    pub async fn close(&self) {
        self.cancel.cancel();
        if let Err(e) = self.sink.lock().await.close().await {
            debug!(url = %self.url, error = %e, "socket close failed");
        }
    }
}

impl std::fmt::Debug for CdpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpConnection")
            .field("url", &self.url)
            .field("closed", &self.cancel.is_cancelled())
            .finish()
    }
}

impl Drop for CdpConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn await_reply(method: &str, rx: oneshot::Receiver<Reply>) -> Result<Value> {
    match rx.await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(message)) => Err(AuditError::protocol(method, message)),
        Err(_) => Err(AuditError::connection(format!(
            "{method}: connection closed before a response arrived"
        ))),
    }
}

async fn read_loop(
    mut stream: SplitStream<Socket>,
    pending: PendingTable,
    listeners: ListenerTable,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatch(&text, &pending, &listeners).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "devtools socket error");
                    break;
                }
            }
        }
    }
    cancel.cancel();
    fail_pending(&pending).await;
}

/// Routes one incoming frame to its waiting command or to event listeners.
pub(crate) async fn dispatch(text: &str, pending: &PendingTable, listeners: &ListenerTable) {
    let incoming: Incoming = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, "unparseable devtools frame");
            return;
        }
    };

    if let Some(id) = incoming.id {
        let waiter = pending.lock().await.remove(&id);
        match waiter {
            Some(tx) => {
                let reply = match incoming.error {
                    Some(err) => Err(err.describe()),
                    None => Ok(incoming.result),
                };
                let _ = tx.send(reply);
            }
            None => debug!(id, "response for unknown command"),
        }
        return;
    }

    if let Some(method) = incoming.method {
        let mut table = listeners.lock().await;
        if let Some(subscribers) = table.get_mut(&method) {
            debug!(%method, "<- event");
            subscribers.retain(|tx| tx.send(incoming.params.clone()).is_ok());
        }
    }
}

async fn fail_pending(pending: &PendingTable) {
    let mut table = pending.lock().await;
    if !table.is_empty() {
        warn!(count = table.len(), "devtools socket closed with commands in flight");
    }
    // Dropping the senders wakes every waiter with a closed-channel error.
    table.clear();
}
