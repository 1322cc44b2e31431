//! Test doubles for the delivery path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::transport::{OutboundRequest, Transport, TransportError};

/// What the fake endpoint answers.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Reply {
    Status(u16),
    ConnectionRefused,
}

/// Records every request and forwards a copy on a channel so tests can
/// await spawned deliveries.
pub(crate) struct RecordingTransport {
    reply: Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<OutboundRequest>>,
    tx: mpsc::UnboundedSender<OutboundRequest>,
}

impl RecordingTransport {
    pub(crate) fn new(reply: Reply) -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            tx,
        });
        (transport, rx)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: OutboundRequest) -> Result<u16, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let _ = self.tx.send(request);

        match self.reply {
            Reply::Status(status) if (200..300).contains(&status) => Ok(status),
            Reply::Status(status) => Err(TransportError::HttpStatus(status)),
            Reply::ConnectionRefused => {
                let err = reqwest::Client::new().get("://refused").build().unwrap_err();
                Err(TransportError::Request(err))
            }
        }
    }
}
