//! In-memory transport for tests.
//!
//! A `MockConnection` answers every frame it receives with whatever the
//! responder returns for that request. Responses can be held back behind a
//! gate so tests can keep exchanges in flight.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::{Notify, Semaphore};

use super::connection::{Connection, Connector};
use super::error::{DriverError, DriverResult};
use crate::protocol::{split_frame, MIME_TYPE};

/// Maps a decoded request to the response frames it triggers.
pub(crate) type Responder = Arc<dyn Fn(&Value) -> Vec<Value> + Send + Sync>;

/// State shared by a connector and every connection it dialed.
pub(crate) struct MockShared {
    responder: Responder,
    gate: Option<Arc<Semaphore>>,
    dialed: AtomicUsize,
    closed: AtomicUsize,
    failing_dials: AtomicUsize,
    fail_close: AtomicBool,
    sent: Mutex<Vec<Value>>,
    sent_notify: Notify,
}

impl MockShared {
    fn record(&self, request: Value) {
        self.sent.lock().push(request);
        self.sent_notify.notify_waiters();
    }
}

#[derive(Clone)]
pub(crate) struct MockConnector {
    shared: Arc<MockShared>,
}

impl MockConnector {
    pub(crate) fn new(responder: Responder) -> Self {
        Self::build(responder, None)
    }

    /// Every response waits for a permit on `gate`.
    pub(crate) fn gated(responder: Responder, gate: Arc<Semaphore>) -> Self {
        Self::build(responder, Some(gate))
    }

    /// Answers every request with a single `200` whose data echoes the script.
    pub(crate) fn echo() -> Self {
        Self::new(Arc::new(echo_responder))
    }

    fn build(responder: Responder, gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            shared: Arc::new(MockShared {
                responder,
                gate,
                dialed: AtomicUsize::new(0),
                closed: AtomicUsize::new(0),
                failing_dials: AtomicUsize::new(0),
                fail_close: AtomicBool::new(false),
                sent: Mutex::new(Vec::new()),
                sent_notify: Notify::new(),
            }),
        }
    }

    /// The next `count` dials fail.
    pub(crate) fn fail_next_dials(&self, count: usize) {
        self.shared.failing_dials.store(count, Ordering::SeqCst);
    }

    pub(crate) fn fail_close(&self, fail: bool) {
        self.shared.fail_close.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn dialed(&self) -> usize {
        self.shared.dialed.load(Ordering::SeqCst)
    }

    pub(crate) fn closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn sent(&self) -> Vec<Value> {
        self.shared.sent.lock().clone()
    }

    /// Wait until at least `count` frames were sent in total.
    pub(crate) async fn wait_for_sent(&self, count: usize) {
        loop {
            let notified = self.shared.sent_notify.notified();
            if self.shared.sent.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Connection = MockConnection;

    async fn connect(&self) -> DriverResult<MockConnection> {
        let failing = self.shared.failing_dials.load(Ordering::SeqCst);
        if failing > 0 {
            self.shared.failing_dials.store(failing - 1, Ordering::SeqCst);
            return Err(DriverError::transport("connection refused"));
        }

        let id = self.shared.dialed.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MockConnection {
            id,
            shared: Some(self.shared.clone()),
            pending: VecDeque::new(),
            peer_closed: false,
        })
    }
}

pub(crate) struct MockConnection {
    pub(crate) id: usize,
    shared: Option<Arc<MockShared>>,
    pending: VecDeque<Bytes>,
    peer_closed: bool,
}

impl MockConnection {
    /// Standalone connection replaying `responses` in order, whatever is sent.
    pub(crate) fn scripted(responses: Vec<Value>) -> (Self, MockConnector) {
        let connector = MockConnector::new(Arc::new(|_: &Value| Vec::new()));
        let conn = MockConnection {
            id: 0,
            shared: Some(connector.shared.clone()),
            pending: responses.iter().map(to_bytes).collect(),
            peer_closed: false,
        };
        (conn, connector)
    }

    /// Connection whose peer already sent a close frame.
    pub(crate) fn peer_closed() -> Self {
        MockConnection {
            id: 0,
            shared: None,
            pending: VecDeque::new(),
            peer_closed: true,
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn send(&mut self, message: Bytes) -> DriverResult<()> {
        if self.peer_closed {
            return Err(DriverError::ConnClosed);
        }

        let (mime, payload) = split_frame(&message)?;
        assert_eq!(mime, MIME_TYPE);
        let request: Value = serde_json::from_slice(payload)
            .map_err(|e| DriverError::Serialization(e.to_string()))?;

        if let Some(shared) = &self.shared {
            for response in (shared.responder)(&request) {
                self.pending.push_back(to_bytes(&response));
            }
            shared.record(request);
        }
        Ok(())
    }

    async fn recv(&mut self) -> DriverResult<Bytes> {
        if let Some(gate) = self.shared.as_ref().and_then(|s| s.gate.clone()) {
            gate.acquire()
                .await
                .map_err(|_| DriverError::ConnClosed)?
                .forget();
        }
        self.pending
            .pop_front()
            .ok_or_else(|| DriverError::transport("no response scripted"))
    }

    async fn close(&mut self) -> DriverResult<()> {
        if let Some(shared) = &self.shared {
            if shared.fail_close.load(Ordering::SeqCst) {
                return Err(DriverError::transport("close failed"));
            }
            shared.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

fn to_bytes(value: &Value) -> Bytes {
    Bytes::from(value.to_string())
}

/// `200` echoing the request's script as the single data item.
pub(crate) fn echo_responder(request: &Value) -> Vec<Value> {
    vec![json!({
        "requestId": request["requestId"],
        "status": { "code": 200, "message": "", "attributes": {} },
        "result": { "data": [request["args"]["gremlin"]], "meta": {} }
    })]
}

/// Frame with the given status code and data.
pub(crate) fn frame(code: u16, data: Value) -> Value {
    json!({
        "requestId": "00000000-0000-0000-0000-000000000000",
        "status": { "code": code, "message": "", "attributes": {} },
        "result": { "data": data, "meta": {} }
    })
}
