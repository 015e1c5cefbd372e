//! Server side of the hot update channel.
//!
//! The dev server keeps one [`UpdateHub`] per build session. Sockets live in
//! the embedding; the hub only sees a [`ClientSink`] per connected client and
//! the subscribe frames they send. Rebuild results are pushed with
//! [`UpdateHub::notify`], targeted to the clients subscribed to the affected
//! chunk.

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::chunk::ChunkId;

use super::message::{ClientMessage, UpdateMessage};

/// Outbound half of one connected client. Returns `false` when the client is
/// gone; the hub drops it on the next push.
pub trait ClientSink: Send + Sync {
    fn send(&self, text: String) -> bool;
}

/// A registered client with its subscription set.
struct HubClient {
    id: u64,
    sink: Arc<dyn ClientSink>,
    subscribed: FxHashSet<ChunkId>,
}

/// Per-session subscription hub.
#[derive(Default)]
pub struct UpdateHub {
    clients: Mutex<Vec<HubClient>>,
    next_id: AtomicU64,
}

impl UpdateHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connected client; returns its hub id.
    pub fn add_client(&self, sink: Arc<dyn ClientSink>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut clients = self.clients.lock();
        clients.push(HubClient {
            id,
            sink,
            subscribed: FxHashSet::default(),
        });
        crate::debug!("hot"; "client {} connected (total: {})", id, clients.len());
        id
    }

    /// Drop a client explicitly (transport saw it disconnect).
    pub fn remove_client(&self, id: u64) {
        self.clients.lock().retain(|client| client.id != id);
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Handle one inbound frame from a client.
    ///
    /// Subscription is idempotent: re-subscribing an already-subscribed
    /// chunk is a no-op, which is what lets the client side re-send freely.
    pub fn handle_frame(&self, client_id: u64, text: &str) {
        let Some(ClientMessage::Subscribe { chunk_id }) = ClientMessage::from_json(text) else {
            crate::debug!("hot"; "ignoring unparseable frame from client {client_id}: {text}");
            return;
        };
        let mut clients = self.clients.lock();
        if let Some(client) = clients.iter_mut().find(|client| client.id == client_id) {
            client.subscribed.insert(chunk_id);
        }
    }

    /// Push an update to every client subscribed to its chunk. Clients whose
    /// sink reports failure are dropped.
    pub fn notify(&self, update: &UpdateMessage) {
        let text = update.to_json();
        let chunk = update.chunk_id();
        let mut sent = 0usize;

        let mut clients = self.clients.lock();
        clients.retain(|client| {
            if !client.subscribed.contains(chunk) {
                return true;
            }
            if client.sink.send(text.clone()) {
                sent += 1;
                true
            } else {
                crate::debug!("hot"; "client {} disconnected", client.id);
                false
            }
        });

        if sent > 0 {
            crate::debug!("hot"; "pushed {} update to {} clients", chunk, sent);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<String>>,
        dead: std::sync::atomic::AtomicBool,
    }

    impl RecordingSink {
        fn kill(&self) {
            self.dead.store(true, Ordering::SeqCst);
        }
    }

    impl ClientSink for RecordingSink {
        fn send(&self, text: String) -> bool {
            if self.dead.load(Ordering::SeqCst) {
                return false;
            }
            self.frames.lock().push(text);
            true
        }
    }

    fn subscribe_frame(chunk: &str) -> String {
        ClientMessage::subscribe(chunk).to_json()
    }

    #[test]
    fn updates_are_pushed_only_to_subscribers() {
        let hub = UpdateHub::new();
        let subscribed = Arc::new(RecordingSink::default());
        let other = Arc::new(RecordingSink::default());

        let a = hub.add_client(subscribed.clone());
        let _b = hub.add_client(other.clone());
        hub.handle_frame(a, &subscribe_frame("pages-foo-js"));

        hub.notify(&UpdateMessage::restart("pages-foo-js"));

        assert_eq!(subscribed.frames.lock().len(), 1);
        assert!(other.frames.lock().is_empty());
    }

    #[test]
    fn resubscribing_is_idempotent() {
        let hub = UpdateHub::new();
        let sink = Arc::new(RecordingSink::default());
        let id = hub.add_client(sink.clone());

        hub.handle_frame(id, &subscribe_frame("a"));
        hub.handle_frame(id, &subscribe_frame("a"));

        hub.notify(&UpdateMessage::restart("a"));
        // One subscription, one push.
        assert_eq!(sink.frames.lock().len(), 1);
    }

    #[test]
    fn dead_clients_are_dropped_on_push() {
        let hub = UpdateHub::new();
        let sink = Arc::new(RecordingSink::default());
        let id = hub.add_client(sink.clone());
        hub.handle_frame(id, &subscribe_frame("a"));

        sink.kill();
        hub.notify(&UpdateMessage::restart("a"));

        assert_eq!(hub.client_count(), 0);
    }

    #[test]
    fn explicit_removal_stops_pushes() {
        let hub = UpdateHub::new();
        let sink = Arc::new(RecordingSink::default());
        let id = hub.add_client(sink.clone());
        hub.handle_frame(id, &subscribe_frame("a"));

        hub.remove_client(id);
        hub.notify(&UpdateMessage::restart("a"));

        assert!(sink.frames.lock().is_empty());
        assert_eq!(hub.client_count(), 0);
    }

    #[test]
    fn garbage_frames_are_ignored() {
        let hub = UpdateHub::new();
        let sink = Arc::new(RecordingSink::default());
        let id = hub.add_client(sink);

        hub.handle_frame(id, "not json");
        hub.handle_frame(id, r#"{"type":"restart","chunkId":"a"}"#);

        hub.notify(&UpdateMessage::restart("a"));
        assert_eq!(hub.client_count(), 1);
    }
}
