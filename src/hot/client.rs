//! Client side of the hot update channel.
//!
//! A [`HotUpdateClient`] sits between the external transport (the WebSocket
//! wrapper owns reconnect/backoff, we only see its events) and the update
//! callbacks registered per chunk:
//!
//! ```text
//! Transport --[Connected/Message/Disconnected]--> HotUpdateClient
//!     ^                                                |
//!     +----------------[subscribe frames]--------------+
//! ```
//!
//! Failure policy: a callback that fails while applying an update is logged
//! with its owning chunk id and escalates to one full page reload - an
//! incremental update that cannot be applied safely is recovered by
//! discarding incrementality entirely, once, without retry.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::chunk::ChunkId;
use crate::error::UpdateApplicationError;

use super::message::{ClientMessage, UpdateMessage};

// =============================================================================
// Collaborators
// =============================================================================

/// Outbound half of the connection. Reconnect and backoff live behind this
/// seam; sends while disconnected are the transport's problem.
pub trait Transport: Send + Sync {
    fn send(&self, text: String);
}

/// Connection events delivered by the transport, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Message(String),
    Disconnected,
}

/// Forces a full page navigation/reload - the universal fail-safe.
pub trait Reloader: Send + Sync {
    fn reload(&self, chunk: &ChunkId);
}

/// Per-chunk update callback. Invoked synchronously, in registration order,
/// with the full update message.
pub type UpdateCallback =
    Box<dyn FnMut(&UpdateMessage) -> Result<(), UpdateApplicationError> + Send>;

// =============================================================================
// SubscriptionTable
// =============================================================================

/// Chunk id -> ordered callbacks. Entries are never removed: subscriptions
/// are session-lifetime, and a full reload is the only reset.
#[derive(Default)]
struct SubscriptionTable {
    callbacks: FxHashMap<ChunkId, Vec<UpdateCallback>>,
    /// Registration order of chunk ids, for deterministic resubscription.
    order: Vec<ChunkId>,
}

impl SubscriptionTable {
    fn add(&mut self, chunk: ChunkId, callback: UpdateCallback) {
        if !self.callbacks.contains_key(&chunk) {
            self.order.push(chunk.clone());
        }
        self.callbacks.entry(chunk).or_default().push(callback);
    }
}

// =============================================================================
// HotUpdateClient
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelState {
    Disconnected,
    Connected,
}

/// Client-side state machine of the hot update channel.
pub struct HotUpdateClient {
    transport: Arc<dyn Transport>,
    reloader: Arc<dyn Reloader>,
    table: Mutex<SubscriptionTable>,
    state: Mutex<ChannelState>,
    /// The fail-safe fires at most once per session.
    reload_issued: AtomicBool,
}

impl HotUpdateClient {
    pub fn new(transport: Arc<dyn Transport>, reloader: Arc<dyn Reloader>) -> Self {
        Self {
            transport,
            reloader,
            table: Mutex::new(SubscriptionTable::default()),
            state: Mutex::new(ChannelState::Disconnected),
            reload_issued: AtomicBool::new(false),
        }
    }

    pub fn is_connected(&self) -> bool {
        *self.state.lock() == ChannelState::Connected
    }

    /// Register a callback for one chunk's updates.
    ///
    /// Sends a subscribe frame unconditionally - server-side subscription is
    /// idempotent, and re-sending keeps the client stateless about what the
    /// server already knows.
    pub fn on_chunk_update(&self, chunk: ChunkId, callback: UpdateCallback) {
        self.table.lock().add(chunk.clone(), callback);
        self.send_subscribe(&chunk);
    }

    /// Feed one transport event into the state machine.
    pub fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                *self.state.lock() = ChannelState::Connected;
                // Recover subscriptions lost while disconnected.
                let chunks: Vec<ChunkId> = self.table.lock().order.clone();
                crate::debug!("hot"; "connected, resubscribing {} chunks", chunks.len());
                for chunk in &chunks {
                    self.send_subscribe(chunk);
                }
            }
            TransportEvent::Disconnected => {
                *self.state.lock() = ChannelState::Disconnected;
            }
            TransportEvent::Message(text) => self.apply_frame(&text),
        }
    }

    fn send_subscribe(&self, chunk: &ChunkId) {
        self.transport
            .send(ClientMessage::subscribe(chunk.clone()).to_json());
    }

    /// Parse and dispatch one update frame.
    fn apply_frame(&self, text: &str) {
        let Some(update) = UpdateMessage::from_json(text) else {
            crate::debug!("hot"; "ignoring unparseable frame: {text}");
            return;
        };
        let chunk = update.chunk_id().clone();

        // Take the chunk's callbacks out of the table for the dispatch, so a
        // callback registering further subscriptions cannot deadlock.
        let mut callbacks = {
            let mut table = self.table.lock();
            match table.callbacks.get_mut(&chunk) {
                Some(slot) if !slot.is_empty() => std::mem::take(slot),
                // Stale or irrelevant update: drop silently.
                _ => {
                    crate::debug!("hot"; "dropping update for unsubscribed chunk {chunk}");
                    return;
                }
            }
        };

        let mut failure = None;
        for callback in callbacks.iter_mut() {
            if let Err(err) = callback(&update) {
                // One guard spans the whole loop: remaining callbacks of
                // this chunk are skipped. Other chunks are unaffected.
                failure = Some(err);
                break;
            }
        }

        {
            let mut table = self.table.lock();
            let slot = table.callbacks.entry(chunk.clone()).or_default();
            let added_during_dispatch = std::mem::take(slot);
            *slot = callbacks;
            slot.extend(added_during_dispatch);
        }

        if let Some(err) = failure {
            // Named by the dispatch site's own chunk id, not whatever the
            // callback put in the error.
            crate::log!("hot"; "update for chunk {chunk} failed: {err}");
            if !self.reload_issued.swap(true, Ordering::SeqCst) {
                self.reloader.reload(&chunk);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
