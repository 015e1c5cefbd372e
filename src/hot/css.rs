//! CSS special case of the hot update channel.
//!
//! Initial CSS chunks are not discovered through the subscribe protocol:
//! they are the `<link>` elements already present in server-rendered HTML,
//! tagged with a data attribute carrying their chunk id. Each one gets a
//! pre-registered update callback:
//!
//! - `restart`: replace the `<link>` node with an equivalent fresh node. The
//!   browser refetches and reapplies the stylesheet; CSS cannot be patched
//!   in place.
//! - `partial`: always fails, routing into the full-reload fail-safe.

use std::sync::Arc;

use crate::chunk::ChunkId;
use crate::error::UpdateApplicationError;

use super::client::HotUpdateClient;
use super::message::UpdateMessage;

/// Handle to a stylesheet `<link>` DOM node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkNode(pub u64);

/// The document surface the CSS handler needs. The real DOM lives in the
/// embedding; tests swap in a double.
pub trait StyleDom: Send + Sync {
    /// Stylesheet links present in the server-rendered document, with the
    /// chunk id from their data attribute.
    fn initial_links(&self) -> Vec<(ChunkId, LinkNode)>;

    /// Swap a `<link>` for an equivalent fresh node and return the new node.
    fn replace_link(&self, node: LinkNode) -> LinkNode;
}

/// Pre-register an update callback for every server-rendered stylesheet.
///
/// Called once at session start, before the channel connects; the
/// registrations double as the subscription set replayed on connect.
pub fn register_initial_stylesheets(client: &HotUpdateClient, dom: &Arc<dyn StyleDom>) {
    for (chunk, node) in dom.initial_links() {
        let dom = Arc::clone(dom);
        let owner = chunk.clone();
        let mut current = node;

        client.on_chunk_update(
            chunk,
            Box::new(move |update| match update {
                UpdateMessage::Restart { .. } => {
                    current = dom.replace_link(current);
                    Ok(())
                }
                UpdateMessage::Partial { .. } => Err(UpdateApplicationError::new(
                    owner.clone(),
                    "stylesheets cannot be patched in place",
                )),
            }),
        );
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hot::client::{Reloader, Transport, TransportEvent};
    use parking_lot::Mutex;

    struct FakeDom {
        links: Vec<(ChunkId, LinkNode)>,
        /// (old, new) pairs, in replacement order.
        replaced: Mutex<Vec<(LinkNode, LinkNode)>>,
        next_node: Mutex<u64>,
    }

    impl FakeDom {
        fn new(links: Vec<(ChunkId, LinkNode)>) -> Self {
            let next = links.iter().map(|(_, n)| n.0).max().unwrap_or(0) + 1;
            Self {
                links,
                replaced: Mutex::new(Vec::new()),
                next_node: Mutex::new(next),
            }
        }
    }

    impl StyleDom for FakeDom {
        fn initial_links(&self) -> Vec<(ChunkId, LinkNode)> {
            self.links.clone()
        }

        fn replace_link(&self, node: LinkNode) -> LinkNode {
            let mut next = self.next_node.lock();
            let fresh = LinkNode(*next);
            *next += 1;
            self.replaced.lock().push((node, fresh));
            fresh
        }
    }

    struct NullTransport;
    impl Transport for NullTransport {
        fn send(&self, _text: String) {}
    }

    #[derive(Default)]
    struct CountingReloader {
        reloads: Mutex<Vec<ChunkId>>,
    }
    impl Reloader for CountingReloader {
        fn reload(&self, chunk: &ChunkId) {
            self.reloads.lock().push(chunk.clone());
        }
    }

    fn setup(dom: Arc<FakeDom>) -> (HotUpdateClient, Arc<CountingReloader>) {
        let reloader = Arc::new(CountingReloader::default());
        let client = HotUpdateClient::new(Arc::new(NullTransport), reloader.clone());
        let dom: Arc<dyn StyleDom> = dom;
        register_initial_stylesheets(&client, &dom);
        (client, reloader)
    }

    #[test]
    fn restart_replaces_the_link_node() {
        let dom = Arc::new(FakeDom::new(vec![(ChunkId::new("styles-css"), LinkNode(1))]));
        let (client, reloader) = setup(dom.clone());

        client.handle_event(TransportEvent::Message(
            r#"{"type":"restart","chunkId":"styles-css"}"#.to_string(),
        ));

        let replaced = dom.replaced.lock();
        assert_eq!(replaced.len(), 1);
        let (old, new) = replaced[0];
        assert_eq!(old, LinkNode(1));
        // Replacement, not mutation: a genuinely different node.
        assert_ne!(old, new);
        assert!(reloader.reloads.lock().is_empty());
    }

    #[test]
    fn second_restart_replaces_the_replacement() {
        let dom = Arc::new(FakeDom::new(vec![(ChunkId::new("styles-css"), LinkNode(1))]));
        let (client, _reloader) = setup(dom.clone());

        let frame = r#"{"type":"restart","chunkId":"styles-css"}"#;
        client.handle_event(TransportEvent::Message(frame.to_string()));
        client.handle_event(TransportEvent::Message(frame.to_string()));

        let replaced = dom.replaced.lock();
        assert_eq!(replaced.len(), 2);
        // The second swap targets the node the first swap produced.
        assert_eq!(replaced[1].0, replaced[0].1);
    }

    #[test]
    fn partial_update_routes_into_the_fail_safe() {
        let dom = Arc::new(FakeDom::new(vec![(ChunkId::new("styles-css"), LinkNode(1))]));
        let (client, reloader) = setup(dom.clone());

        client.handle_event(TransportEvent::Message(
            r#"{"type":"partial","chunkId":"styles-css"}"#.to_string(),
        ));

        assert!(dom.replaced.lock().is_empty());
        assert_eq!(*reloader.reloads.lock(), vec![ChunkId::new("styles-css")]);
    }

    #[test]
    fn every_initial_link_is_registered() {
        let dom = Arc::new(FakeDom::new(vec![
            (ChunkId::new("a-css"), LinkNode(1)),
            (ChunkId::new("b-css"), LinkNode(2)),
        ]));
        let (client, _reloader) = setup(dom.clone());

        client.handle_event(TransportEvent::Message(
            r#"{"type":"restart","chunkId":"b-css"}"#.to_string(),
        ));

        let replaced = dom.replaced.lock();
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].0, LinkNode(2));
    }
}
