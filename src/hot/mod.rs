//! Hot update channel.
//!
//! The subscribe/update protocol between the dev server and a running
//! browser session:
//!
//! ```text
//! UpdateHub --[restart/partial]--> Transport --> HotUpdateClient --> callbacks
//!     ^                                                |
//!     +-----------------[subscribe]--------------------+
//! ```
//!
//! # Module Structure
//!
//! - `message` - JSON wire frames, always chunk-scoped
//! - `client` - browser-side state machine, subscription table, fail-safe
//! - `css` - the stylesheet special case (restart-only, replace-not-patch)
//! - `server` - dev-server subscription hub with targeted push

pub mod client;
pub mod css;
pub mod message;
pub mod server;

pub use client::{HotUpdateClient, Reloader, Transport, TransportEvent, UpdateCallback};
pub use css::{LinkNode, StyleDom, register_initial_stylesheets};
pub use message::{ClientMessage, UpdateMessage};
pub use server::{ClientSink, UpdateHub};
