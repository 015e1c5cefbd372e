//! Chunkline - deferred chunk loading runtime and hot update channel.
//!
//! Three cooperating layers:
//!
//! ```text
//! transform --(chunk names)--> runtime --(chunk ids)--> hot
//! (compile)                    (loader)                 (push channel)
//! ```
//!
//! - [`transform`] rewrites dynamic-import call sites into runtime loader
//!   invocations, computing or honoring an explicit chunk name.
//! - [`runtime`] is the per-page-session chunk loader and module registry:
//!   one fetch per chunk, one evaluation per module, manifest-chunk
//!   indirection for rebuild-stable call sites.
//! - [`hot`] is the subscribe/update protocol between the dev server and a
//!   running session, with the CSS special case and the full-reload
//!   fail-safe.

pub mod chunk;
pub mod error;
pub mod hot;
pub mod logger;
pub mod runtime;
pub mod transform;

pub use chunk::{ChunkGroup, ChunkId, ChunkKind, GroupEntry, ModuleId, ModuleKind};
pub use error::{ChunkLoadError, RuntimeError, UpdateApplicationError};
pub use hot::client::{HotUpdateClient, Reloader, Transport, TransportEvent};
pub use hot::message::{ClientMessage, UpdateMessage};
pub use runtime::{RetryPolicy, Session, SessionConfig};
pub use transform::{TransformError, TransformOptions, transform_expr};
