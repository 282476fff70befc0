//! A version-abstracting connection router for a ledger-backed publish/subscribe system.
//!
//! This crate lets client code issue topic and event operations (create topic,
//! publish event, fetch event, poll for newly committed events, query chain
//! metadata) without knowing which of two incompatible protocol versions of the
//! underlying ledger client is in use, or which logical partition of the ledger
//! the operation targets.
//!
//! # Key Components
//!
//! *   [`router::BackendRouter`]: the single entry point. It owns either one
//!     legacy backend or one modern backend per discovered partition, enforces
//!     version/partition compatibility on every call, and forwards to the
//!     selected backend.
//! *   [`node`]: the async traits ([`node::LegacyNode`], [`node::ModernNode`],
//!     [`node::NodeConnector`]) implemented by the version-specific ledger RPC
//!     clients. Production clients and test doubles plug in here.
//! *   [`pool::SendPool`]: a bounded worker pool shared by all backends for
//!     asynchronous publish and raw-transaction submission.
//! *   [`registry::PartitionRegistry`]: the once-populated cache of valid
//!     partition identifiers.

/// Version-specific backend handles owned by the router.
mod backend;
/// Configuration structures and the TOML + environment loader.
pub mod config;
/// The categorical error surface of the router.
pub mod error;
/// The ledger RPC boundary: node traits and the connection factory.
pub mod node;
/// The bounded worker pool binding for asynchronous sends.
pub mod pool;
/// Once-populated partition discovery cache.
pub mod registry;
/// The connection router itself.
pub mod router;
/// Data model shared across the operation surface.
pub mod types;
/// Fail-fast input validators applied before backend dispatch.
pub mod validate;

pub use config::{load_config, RouterConfig};
pub use error::{Result, RouterError};
pub use pool::SendHandle;
pub use router::BackendRouter;
pub use types::{BlockListener, PartitionId, DEFAULT_PARTITION};
