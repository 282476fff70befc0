use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a logical ledger partition.
///
/// Under the legacy protocol exactly one implicit partition exists; under the
/// modern protocol every discovered partition is addressed by its id.
pub type PartitionId = u64;

/// The partition guaranteed to exist on any ledger network. The legacy
/// protocol's single implicit partition carries this id as well.
pub const DEFAULT_PARTITION: PartitionId = 1;

/// Callback invoked when a partition's chain tip advances.
///
/// The router fans a single listener out to every modern backend; each backend
/// watches its own partition independently, so the callback must be safe to
/// invoke concurrently from as many tasks as there are partitions.
pub type BlockListener = Arc<dyn Fn(PartitionId, u64) + Send + Sync>;

/// An event committed to the ledger, identified by an opaque id minted by the
/// node client. Belongs to exactly one (partition, topic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub topic: String,
    pub content: Vec<u8>,
    #[serde(default)]
    pub extensions: HashMap<String, String>,
}

/// Terminal state of an asynchronous publish or raw-transaction submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SendStatus {
    Success,
    Timeout,
    Error,
}

/// Outcome of an asynchronous send, delivered through a [`crate::SendHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub status: SendStatus,
    pub topic: String,
    pub event_id: String,
}

/// Metadata of a topic as recorded on the ledger. Queried, never cached by the
/// router itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub name: String,
    pub creator: String,
    pub created_block: u64,
    pub created_timestamp: u64,
    pub sequence_number: u64,
}

/// One page of a paginated listing. Page semantics are owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub total: u64,
    pub page_index: u32,
    pub page_size: u32,
    pub data: Vec<T>,
}

/// Aggregate statistics for one partition. Modern protocol only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub node_count: u64,
    pub transaction_count: u64,
    pub latest_block: u64,
}

/// A transaction summary row returned by chain queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_hash: String,
    pub block_number: u64,
    pub from: String,
    pub to: String,
    pub timestamp: u64,
}

/// A block summary row returned by chain queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub block_number: u64,
    pub block_hash: String,
    pub timestamp: u64,
    pub transaction_count: u64,
    pub sealer_index: u64,
}

/// A consensus node row returned by chain queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: String,
    pub block_number: u64,
    pub consensus_view: u64,
    pub active: bool,
}

/// Contract execution context for one partition, used by callers that assemble
/// raw transactions offline. Modern protocol only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractContext {
    pub chain_id: u64,
    pub block_number: u64,
    pub block_limit: u64,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub topic_address: String,
}
