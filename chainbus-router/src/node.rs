//! # Ledger RPC Boundary
//!
//! The traits in this module describe what the router needs from the
//! version-specific ledger RPC clients. The concrete clients (and their
//! transports, timeouts, and caches) live outside this crate; anything that
//! speaks the right protocol can plug in, including deterministic test
//! doubles.
//!
//! Errors cross this boundary as [`anyhow::Error`] and are passed through to
//! callers as [`crate::RouterError::Backend`] without reinterpretation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RouterConfig;
use crate::types::{
    BlockRecord, ContractContext, Event, GroupAggregate, ListPage, NodeRecord, PartitionId,
    SendResult, TopicRecord, TransactionRecord,
};

/// Client for a legacy (1.x) ledger node.
///
/// The legacy protocol exposes a single implicit partition and the basic
/// topic/event capability set; everything beyond it is rejected by the router
/// before this trait is ever consulted.
#[async_trait]
pub trait LegacyNode: Send + Sync {
    /// Idempotent create. Returns whether the topic now exists.
    async fn create_topic(&self, name: &str) -> anyhow::Result<bool>;
    async fn topic_exists(&self, name: &str) -> anyhow::Result<bool>;
    async fn list_topics(&self, page_index: u32, page_size: u32)
        -> anyhow::Result<ListPage<String>>;
    async fn topic_info(&self, name: &str) -> anyhow::Result<TopicRecord>;
    /// Fetches one event by id, or fails if it is unknown to this node.
    async fn event(&self, event_id: &str) -> anyhow::Result<Event>;
    /// Submits an event. Invoked from a pool worker, never inline.
    async fn publish(
        &self,
        topic: &str,
        content: Vec<u8>,
        extensions: HashMap<String, String>,
    ) -> anyhow::Result<SendResult>;
    async fn block_height(&self) -> anyhow::Result<u64>;
    /// Scans the given block (and, at the node's discretion, the range up to
    /// the current height) for committed events, in scan order.
    async fn block_events(&self, block_num: u64) -> anyhow::Result<Vec<Event>>;
}

/// Client for one partition of a modern (2.x) ledger network.
///
/// One instance is connected per discovered partition; each owns its
/// partition's connection and sees only that partition's state.
#[async_trait]
pub trait ModernNode: Send + Sync {
    /// Idempotent create. Returns whether the topic now exists.
    async fn create_topic(&self, name: &str) -> anyhow::Result<bool>;
    async fn topic_exists(&self, name: &str) -> anyhow::Result<bool>;
    async fn list_topics(&self, page_index: u32, page_size: u32)
        -> anyhow::Result<ListPage<String>>;
    async fn topic_info(&self, name: &str) -> anyhow::Result<TopicRecord>;
    async fn event(&self, event_id: &str) -> anyhow::Result<Event>;
    async fn publish(
        &self,
        topic: &str,
        content: Vec<u8>,
        extensions: HashMap<String, String>,
    ) -> anyhow::Result<SendResult>;
    async fn block_height(&self) -> anyhow::Result<u64>;
    async fn block_events(&self, block_num: u64) -> anyhow::Result<Vec<Event>>;

    /// Lists every partition id known to the network this node belongs to.
    /// Only consulted on the default partition's client, exactly once.
    async fn list_partitions(&self) -> anyhow::Result<Vec<PartitionId>>;
    /// Submits a caller-assembled transaction. The hex is validated by the
    /// router before this is called.
    async fn send_raw_transaction(&self, topic: &str, tx_hex: &str)
        -> anyhow::Result<SendResult>;
    async fn group_aggregate(&self) -> anyhow::Result<GroupAggregate>;
    async fn query_transactions(
        &self,
        tx_hash: Option<String>,
        block_number: Option<u64>,
        page_index: u32,
        page_size: u32,
    ) -> anyhow::Result<ListPage<TransactionRecord>>;
    async fn query_blocks(
        &self,
        block_hash: Option<String>,
        block_number: Option<u64>,
        page_index: u32,
        page_size: u32,
    ) -> anyhow::Result<ListPage<BlockRecord>>;
    async fn query_nodes(&self) -> anyhow::Result<ListPage<NodeRecord>>;
    async fn contract_context(&self) -> anyhow::Result<ContractContext>;
    async fn add_operator(&self, topic: &str, address: &str) -> anyhow::Result<bool>;
    async fn remove_operator(&self, topic: &str, address: &str) -> anyhow::Result<bool>;
    async fn list_operators(&self, topic: &str) -> anyhow::Result<Vec<String>>;
}

/// Factory for version-specific node clients.
///
/// Injected into [`crate::BackendRouter::initialize`] so the connection layer
/// can be swapped out in tests. A connection failure for any required
/// partition aborts initialization.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    async fn connect_legacy(&self, config: &RouterConfig) -> anyhow::Result<Arc<dyn LegacyNode>>;
    async fn connect_modern(
        &self,
        config: &RouterConfig,
        partition: PartitionId,
    ) -> anyhow::Result<Arc<dyn ModernNode>>;
}
