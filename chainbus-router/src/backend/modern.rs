use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::backend::check_event_content;
use crate::error::{Result, RouterError};
use crate::node::ModernNode;
use crate::pool::{SendHandle, SendPool};
use crate::types::{
    BlockListener, BlockRecord, ContractContext, Event, GroupAggregate, ListPage, NodeRecord,
    PartitionId, TopicRecord, TransactionRecord,
};

/// Backend handle for one partition of a modern (2.x) deployment.
///
/// Owns the partition's node connection, a partition-local topic-metadata
/// cache, and a dedicated watcher task that polls the partition's chain tip
/// and invokes the shared block listener when it advances.
pub(crate) struct ModernBackend {
    partition: PartitionId,
    node: Arc<dyn ModernNode>,
    pool: Arc<SendPool>,
    topic_cache: DashMap<String, TopicRecord>,
    listener_tx: watch::Sender<Option<BlockListener>>,
}

impl ModernBackend {
    /// Connects the handle to its partition and starts the block watcher.
    /// The watcher idles until a listener is registered.
    pub(crate) fn new(
        partition: PartitionId,
        node: Arc<dyn ModernNode>,
        pool: Arc<SendPool>,
        watch_interval: Duration,
    ) -> Self {
        let (listener_tx, listener_rx) = watch::channel(None);
        let backend = Self {
            partition,
            node,
            pool,
            topic_cache: DashMap::new(),
            listener_tx,
        };
        backend.spawn_watcher(listener_rx, watch_interval);
        backend
    }

    /// Stores the shared callback consulted by this partition's watcher task.
    /// A later registration replaces the earlier one.
    pub(crate) fn set_block_listener(&self, listener: BlockListener) {
        self.listener_tx.send_replace(Some(listener));
    }

    fn spawn_watcher(
        &self,
        mut listener_rx: watch::Receiver<Option<BlockListener>>,
        interval: Duration,
    ) {
        let node = self.node.clone();
        let partition = self.partition;

        tokio::spawn(async move {
            // Height observed on the previous tick. Reset whenever no listener
            // is registered so a fresh registration baselines before firing.
            let mut last_seen: Option<u64> = None;
            loop {
                tokio::time::sleep(interval).await;

                if listener_rx.has_changed().is_err() {
                    tracing::debug!(partition, "backend dropped, block watcher exiting");
                    return;
                }
                let Some(listener) = listener_rx.borrow_and_update().clone() else {
                    last_seen = None;
                    continue;
                };

                match node.block_height().await {
                    Ok(height) => {
                        if let Some(previous) = last_seen {
                            if height > previous {
                                tracing::debug!(partition, height, "new block mined");
                                listener(partition, height);
                            }
                        }
                        last_seen = Some(height);
                    }
                    Err(error) => {
                        tracing::warn!(partition, %error, "block watcher failed to read chain height");
                    }
                }
            }
        });
    }

    pub(crate) async fn create_topic(&self, name: &str) -> Result<bool> {
        self.node.create_topic(name).await.map_err(RouterError::Backend)
    }

    pub(crate) async fn topic_exists(&self, name: &str) -> Result<bool> {
        self.node.topic_exists(name).await.map_err(RouterError::Backend)
    }

    pub(crate) async fn list_topics(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> Result<ListPage<String>> {
        self.node
            .list_topics(page_index, page_size)
            .await
            .map_err(RouterError::Backend)
    }

    /// Serves topic metadata from the partition-local cache unless the caller
    /// forces a bypass; a fetch always refreshes the cached entry.
    pub(crate) async fn topic_info(&self, name: &str, skip_cache: bool) -> Result<TopicRecord> {
        if !skip_cache {
            if let Some(cached) = self.topic_cache.get(name) {
                return Ok(cached.clone());
            }
        }
        let record = self
            .node
            .topic_info(name)
            .await
            .map_err(RouterError::Backend)?;
        self.topic_cache.insert(name.to_owned(), record.clone());
        Ok(record)
    }

    pub(crate) async fn event(&self, event_id: &str) -> Result<Event> {
        self.node.event(event_id).await.map_err(RouterError::Backend)
    }

    pub(crate) fn publish_event(
        &self,
        topic: &str,
        content: Vec<u8>,
        extensions: HashMap<String, String>,
    ) -> Result<SendHandle> {
        check_event_content(&content)?;
        let node = self.node.clone();
        let topic = topic.to_owned();
        Ok(self.pool.submit(async move {
            node.publish(&topic, content, extensions)
                .await
                .map_err(RouterError::Backend)
        }))
    }

    pub(crate) fn send_raw_transaction(&self, topic: &str, tx_hex: &str) -> SendHandle {
        let node = self.node.clone();
        let topic = topic.to_owned();
        let tx_hex = tx_hex.to_owned();
        self.pool.submit(async move {
            node.send_raw_transaction(&topic, &tx_hex)
                .await
                .map_err(RouterError::Backend)
        })
    }

    pub(crate) async fn block_height(&self) -> Result<u64> {
        self.node.block_height().await.map_err(RouterError::Backend)
    }

    pub(crate) async fn poll_events(&self, block_num: u64) -> Result<Vec<Event>> {
        self.node
            .block_events(block_num)
            .await
            .map_err(RouterError::Backend)
    }

    pub(crate) async fn list_partitions(&self) -> Result<Vec<PartitionId>> {
        self.node.list_partitions().await.map_err(RouterError::Backend)
    }

    pub(crate) async fn group_aggregate(&self) -> Result<GroupAggregate> {
        self.node.group_aggregate().await.map_err(RouterError::Backend)
    }

    pub(crate) async fn query_transactions(
        &self,
        tx_hash: Option<String>,
        block_number: Option<u64>,
        page_index: u32,
        page_size: u32,
    ) -> Result<ListPage<TransactionRecord>> {
        self.node
            .query_transactions(tx_hash, block_number, page_index, page_size)
            .await
            .map_err(RouterError::Backend)
    }

    pub(crate) async fn query_blocks(
        &self,
        block_hash: Option<String>,
        block_number: Option<u64>,
        page_index: u32,
        page_size: u32,
    ) -> Result<ListPage<BlockRecord>> {
        self.node
            .query_blocks(block_hash, block_number, page_index, page_size)
            .await
            .map_err(RouterError::Backend)
    }

    pub(crate) async fn query_nodes(&self) -> Result<ListPage<NodeRecord>> {
        self.node.query_nodes().await.map_err(RouterError::Backend)
    }

    pub(crate) async fn contract_context(&self) -> Result<ContractContext> {
        self.node.contract_context().await.map_err(RouterError::Backend)
    }

    pub(crate) async fn add_operator(&self, topic: &str, address: &str) -> Result<bool> {
        self.node
            .add_operator(topic, address)
            .await
            .map_err(RouterError::Backend)
    }

    pub(crate) async fn remove_operator(&self, topic: &str, address: &str) -> Result<bool> {
        self.node
            .remove_operator(topic, address)
            .await
            .map_err(RouterError::Backend)
    }

    pub(crate) async fn list_operators(&self, topic: &str) -> Result<Vec<String>> {
        self.node
            .list_operators(topic)
            .await
            .map_err(RouterError::Backend)
    }
}
