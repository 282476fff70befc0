//! # Backend Router
//!
//! Detects the ledger protocol version from configuration and proxies every
//! operation to the matching backend handle.
//!
//! Exactly one protocol world is active per process: either a single legacy
//! handle bound to the implicit default partition, or one modern handle per
//! discovered partition. The compatibility gate is evaluated in one place,
//! on the tagged backend union; every operation passes through it before any
//! backend is touched.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{LegacyBackend, ModernBackend};
use crate::config::{RouterConfig, LEGACY_VERSION_PREFIX, MODERN_VERSION_PREFIX};
use crate::error::{Result, RouterError};
use crate::node::NodeConnector;
use crate::pool::{SendHandle, SendPool};
use crate::registry::PartitionRegistry;
use crate::types::{
    BlockListener, BlockRecord, ContractContext, Event, GroupAggregate, ListPage, NodeRecord,
    PartitionId, TopicRecord, TransactionRecord, DEFAULT_PARTITION,
};
use crate::validate;

/// Mutually exclusive storage for the two backend shapes.
enum Backends {
    Legacy(LegacyBackend),
    Modern(HashMap<PartitionId, ModernBackend>),
}

/// The backend chosen by the compatibility gate for one call.
enum Selected<'a> {
    Legacy(&'a LegacyBackend),
    Modern(&'a ModernBackend),
}

/// The uniform operation surface over both protocol versions and all
/// partitions. See the crate docs for the overall picture.
pub struct BackendRouter {
    config: RouterConfig,
    pool: Arc<SendPool>,
    backends: Backends,
    registry: PartitionRegistry,
}

impl BackendRouter {
    /// Builds the router for the configured protocol version.
    ///
    /// Legacy: connects the single implicit-partition handle. Modern:
    /// connects the default partition first, discovers the full partition
    /// list through it, then connects every remaining partition. Any failure
    /// here is fatal; no partially initialized router is returned.
    ///
    /// # Arguments
    ///
    /// * `config` - Network configuration: version, node addresses, pool and
    ///   watcher sizing.
    /// * `connector` - Factory for version-specific node clients.
    pub async fn initialize(
        config: RouterConfig,
        connector: Arc<dyn NodeConnector>,
    ) -> Result<Self> {
        if config.ledger.version.trim().is_empty() {
            return Err(RouterError::Initialization(
                "ledger protocol version is not configured".to_string(),
            ));
        }
        if config.ledger.nodes.trim().is_empty() {
            return Err(RouterError::Initialization(
                "ledger node address list is not configured".to_string(),
            ));
        }

        let pool = Arc::new(SendPool::new(config.pool.clone()));
        let registry = PartitionRegistry::new();
        let watch_interval = Duration::from_secs(config.watcher.poll_interval_secs);

        let backends = if config.ledger.version.starts_with(LEGACY_VERSION_PREFIX) {
            tracing::info!(version = %config.ledger.version, "ledger protocol is legacy (1.x)");

            let node = connector
                .connect_legacy(&config)
                .await
                .map_err(|e| RouterError::Initialization(format!("legacy connection failed: {e}")))?;
            Backends::Legacy(LegacyBackend::new(node, pool.clone()))
        } else if config.ledger.version.starts_with(MODERN_VERSION_PREFIX) {
            tracing::info!(version = %config.ledger.version, "ledger protocol is modern (2.x)");

            // The default partition exists on any modern network; it has to be
            // connected first because partition discovery runs through it.
            let default_node = connector
                .connect_modern(&config, DEFAULT_PARTITION)
                .await
                .map_err(|e| {
                    RouterError::Initialization(format!(
                        "connection to partition {DEFAULT_PARTITION} failed: {e}"
                    ))
                })?;
            let default_backend = ModernBackend::new(
                DEFAULT_PARTITION,
                default_node,
                pool.clone(),
                watch_interval,
            );
            let discovered = default_backend.list_partitions().await.map_err(|e| {
                RouterError::Initialization(format!("partition discovery failed: {e}"))
            })?;

            let mut handles = HashMap::new();
            handles.insert(DEFAULT_PARTITION, default_backend);
            for partition in discovered.iter().copied() {
                if partition == DEFAULT_PARTITION {
                    continue;
                }
                let node = connector
                    .connect_modern(&config, partition)
                    .await
                    .map_err(|e| {
                        RouterError::Initialization(format!(
                            "connection to partition {partition} failed: {e}"
                        ))
                    })?;
                handles.insert(
                    partition,
                    ModernBackend::new(partition, node, pool.clone(), watch_interval),
                );
            }
            tracing::info!(partitions = ?discovered, "all partitions connected");
            registry.prime(discovered);

            Backends::Modern(handles)
        } else {
            return Err(RouterError::Initialization(format!(
                "unsupported ledger protocol version '{}'",
                config.ledger.version
            )));
        };

        Ok(Self {
            config,
            pool,
            backends,
            registry,
        })
    }

    /// The compatibility gate. Resolves the backend for `partition` under the
    /// active protocol version, or rejects the combination.
    fn select(&self, partition: PartitionId) -> Result<Selected<'_>> {
        match &self.backends {
            Backends::Legacy(backend) => {
                if partition != DEFAULT_PARTITION {
                    return Err(RouterError::unsupported(format!(
                        "partition {partition} is not addressable under the legacy protocol"
                    )));
                }
                Ok(Selected::Legacy(backend))
            }
            Backends::Modern(handles) => handles.get(&partition).map(Selected::Modern).ok_or_else(
                || {
                    RouterError::unsupported(format!(
                        "partition {partition} is not addressable by this router"
                    ))
                },
            ),
        }
    }

    /// Like [`Self::select`], for operations the legacy protocol does not
    /// implement at all.
    fn modern(&self, partition: PartitionId) -> Result<&ModernBackend> {
        match self.select(partition)? {
            Selected::Modern(backend) => Ok(backend),
            Selected::Legacy(_) => Err(RouterError::unsupported(
                "operation requires the modern ledger protocol",
            )),
        }
    }

    /// Idempotent topic creation. Returns whether the topic now exists.
    pub async fn create_topic(&self, name: &str, partition: PartitionId) -> Result<bool> {
        match self.select(partition)? {
            Selected::Legacy(b) => b.create_topic(name).await,
            Selected::Modern(b) => b.create_topic(name).await,
        }
    }

    pub async fn topic_exists(&self, name: &str, partition: PartitionId) -> Result<bool> {
        match self.select(partition)? {
            Selected::Legacy(b) => b.topic_exists(name).await,
            Selected::Modern(b) => b.topic_exists(name).await,
        }
    }

    pub async fn list_topics(
        &self,
        page_index: u32,
        page_size: u32,
        partition: PartitionId,
    ) -> Result<ListPage<String>> {
        match self.select(partition)? {
            Selected::Legacy(b) => b.list_topics(page_index, page_size).await,
            Selected::Modern(b) => b.list_topics(page_index, page_size).await,
        }
    }

    /// Fetches topic metadata. `skip_cache` forces a bypass of the modern
    /// backend's partition-local cache; the legacy backend keeps none.
    pub async fn get_topic_info(
        &self,
        name: &str,
        partition: PartitionId,
        skip_cache: bool,
    ) -> Result<TopicRecord> {
        match self.select(partition)? {
            Selected::Legacy(b) => b.topic_info(name).await,
            Selected::Modern(b) => b.topic_info(name, skip_cache).await,
        }
    }

    pub async fn get_event(&self, event_id: &str, partition: PartitionId) -> Result<Event> {
        match self.select(partition)? {
            Selected::Legacy(b) => b.event(event_id).await,
            Selected::Modern(b) => b.event(event_id).await,
        }
    }

    /// Publishes an event asynchronously. The returned handle resolves on a
    /// pool worker once the ledger interaction completes or fails; this call
    /// never blocks past dispatch.
    pub fn publish_event(
        &self,
        topic: &str,
        partition: PartitionId,
        content: Vec<u8>,
        extensions: HashMap<String, String>,
    ) -> Result<SendHandle> {
        match self.select(partition)? {
            Selected::Legacy(b) => b.publish_event(topic, content, extensions),
            Selected::Modern(b) => b.publish_event(topic, content, extensions),
        }
    }

    /// Submits a caller-assembled raw transaction. Modern only. The hex is
    /// validated here, before any pool work is scheduled.
    pub fn send_raw_transaction(
        &self,
        topic: &str,
        partition: PartitionId,
        tx_hex: &str,
    ) -> Result<SendHandle> {
        let backend = self.modern(partition)?;
        validate::transaction_hex(tx_hex)?;
        Ok(backend.send_raw_transaction(topic, tx_hex))
    }

    pub async fn get_block_height(&self, partition: PartitionId) -> Result<u64> {
        match self.select(partition)? {
            Selected::Legacy(b) => b.block_height().await,
            Selected::Modern(b) => b.block_height().await,
        }
    }

    /// Returns the events committed in `block_num` for the partition, in the
    /// backend's scan order.
    ///
    /// A non-positive `block_num` yields an empty sequence without a backend
    /// call, so callers may poll before any block exists.
    pub async fn poll_events(&self, block_num: i64, partition: PartitionId) -> Result<Vec<Event>> {
        let selected = self.select(partition)?;
        if block_num <= 0 {
            return Ok(Vec::new());
        }
        let block_num = block_num as u64;
        match selected {
            Selected::Legacy(b) => b.poll_events(block_num).await,
            Selected::Modern(b) => b.poll_events(block_num).await,
        }
    }

    /// Aggregate statistics for one partition. Modern only.
    pub async fn get_group_aggregate(&self, partition: PartitionId) -> Result<GroupAggregate> {
        self.modern(partition)?.group_aggregate().await
    }

    /// Paginated transaction query. Modern only.
    pub async fn query_transactions(
        &self,
        partition: PartitionId,
        tx_hash: Option<String>,
        block_number: Option<u64>,
        page_index: u32,
        page_size: u32,
    ) -> Result<ListPage<TransactionRecord>> {
        self.modern(partition)?
            .query_transactions(tx_hash, block_number, page_index, page_size)
            .await
    }

    /// Paginated block query. Modern only.
    pub async fn query_blocks(
        &self,
        partition: PartitionId,
        block_hash: Option<String>,
        block_number: Option<u64>,
        page_index: u32,
        page_size: u32,
    ) -> Result<ListPage<BlockRecord>> {
        self.modern(partition)?
            .query_blocks(block_hash, block_number, page_index, page_size)
            .await
    }

    /// Consensus node listing. Modern only.
    pub async fn query_nodes(&self, partition: PartitionId) -> Result<ListPage<NodeRecord>> {
        self.modern(partition)?.query_nodes().await
    }

    /// Contract execution context for offline transaction assembly. Modern
    /// only.
    pub async fn get_contract_context(&self, partition: PartitionId) -> Result<ContractContext> {
        self.modern(partition)?.contract_context().await
    }

    /// Grants `address` operator rights on a topic. Modern only; the address
    /// is validated before dispatch.
    pub async fn add_operator(
        &self,
        partition: PartitionId,
        topic: &str,
        address: &str,
    ) -> Result<bool> {
        let backend = self.modern(partition)?;
        validate::operator_address(address)?;
        backend.add_operator(topic, address).await
    }

    /// Revokes `address`'s operator rights on a topic. Modern only; the
    /// address is validated before dispatch.
    pub async fn remove_operator(
        &self,
        partition: PartitionId,
        topic: &str,
        address: &str,
    ) -> Result<bool> {
        let backend = self.modern(partition)?;
        validate::operator_address(address)?;
        backend.remove_operator(topic, address).await
    }

    /// Lists the operator addresses of a topic. Modern only.
    pub async fn list_operators(
        &self,
        partition: PartitionId,
        topic: &str,
    ) -> Result<Vec<String>> {
        self.modern(partition)?.list_operators(topic).await
    }

    /// Returns the valid partition ids in their discovered order, as strings.
    ///
    /// Discovery runs at most once per process; the cached list is not
    /// refreshed afterward.
    pub async fn list_partitions(&self) -> Result<Vec<String>> {
        let ids = self
            .registry
            .get_or_discover(|| async {
                match &self.backends {
                    Backends::Legacy(_) => Ok(vec![DEFAULT_PARTITION]),
                    Backends::Modern(handles) => {
                        let default = handles.get(&DEFAULT_PARTITION).ok_or_else(|| {
                            RouterError::Initialization(
                                "default partition backend missing".to_string(),
                            )
                        })?;
                        default.list_partitions().await
                    }
                }
            })
            .await?;
        Ok(ids.iter().map(|id| id.to_string()).collect())
    }

    /// Fans a block listener out to every modern backend, each of which
    /// watches its own partition and invokes the shared callback when the
    /// chain tip advances. A no-op under the legacy protocol, which has no
    /// block-mined signal to relay.
    pub fn register_block_listener(&self, listener: BlockListener) {
        match &self.backends {
            Backends::Legacy(_) => {
                tracing::debug!("legacy protocol has no block notifications, listener ignored");
            }
            Backends::Modern(handles) => {
                tracing::info!(
                    partitions = handles.len(),
                    "registering block listener on every partition"
                );
                for backend in handles.values() {
                    backend.set_block_listener(listener.clone());
                }
            }
        }
    }

    /// Whether block-mined notifications are available (modern protocol).
    pub fn supports_block_notify(&self) -> bool {
        matches!(&self.backends, Backends::Modern(handles) if !handles.is_empty())
    }

    /// The configuration this router was initialized with.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// The shared send pool, exposed so collaborating layers can observe
    /// sizing and dispatch counts.
    pub fn pool(&self) -> &SendPool {
        &self.pool
    }
}
