//! Deterministic in-memory ledger doubles shared by the integration tests.
//!
//! Each mock node records how often it was invoked, so tests can verify that
//! rejected calls never reach a backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chainbus_router::config::{LedgerConfig, PoolConfig, RouterConfig, WatcherConfig};
use chainbus_router::node::{LegacyNode, ModernNode, NodeConnector};
use chainbus_router::types::{
    BlockRecord, ContractContext, Event, GroupAggregate, ListPage, NodeRecord, PartitionId,
    SendResult, SendStatus, TopicRecord, TransactionRecord,
};
use chainbus_router::BackendRouter;

/// Per-node invocation counters.
#[derive(Debug, Default)]
pub struct NodeCalls {
    total: AtomicUsize,
    discoveries: AtomicUsize,
}

impl NodeCalls {
    fn hit(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn discoveries(&self) -> usize {
        self.discoveries.load(Ordering::SeqCst)
    }
}

/// One partition's worth of in-memory ledger state.
#[derive(Debug, Default)]
pub struct ChainState {
    pub height: u64,
    pub topics: HashMap<String, TopicRecord>,
    pub events_by_block: HashMap<u64, Vec<Event>>,
    pub events_by_id: HashMap<String, Event>,
    pub operators: HashMap<String, Vec<String>>,
}

impl ChainState {
    fn commit_event(
        &mut self,
        topic: &str,
        content: Vec<u8>,
        extensions: HashMap<String, String>,
    ) -> SendResult {
        self.height += 1;
        let event_id = format!("{topic}-{}", self.height);
        let event = Event {
            event_id: event_id.clone(),
            topic: topic.to_string(),
            content,
            extensions,
        };
        self.events_by_block
            .entry(self.height)
            .or_default()
            .push(event.clone());
        self.events_by_id.insert(event_id.clone(), event);
        SendResult {
            status: SendStatus::Success,
            topic: topic.to_string(),
            event_id,
        }
    }

    fn record_topic(&mut self, name: &str) {
        let height = self.height;
        self.topics
            .entry(name.to_string())
            .or_insert_with(|| TopicRecord {
                name: name.to_string(),
                creator: "0x00a329c0648769a73afac7f9381e08fb43dbea72".to_string(),
                created_block: height,
                created_timestamp: 1_700_000_000,
                sequence_number: 0,
            });
    }
}

pub struct MockModernNode {
    network: Vec<PartitionId>,
    state: Arc<Mutex<ChainState>>,
    calls: Arc<NodeCalls>,
    publish_delay: Duration,
}

#[async_trait]
impl ModernNode for MockModernNode {
    async fn create_topic(&self, name: &str) -> Result<bool> {
        self.calls.hit();
        self.state.lock().unwrap().record_topic(name);
        Ok(true)
    }

    async fn topic_exists(&self, name: &str) -> Result<bool> {
        self.calls.hit();
        Ok(self.state.lock().unwrap().topics.contains_key(name))
    }

    async fn list_topics(&self, page_index: u32, page_size: u32) -> Result<ListPage<String>> {
        self.calls.hit();
        let state = self.state.lock().unwrap();
        let mut names: Vec<String> = state.topics.keys().cloned().collect();
        names.sort();
        Ok(ListPage {
            total: names.len() as u64,
            page_index,
            page_size,
            data: names,
        })
    }

    async fn topic_info(&self, name: &str) -> Result<TopicRecord> {
        self.calls.hit();
        match self.state.lock().unwrap().topics.get(name) {
            Some(record) => Ok(record.clone()),
            None => bail!("topic not found: {name}"),
        }
    }

    async fn event(&self, event_id: &str) -> Result<Event> {
        self.calls.hit();
        match self.state.lock().unwrap().events_by_id.get(event_id) {
            Some(event) => Ok(event.clone()),
            None => bail!("event not found: {event_id}"),
        }
    }

    async fn publish(
        &self,
        topic: &str,
        content: Vec<u8>,
        extensions: HashMap<String, String>,
    ) -> Result<SendResult> {
        self.calls.hit();
        if !self.publish_delay.is_zero() {
            tokio::time::sleep(self.publish_delay).await;
        }
        let mut state = self.state.lock().unwrap();
        if !state.topics.contains_key(topic) {
            bail!("topic not found: {topic}");
        }
        Ok(state.commit_event(topic, content, extensions))
    }

    async fn block_height(&self) -> Result<u64> {
        self.calls.hit();
        Ok(self.state.lock().unwrap().height)
    }

    async fn block_events(&self, block_num: u64) -> Result<Vec<Event>> {
        self.calls.hit();
        Ok(self
            .state
            .lock()
            .unwrap()
            .events_by_block
            .get(&block_num)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_partitions(&self) -> Result<Vec<PartitionId>> {
        self.calls.hit();
        self.calls.discoveries.fetch_add(1, Ordering::SeqCst);
        Ok(self.network.clone())
    }

    async fn send_raw_transaction(&self, topic: &str, tx_hex: &str) -> Result<SendResult> {
        self.calls.hit();
        let mut state = self.state.lock().unwrap();
        Ok(state.commit_event(topic, tx_hex.as_bytes().to_vec(), HashMap::new()))
    }

    async fn group_aggregate(&self) -> Result<GroupAggregate> {
        self.calls.hit();
        let state = self.state.lock().unwrap();
        Ok(GroupAggregate {
            node_count: 3,
            transaction_count: state.events_by_id.len() as u64,
            latest_block: state.height,
        })
    }

    async fn query_transactions(
        &self,
        _tx_hash: Option<String>,
        _block_number: Option<u64>,
        page_index: u32,
        page_size: u32,
    ) -> Result<ListPage<TransactionRecord>> {
        self.calls.hit();
        Ok(ListPage {
            total: 0,
            page_index,
            page_size,
            data: Vec::new(),
        })
    }

    async fn query_blocks(
        &self,
        _block_hash: Option<String>,
        _block_number: Option<u64>,
        page_index: u32,
        page_size: u32,
    ) -> Result<ListPage<BlockRecord>> {
        self.calls.hit();
        Ok(ListPage {
            total: 0,
            page_index,
            page_size,
            data: Vec::new(),
        })
    }

    async fn query_nodes(&self) -> Result<ListPage<NodeRecord>> {
        self.calls.hit();
        Ok(ListPage {
            total: 1,
            page_index: 0,
            page_size: 10,
            data: vec![NodeRecord {
                node_id: "node-0".to_string(),
                block_number: self.state.lock().unwrap().height,
                consensus_view: 0,
                active: true,
            }],
        })
    }

    async fn contract_context(&self) -> Result<ContractContext> {
        self.calls.hit();
        Ok(ContractContext {
            chain_id: 1,
            block_number: self.state.lock().unwrap().height,
            block_limit: 600,
            gas_limit: 100_000_000,
            gas_price: 22_000_000_000,
            topic_address: "0x0000000000000000000000000000000000001001".to_string(),
        })
    }

    async fn add_operator(&self, topic: &str, address: &str) -> Result<bool> {
        self.calls.hit();
        self.state
            .lock()
            .unwrap()
            .operators
            .entry(topic.to_string())
            .or_default()
            .push(address.to_string());
        Ok(true)
    }

    async fn remove_operator(&self, topic: &str, address: &str) -> Result<bool> {
        self.calls.hit();
        if let Some(list) = self.state.lock().unwrap().operators.get_mut(topic) {
            list.retain(|a| a != address);
        }
        Ok(true)
    }

    async fn list_operators(&self, topic: &str) -> Result<Vec<String>> {
        self.calls.hit();
        Ok(self
            .state
            .lock()
            .unwrap()
            .operators
            .get(topic)
            .cloned()
            .unwrap_or_default())
    }
}

pub struct MockLegacyNode {
    state: Arc<Mutex<ChainState>>,
    calls: Arc<NodeCalls>,
}

#[async_trait]
impl LegacyNode for MockLegacyNode {
    async fn create_topic(&self, name: &str) -> Result<bool> {
        self.calls.hit();
        self.state.lock().unwrap().record_topic(name);
        Ok(true)
    }

    async fn topic_exists(&self, name: &str) -> Result<bool> {
        self.calls.hit();
        Ok(self.state.lock().unwrap().topics.contains_key(name))
    }

    async fn list_topics(&self, page_index: u32, page_size: u32) -> Result<ListPage<String>> {
        self.calls.hit();
        let state = self.state.lock().unwrap();
        let mut names: Vec<String> = state.topics.keys().cloned().collect();
        names.sort();
        Ok(ListPage {
            total: names.len() as u64,
            page_index,
            page_size,
            data: names,
        })
    }

    async fn topic_info(&self, name: &str) -> Result<TopicRecord> {
        self.calls.hit();
        match self.state.lock().unwrap().topics.get(name) {
            Some(record) => Ok(record.clone()),
            None => bail!("topic not found: {name}"),
        }
    }

    async fn event(&self, event_id: &str) -> Result<Event> {
        self.calls.hit();
        match self.state.lock().unwrap().events_by_id.get(event_id) {
            Some(event) => Ok(event.clone()),
            None => bail!("event not found: {event_id}"),
        }
    }

    async fn publish(
        &self,
        topic: &str,
        content: Vec<u8>,
        extensions: HashMap<String, String>,
    ) -> Result<SendResult> {
        self.calls.hit();
        let mut state = self.state.lock().unwrap();
        if !state.topics.contains_key(topic) {
            bail!("topic not found: {topic}");
        }
        Ok(state.commit_event(topic, content, extensions))
    }

    async fn block_height(&self) -> Result<u64> {
        self.calls.hit();
        Ok(self.state.lock().unwrap().height)
    }

    async fn block_events(&self, block_num: u64) -> Result<Vec<Event>> {
        self.calls.hit();
        Ok(self
            .state
            .lock()
            .unwrap()
            .events_by_block
            .get(&block_num)
            .cloned()
            .unwrap_or_default())
    }
}

/// Connection factory handing out the mock nodes above, with shared
/// per-partition state so tests can inspect and mutate chain tips.
pub struct MockConnector {
    network: Vec<PartitionId>,
    fail_partition: Option<PartitionId>,
    publish_delay: Duration,
    states: Mutex<HashMap<PartitionId, Arc<Mutex<ChainState>>>>,
    calls: Mutex<HashMap<PartitionId, Arc<NodeCalls>>>,
    legacy_state: Arc<Mutex<ChainState>>,
    legacy_calls: Arc<NodeCalls>,
    connect_order: Mutex<Vec<PartitionId>>,
}

impl MockConnector {
    fn base(network: Vec<PartitionId>) -> Self {
        Self {
            network,
            fail_partition: None,
            publish_delay: Duration::ZERO,
            states: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            legacy_state: Arc::new(Mutex::new(ChainState::default())),
            legacy_calls: Arc::new(NodeCalls::default()),
            connect_order: Mutex::new(Vec::new()),
        }
    }

    pub fn new(network: Vec<PartitionId>) -> Arc<Self> {
        Arc::new(Self::base(network))
    }

    pub fn with_publish_delay(network: Vec<PartitionId>, delay: Duration) -> Arc<Self> {
        let mut connector = Self::base(network);
        connector.publish_delay = delay;
        Arc::new(connector)
    }

    pub fn with_failing_partition(
        network: Vec<PartitionId>,
        partition: PartitionId,
    ) -> Arc<Self> {
        let mut connector = Self::base(network);
        connector.fail_partition = Some(partition);
        Arc::new(connector)
    }

    pub fn state(&self, partition: PartitionId) -> Arc<Mutex<ChainState>> {
        self.states
            .lock()
            .unwrap()
            .entry(partition)
            .or_default()
            .clone()
    }

    pub fn calls(&self, partition: PartitionId) -> Arc<NodeCalls> {
        self.calls
            .lock()
            .unwrap()
            .entry(partition)
            .or_default()
            .clone()
    }

    pub fn legacy_calls(&self) -> Arc<NodeCalls> {
        self.legacy_calls.clone()
    }

    pub fn connect_order(&self) -> Vec<PartitionId> {
        self.connect_order.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeConnector for MockConnector {
    async fn connect_legacy(&self, _config: &RouterConfig) -> Result<Arc<dyn LegacyNode>> {
        Ok(Arc::new(MockLegacyNode {
            state: self.legacy_state.clone(),
            calls: self.legacy_calls.clone(),
        }))
    }

    async fn connect_modern(
        &self,
        _config: &RouterConfig,
        partition: PartitionId,
    ) -> Result<Arc<dyn ModernNode>> {
        if self.fail_partition == Some(partition) {
            bail!("connection refused by partition {partition}");
        }
        self.connect_order.lock().unwrap().push(partition);
        Ok(Arc::new(MockModernNode {
            network: self.network.clone(),
            state: self.state(partition),
            calls: self.calls(partition),
            publish_delay: self.publish_delay,
        }))
    }
}

pub fn modern_config() -> RouterConfig {
    RouterConfig {
        ledger: LedgerConfig {
            version: "2.0".to_string(),
            nodes: "127.0.0.1:8546;127.0.0.1:8547".to_string(),
        },
        pool: PoolConfig {
            core_size: 2,
            max_size: 8,
            keep_alive_secs: 30,
        },
        watcher: WatcherConfig {
            poll_interval_secs: 1,
        },
    }
}

pub fn legacy_config() -> RouterConfig {
    RouterConfig {
        ledger: LedgerConfig {
            version: "1.3".to_string(),
            nodes: "127.0.0.1:8545".to_string(),
        },
        ..modern_config()
    }
}

pub fn init_tracing() {
    let _ = chainbus_logger::init(&chainbus_logger::LogConfig::default());
}

pub async fn modern_router(
    network: Vec<PartitionId>,
) -> (BackendRouter, Arc<MockConnector>) {
    init_tracing();
    let connector = MockConnector::new(network);
    let router = BackendRouter::initialize(modern_config(), connector.clone())
        .await
        .expect("modern router initializes");
    (router, connector)
}

pub async fn legacy_router() -> (BackendRouter, Arc<MockConnector>) {
    init_tracing();
    let connector = MockConnector::new(Vec::new());
    let router = BackendRouter::initialize(legacy_config(), connector.clone())
        .await
        .expect("legacy router initializes");
    (router, connector)
}
