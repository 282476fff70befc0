use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::check_event_content;
use crate::error::{Result, RouterError};
use crate::node::LegacyNode;
use crate::pool::{SendHandle, SendPool};
use crate::types::{Event, ListPage, TopicRecord};

/// The single backend handle of a legacy (1.x) deployment, bound to the
/// implicit default partition.
///
/// Only the basic topic/event capability set exists here; the router rejects
/// everything else before reaching this handle.
pub(crate) struct LegacyBackend {
    node: Arc<dyn LegacyNode>,
    pool: Arc<SendPool>,
}

impl LegacyBackend {
    pub(crate) fn new(node: Arc<dyn LegacyNode>, pool: Arc<SendPool>) -> Self {
        Self { node, pool }
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

    // The legacy node keeps no local metadata cache, so the caller's
    // skip-cache preference has nothing to bypass.
    pub(crate) async fn topic_info(&self, name: &str) -> Result<TopicRecord> {
        self.node.topic_info(name).await.map_err(RouterError::Backend)
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

    pub(crate) async fn block_height(&self) -> Result<u64> {
        self.node.block_height().await.map_err(RouterError::Backend)
    }

    pub(crate) async fn poll_events(&self, block_num: u64) -> Result<Vec<Event>> {
        self.node
            .block_events(block_num)
            .await
            .map_err(RouterError::Backend)
    }
}
