//! # Send Pool
//!
//! A bounded worker pool shared by every backend handle for asynchronous
//! ledger submissions (event publishes and raw transactions).
//!
//! Work is accepted immediately and executed on the runtime once a permit is
//! available, so callers never block past dispatch. Each submission returns a
//! [`SendHandle`] that later resolves to the send outcome. Cancellation of an
//! in-flight submission is not supported: a submitted transaction cannot be
//! un-submitted, so abandoning the handle leaves any ledger-side effect final.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{oneshot, Semaphore};

use crate::config::PoolConfig;
use crate::error::{Result, RouterError};
use crate::types::SendResult;

/// A bounded pool servicing all asynchronous send operations across every
/// backend. Constructed once at router initialization and handed to each
/// backend as shared configuration.
#[derive(Debug)]
pub struct SendPool {
    limiter: Arc<Semaphore>,
    dispatched: AtomicU64,
    config: PoolConfig,
}

impl SendPool {
    /// Creates a pool admitting up to `max-size` concurrently executing sends.
    pub fn new(config: PoolConfig) -> Self {
        tracing::debug!(
            core = config.core_size,
            max = config.max_size,
            keep_alive_secs = config.keep_alive_secs,
            "send pool sized"
        );
        Self {
            limiter: Arc::new(Semaphore::new(config.max_size.max(1))),
            dispatched: AtomicU64::new(0),
            config,
        }
    }

    /// Accepts a send for asynchronous execution and returns its handle
    /// without waiting for a worker slot.
    pub fn submit<F>(&self, work: F) -> SendHandle
    where
        F: Future<Output = Result<SendResult>> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let limiter = self.limiter.clone();
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            let _permit = match limiter.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = result_tx.send(Err(RouterError::Backend(anyhow!(
                        "send pool is closed"
                    ))));
                    return;
                }
            };
            let _ = result_tx.send(work.await);
        });

        SendHandle { result_rx }
    }

    /// Number of sends accepted by the pool since construction.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// The sizing this pool was constructed with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

/// Future-like handle for an in-flight send.
///
/// Resolves to the [`SendResult`] reported by the backend, or to
/// [`RouterError::Backend`] if the ledger interaction failed.
#[derive(Debug)]
pub struct SendHandle {
    result_rx: oneshot::Receiver<Result<SendResult>>,
}

impl SendHandle {
    /// Waits for the send to complete and returns its outcome.
    pub async fn resolve(self) -> Result<SendResult> {
        match self.result_rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(RouterError::Backend(anyhow!(
                "send task terminated before reporting a result"
            ))),
        }
    }
}
