//! Keyed pool of lazily connected Foghorn clients.

use crate::observability::{events, fields};
use crate::transport::foghorn::{FoghornClient, FoghornConnector};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tonic::Status;
use tracing::{debug, info, warn};

const COMPONENT: &str = "foghorn_pool";

/// One pooled client and the address it was dialled with.
struct PoolEntry {
    client: Arc<dyn FoghornClient>,
    addr: String,
    last_used: Instant,
}

struct PoolState {
    entries: HashMap<String, PoolEntry>,
    closed: bool,
}

/// Thread-safe map of pool key -> Foghorn client.
///
/// Clients are created through [`FoghornConnector::connect_lazy`], so a dial never
/// waits on the network. Callers holding a client keep it alive after removal,
/// eviction or [`FoghornPool::close`]; their in-flight calls finish or fail on
/// their own. The pool does not retry.
pub struct FoghornPool {
    connector: Arc<dyn FoghornConnector>,
    state: Mutex<PoolState>,
}

impl FoghornPool {
    pub fn new(connector: Arc<dyn FoghornConnector>) -> Self {
        Self {
            connector,
            state: Mutex::new(PoolState {
                entries: HashMap::new(),
                closed: false,
            }),
        }
    }

    /// Returns the client pooled under `pool_key`, dialling `address` when absent.
    ///
    /// A pooled client whose address differs from `address` is replaced, since the
    /// edge for that cluster moved.
    pub async fn get_or_dial(
        &self,
        pool_key: &str,
        address: &str,
    ) -> Result<Arc<dyn FoghornClient>, Status> {
        if address.is_empty() {
            return Err(Status::invalid_argument(format!(
                "no foghorn address for pool key {}",
                fields::value_or_none(pool_key)
            )));
        }

        let mut state = self.state.lock().await;
        if state.closed {
            return Err(Status::unavailable("foghorn pool is closed"));
        }

        if let Some(entry) = state.entries.get_mut(pool_key) {
            if entry.addr == address {
                entry.last_used = Instant::now();
                return Ok(entry.client.clone());
            }
            info!(
                event = events::FOGHORN_POOL_REPLACE,
                component = COMPONENT,
                pool_key,
                old_addr = entry.addr.as_str(),
                addr = address,
                "foghorn address changed, replacing pooled client"
            );
        }

        let client = self.connector.connect_lazy(address).map_err(|status| {
            warn!(
                event = events::FOGHORN_POOL_DIAL_FAILED,
                component = COMPONENT,
                pool_key,
                addr = address,
                err = status.message(),
                "failed to create foghorn client"
            );
            status
        })?;

        state.entries.insert(
            pool_key.to_string(),
            PoolEntry {
                client: client.clone(),
                addr: address.to_string(),
                last_used: Instant::now(),
            },
        );
        debug!(
            event = events::FOGHORN_POOL_CREATE,
            component = COMPONENT,
            pool_key,
            addr = address,
            pool_size = state.entries.len(),
            "pooled new foghorn client"
        );

        Ok(client)
    }

    /// Returns an already pooled client and the address it was dialled with,
    /// without dialling.
    pub async fn get(&self, pool_key: &str) -> Option<(Arc<dyn FoghornClient>, String)> {
        let mut state = self.state.lock().await;
        let entry = state.entries.get_mut(pool_key)?;
        entry.last_used = Instant::now();
        Some((entry.client.clone(), entry.addr.clone()))
    }

    /// Drops the client pooled under `pool_key`. Returns `true` when one existed.
    pub async fn remove(&self, pool_key: &str) -> bool {
        let removed = self.state.lock().await.entries.remove(pool_key);
        match removed {
            Some(entry) => {
                debug!(
                    event = events::FOGHORN_POOL_REMOVE,
                    component = COMPONENT,
                    pool_key,
                    addr = entry.addr.as_str(),
                    "removed pooled foghorn client"
                );
                true
            }
            None => false,
        }
    }

    /// Drops every client unused for at least `max_idle`. Returns how many went.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| now.saturating_duration_since(entry.last_used) < max_idle);
        let evicted = before - state.entries.len();

        if evicted > 0 {
            debug!(
                event = events::FOGHORN_POOL_EVICT_IDLE,
                component = COMPONENT,
                evicted,
                pool_size = state.entries.len(),
                max_idle_secs = max_idle.as_secs(),
                "evicted idle foghorn clients"
            );
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Releases every pooled client and refuses further dials. Idempotent.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.closed {
            return;
        }
        state.closed = true;
        let released = state.entries.len();
        state.entries.clear();

        info!(
            event = events::FOGHORN_POOL_CLOSED,
            component = COMPONENT,
            released,
            "foghorn pool closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::FoghornPool;
    use crate::context::RequestContext;
    use crate::transport::foghorn::{FoghornClient, FoghornConnector, StreamsTerminated};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tonic::{Code, Status};

    struct NoopClient;

    #[async_trait]
    impl FoghornClient for NoopClient {
        async fn terminate_tenant_streams(
            &self,
            _ctx: &RequestContext,
            _tenant_id: &str,
            _reason: &str,
        ) -> Result<StreamsTerminated, Status> {
            Ok(StreamsTerminated::default())
        }

        async fn invalidate_tenant_cache(
            &self,
            _ctx: &RequestContext,
            _tenant_id: &str,
            _reason: &str,
        ) -> Result<u32, Status> {
            Ok(0)
        }
    }

    #[derive(Default)]
    struct CountingConnector {
        dials: AtomicUsize,
    }

    impl FoghornConnector for CountingConnector {
        fn connect_lazy(&self, address: &str) -> Result<Arc<dyn FoghornClient>, Status> {
            if address.starts_with("bad") {
                return Err(Status::invalid_argument("malformed address"));
            }
            self.dials.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NoopClient))
        }
    }

    fn pool() -> (Arc<FoghornPool>, Arc<CountingConnector>) {
        let connector = Arc::new(CountingConnector::default());
        (Arc::new(FoghornPool::new(connector.clone())), connector)
    }

    #[tokio::test]
    async fn same_key_reuses_one_client() {
        let (pool, connector) = pool();

        let a = pool.get_or_dial("cluster-a", "a:50051").await.unwrap();
        let b = pool.get_or_dial("cluster-a", "a:50051").await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(connector.dials.load(Ordering::SeqCst), 1);
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_dials_of_one_key_share_a_client() {
        let (pool, connector) = pool();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.get_or_dial("cluster-a", "a:50051").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(connector.dials.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn changed_address_replaces_the_pooled_client() {
        let (pool, connector) = pool();

        let old = pool.get_or_dial("cluster-a", "a:50051").await.unwrap();
        let new = pool.get_or_dial("cluster-a", "a2:50051").await.unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(connector.dials.load(Ordering::SeqCst), 2);
        assert_eq!(pool.len().await, 1);

        let (pooled, addr) = pool.get("cluster-a").await.unwrap();
        assert!(Arc::ptr_eq(&pooled, &new));
        assert_eq!(addr, "a2:50051");
    }

    #[tokio::test]
    async fn dial_errors_are_not_pooled() {
        let (pool, _) = pool();

        let err = pool.get_or_dial("cluster-a", "bad addr").await.err().unwrap();

        assert_eq!(err.code(), Code::InvalidArgument);
        assert!(pool.is_empty().await);
    }

    #[tokio::test]
    async fn empty_address_is_rejected() {
        let (pool, connector) = pool();

        assert!(pool.get_or_dial("cluster-a", "").await.is_err());
        assert_eq!(connector.dials.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_and_remove_do_not_dial() {
        let (pool, connector) = pool();

        assert!(pool.get("cluster-a").await.is_none());
        pool.get_or_dial("cluster-a", "a:50051").await.unwrap();
        assert!(pool.get("cluster-a").await.is_some());
        assert!(pool.remove("cluster-a").await);
        assert!(!pool.remove("cluster-a").await);
        assert_eq!(connector.dials.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_releases_clients_and_refuses_new_dials() {
        let (pool, _) = pool();
        let held = pool.get_or_dial("cluster-a", "a:50051").await.unwrap();

        pool.close().await;
        pool.close().await;

        assert!(pool.is_closed().await);
        assert!(pool.is_empty().await);
        let err = pool.get_or_dial("cluster-a", "a:50051").await.err().unwrap();
        assert_eq!(err.code(), Code::Unavailable);
        // Clients handed out before close stay usable by their holders.
        assert!(held
            .invalidate_tenant_cache(&RequestContext::background(), "tenant-1", "test")
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn evict_idle_drops_only_unused_clients() {
        let (pool, _) = pool();
        pool.get_or_dial("cluster-a", "a:50051").await.unwrap();
        pool.get_or_dial("cluster-b", "b:50051").await.unwrap();

        tokio::time::advance(Duration::from_secs(500)).await;
        pool.get("cluster-b").await;
        tokio::time::advance(Duration::from_secs(200)).await;

        assert_eq!(pool.evict_idle(Duration::from_secs(600)).await, 1);
        assert!(pool.get("cluster-a").await.is_none());
        assert!(pool.get("cluster-b").await.is_some());
    }
}
