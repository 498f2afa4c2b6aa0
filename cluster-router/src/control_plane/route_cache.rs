/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Time-bounded per-tenant cache of Quartermaster routing data.

use crate::context::RequestContext;
use crate::control_plane::cluster_route::ClusterRoute;
use crate::error::RoutingError;
use crate::observability::{events, fields};
use crate::routing::address_resolution::normalize_cluster_route;
use crate::transport::quartermaster::TopologyClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const COMPONENT: &str = "route_cache";

/// Default freshness window of a cached route.
pub const DEFAULT_ROUTE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Owner of the tenant -> [`ClusterRoute`] map.
///
/// Stale entries are never served: once `ttl` has elapsed the next lookup goes to
/// Quartermaster, and a failure of that lookup is surfaced even though older data
/// exists. Concurrent cold lookups of the same tenant are not coalesced.
pub struct RouteCache {
    ttl: Duration,
    topology: Arc<dyn TopologyClient>,
    routes: RwLock<HashMap<String, Arc<ClusterRoute>>>,
}

impl RouteCache {
    /// Creates an empty cache backed by `topology`.
    pub fn new(ttl: Duration, topology: Arc<dyn TopologyClient>) -> Self {
        Self {
            ttl,
            topology,
            routes: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the fresh cached route, or resolves and caches a new one.
    ///
    /// Never dials Foghorn, so handlers that only need cluster metadata can call it.
    pub async fn resolve_cluster_route_for_tenant(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
    ) -> Result<Arc<ClusterRoute>, RoutingError> {
        if let Some(route) = self.cached_route(tenant_id).await {
            debug!(
                event = events::ROUTE_CACHE_HIT,
                component = COMPONENT,
                tenant_id,
                cluster_id = fields::value_or_none(&route.cluster_id),
                "serving cached cluster route"
            );
            return Ok(route);
        }

        debug!(
            event = events::ROUTE_CACHE_REFRESH_START,
            component = COMPONENT,
            tenant_id,
            "resolving cluster route from topology authority"
        );

        let routing = ctx
            .run(self.topology.get_cluster_routing(ctx, tenant_id))
            .await
            .map_err(|status| {
                warn!(
                    event = events::ROUTE_CACHE_REFRESH_FAILED,
                    component = COMPONENT,
                    tenant_id,
                    code = ?status.code(),
                    err = status.message(),
                    "topology authority lookup failed"
                );
                RoutingError::topology_unavailable(status)
            })?;

        let mut route = ClusterRoute::from_routing(tenant_id, routing, Instant::now());
        if normalize_cluster_route(&mut route) {
            info!(
                event = events::ROUTE_CACHE_NORMALIZED,
                component = COMPONENT,
                tenant_id,
                cluster_id = fields::value_or_none(&route.cluster_id),
                addr = fields::value_or_none(&route.foghorn_addr),
                "backfilled primary cluster from peer listing"
            );
        }

        let route = Arc::new(route);
        self.routes
            .write()
            .await
            .insert(tenant_id.to_string(), route.clone());

        info!(
            event = events::ROUTE_CACHE_REFRESH_OK,
            component = COMPONENT,
            tenant_id,
            cluster_id = fields::value_or_none(&route.cluster_id),
            addr = fields::value_or_none(&route.foghorn_addr),
            official_cluster_id = fields::value_or_none(&route.official_cluster_id),
            peers = fields::format_peers(&route.cluster_peers).as_str(),
            "cached cluster route"
        );

        Ok(route)
    }

    /// Returns the cached route only while it is fresh; never contacts Quartermaster.
    pub async fn cached_route(&self, tenant_id: &str) -> Option<Arc<ClusterRoute>> {
        let routes = self.routes.read().await;
        let route = routes.get(tenant_id)?;
        if route.is_fresh(self.ttl, Instant::now()) {
            return Some(route.clone());
        }

        debug!(
            event = events::ROUTE_CACHE_STALE,
            component = COMPONENT,
            tenant_id,
            "cached cluster route expired"
        );
        None
    }

    /// Drops the tenant's entry. Returns `true` when an entry existed.
    pub async fn evict(&self, tenant_id: &str) -> bool {
        let removed = self.routes.write().await.remove(tenant_id).is_some();
        if removed {
            debug!(
                event = events::ROUTE_CACHE_EVICT,
                component = COMPONENT,
                tenant_id,
                "evicted cluster route"
            );
        }
        removed
    }

    /// Drops every entry that is no longer fresh. Returns how many went.
    pub async fn evict_stale(&self) -> usize {
        let now = Instant::now();
        let mut routes = self.routes.write().await;
        let before = routes.len();
        routes.retain(|_, route| route.is_fresh(self.ttl, now));
        let evicted = before - routes.len();

        if evicted > 0 {
            debug!(
                event = events::ROUTE_CACHE_EVICT_STALE,
                component = COMPONENT,
                evicted,
                cache_size = routes.len(),
                "evicted stale cluster routes"
            );
        }
        evicted
    }

    /// Number of held entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.routes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.routes.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::RouteCache;
    use crate::context::RequestContext;
    use crate::error::{RoutingErrorKind, TOPOLOGY_UNAVAILABLE_MESSAGE};
    use crate::transport::quartermaster::{ClusterPeer, ClusterRouting, TopologyClient};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tonic::Status;

    /// Pops one scripted answer per call; answers `unavailable` once drained.
    struct ScriptedTopology {
        answers: Mutex<VecDeque<Result<ClusterRouting, Status>>>,
        calls: AtomicUsize,
    }

    impl ScriptedTopology {
        fn new(answers: Vec<Result<ClusterRouting, Status>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TopologyClient for ScriptedTopology {
        async fn get_cluster_routing(
            &self,
            _ctx: &RequestContext,
            _tenant_id: &str,
        ) -> Result<ClusterRouting, Status> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Status::unavailable("connection refused")))
        }
    }

    fn routing(cluster_id: &str, addr: &str) -> ClusterRouting {
        ClusterRouting {
            cluster_id: cluster_id.to_string(),
            foghorn_grpc_addr: addr.to_string(),
            cluster_slug: "us-west".to_string(),
            base_url: "frameworks.network".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_entries_are_served_without_topology_calls() {
        let topology = ScriptedTopology::new(vec![Ok(routing("cluster-1", "foghorn:50051"))]);
        let cache = RouteCache::new(Duration::from_secs(300), topology.clone());
        let ctx = RequestContext::background();

        let first = cache
            .resolve_cluster_route_for_tenant(&ctx, "tenant-1")
            .await
            .expect("first lookup resolves");
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = cache
            .resolve_cluster_route_for_tenant(&ctx, "tenant-1")
            .await
            .expect("second lookup is a cache hit");

        assert_eq!(topology.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.cluster_slug, "us-west");
        assert_eq!(second.base_url, "frameworks.network");
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_force_a_fresh_lookup() {
        let topology = ScriptedTopology::new(vec![
            Ok(routing("cluster-1", "old:50051")),
            Ok(routing("cluster-2", "new:50051")),
        ]);
        let cache = RouteCache::new(Duration::from_secs(300), topology.clone());
        let ctx = RequestContext::background();

        cache
            .resolve_cluster_route_for_tenant(&ctx, "tenant-1")
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(300)).await;
        let route = cache
            .resolve_cluster_route_for_tenant(&ctx, "tenant-1")
            .await
            .unwrap();

        assert_eq!(topology.calls(), 2);
        assert_eq!(route.cluster_id, "cluster-2");
        assert_eq!(route.foghorn_addr, "new:50051");
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entry_does_not_mask_topology_failure() {
        let topology = ScriptedTopology::new(vec![Ok(routing("cluster-1", "foghorn:50051"))]);
        let cache = RouteCache::new(Duration::from_secs(300), topology);
        let ctx = RequestContext::background();

        cache
            .resolve_cluster_route_for_tenant(&ctx, "tenant-1")
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(600)).await;
        let err = cache
            .resolve_cluster_route_for_tenant(&ctx, "tenant-1")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), RoutingErrorKind::Unavailable);
        assert_eq!(err.to_string(), TOPOLOGY_UNAVAILABLE_MESSAGE);
        assert!(cache.cached_route("tenant-1").await.is_none());
    }

    #[tokio::test]
    async fn topology_errors_map_to_the_fixed_unavailable_message() {
        let topology = ScriptedTopology::new(vec![Err(Status::internal("db down"))]);
        let cache = RouteCache::new(Duration::from_secs(300), topology);

        let err = cache
            .resolve_cluster_route_for_tenant(&RequestContext::background(), "tenant-1")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), TOPOLOGY_UNAVAILABLE_MESSAGE);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn legacy_routes_are_normalized_before_caching() {
        let topology = ScriptedTopology::new(vec![Ok(ClusterRouting {
            cluster_peers: vec![
                ClusterPeer::new("cluster-a", "a:50051"),
                ClusterPeer::new("cluster-b", "b:50051"),
            ],
            ..Default::default()
        })]);
        let cache = RouteCache::new(Duration::from_secs(300), topology);

        let route = cache
            .resolve_cluster_route_for_tenant(&RequestContext::background(), "tenant-1")
            .await
            .unwrap();

        assert_eq!(route.cluster_id, "cluster-a");
        assert_eq!(route.foghorn_addr, "a:50051");
    }

    #[tokio::test]
    async fn evict_removes_the_entry_once() {
        let topology = ScriptedTopology::new(vec![Ok(routing("cluster-1", "foghorn:50051"))]);
        let cache = RouteCache::new(Duration::from_secs(300), topology);

        cache
            .resolve_cluster_route_for_tenant(&RequestContext::background(), "tenant-1")
            .await
            .unwrap();

        assert!(cache.evict("tenant-1").await);
        assert!(!cache.evict("tenant-1").await);
        assert!(cache.cached_route("tenant-1").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn evict_stale_drops_only_expired_entries() {
        let topology = ScriptedTopology::new(vec![
            Ok(routing("cluster-1", "a:50051")),
            Ok(routing("cluster-2", "b:50051")),
        ]);
        let cache = RouteCache::new(Duration::from_secs(300), topology);
        let ctx = RequestContext::background();

        cache.resolve_cluster_route_for_tenant(&ctx, "tenant-1").await.unwrap();
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.resolve_cluster_route_for_tenant(&ctx, "tenant-2").await.unwrap();
        tokio::time::advance(Duration::from_secs(150)).await;

        assert_eq!(cache.evict_stale().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.cached_route("tenant-2").await.is_some());
        assert_eq!(cache.evict_stale().await, 0);
    }

    #[tokio::test]
    async fn cancelled_request_is_reported_as_unavailable() {
        let topology = ScriptedTopology::new(vec![Ok(routing("cluster-1", "foghorn:50051"))]);
        let cache = RouteCache::new(Duration::from_secs(300), topology.clone());
        let ctx = RequestContext::background();
        ctx.cancel();

        let err = cache
            .resolve_cluster_route_for_tenant(&ctx, "tenant-1")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), RoutingErrorKind::Unavailable);
        assert_eq!(topology.calls(), 0);
    }
}
