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

use crate::config::{ConfigError, RouterConfig};
use crate::context::RequestContext;
use crate::control_plane::cluster_route::ClusterRoute;
use crate::control_plane::route_cache::RouteCache;
use crate::data_plane::foghorn_pool::FoghornPool;
use crate::data_plane::tenant_fanout::{
    InvalidateTenantCacheSummary, TenantFanout, TerminateTenantStreamsSummary,
};
use crate::error::RoutingError;
use crate::observability::{events, fields};
use crate::routing::address_resolution::{foghorn_pool_key, resolve_addr_from_route};
use crate::transport::foghorn::{FoghornClient, FoghornConnector};
use crate::transport::grpc::{GrpcFoghornConnector, GrpcQuartermasterClient};
use crate::transport::quartermaster::TopologyClient;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMPONENT: &str = "cluster_router";
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// A pooled Foghorn client plus the cluster and address it was resolved for.
#[derive(Clone)]
pub struct FoghornHandle {
    pub client: Arc<dyn FoghornClient>,
    pub cluster_id: String,
    pub address: String,
}

impl Debug for FoghornHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoghornHandle")
            .field("cluster_id", &self.cluster_id)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Resolves tenants to Foghorn edges and fans tenant-wide operations out to them.
///
/// One instance per process. Every operation takes the inbound request's
/// [`RequestContext`]; its deadline and cancellation bound all outbound calls.
///
/// ```
/// use async_trait::async_trait;
/// use cluster_router::{
///     ClusterPeer, ClusterRouter, ClusterRouting, FoghornClient, FoghornConnector,
///     RequestContext, StreamsTerminated, TopologyClient,
/// };
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tonic::Status;
///
/// struct Topology;
///
/// #[async_trait]
/// impl TopologyClient for Topology {
///     async fn get_cluster_routing(
///         &self,
///         _ctx: &RequestContext,
///         _tenant_id: &str,
///     ) -> Result<ClusterRouting, Status> {
///         Ok(ClusterRouting {
///             cluster_id: "cluster-eu".to_string(),
///             foghorn_grpc_addr: "foghorn-eu:18019".to_string(),
///             cluster_peers: vec![ClusterPeer::new("cluster-us", "foghorn-us:18019")],
///             ..Default::default()
///         })
///     }
/// }
///
/// struct Edge;
///
/// #[async_trait]
/// impl FoghornClient for Edge {
///     async fn terminate_tenant_streams(
///         &self,
///         _ctx: &RequestContext,
///         _tenant_id: &str,
///         _reason: &str,
///     ) -> Result<StreamsTerminated, Status> {
///         Ok(StreamsTerminated {
///             streams_terminated: 1,
///             sessions_terminated: 1,
///             stream_names: vec![],
///         })
///     }
///
///     async fn invalidate_tenant_cache(
///         &self,
///         _ctx: &RequestContext,
///         _tenant_id: &str,
///         _reason: &str,
///     ) -> Result<u32, Status> {
///         Ok(1)
///     }
/// }
///
/// struct Connector;
///
/// impl FoghornConnector for Connector {
///     fn connect_lazy(&self, _address: &str) -> Result<Arc<dyn FoghornClient>, Status> {
///         Ok(Arc::new(Edge))
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread()
/// #     .enable_time()
/// #     .build()
/// #     .unwrap()
/// #     .block_on(async {
/// let router = ClusterRouter::new(Arc::new(Topology), Arc::new(Connector), Duration::from_secs(300));
/// let ctx = RequestContext::with_timeout(Duration::from_secs(5));
///
/// let primary = router.resolve_foghorn_for_tenant(&ctx, "tenant-1").await.unwrap();
/// assert_eq!(primary.address, "foghorn-eu:18019");
///
/// let clip_origin = router
///     .resolve_foghorn_for_artifact(&ctx, "tenant-1", "cluster-us")
///     .await
///     .unwrap();
/// assert_eq!(clip_origin.address, "foghorn-us:18019");
///
/// let summary = router
///     .terminate_tenant_streams(&ctx, "tenant-1", "suspended")
///     .await
///     .unwrap();
/// assert_eq!(summary.clusters_contacted, 2);
/// # });
/// ```
pub struct ClusterRouter {
    route_cache: Arc<RouteCache>,
    pool: Arc<FoghornPool>,
    shutdown: CancellationToken,
}

impl ClusterRouter {
    pub fn new(
        topology: Arc<dyn TopologyClient>,
        connector: Arc<dyn FoghornConnector>,
        route_ttl: Duration,
    ) -> Self {
        Self {
            route_cache: Arc::new(RouteCache::new(route_ttl, topology)),
            pool: Arc::new(FoghornPool::new(connector)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Wires `tonic` adapters from `config` and starts [`ClusterRouter::spawn_maintenance`].
    ///
    /// Fails with [`ConfigError::Invalid`] outside a Tokio runtime, since channels
    /// and the sweeper are spawned onto the current one.
    pub fn from_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        tokio::runtime::Handle::try_current().map_err(|err| {
            ConfigError::Invalid(format!("cluster router needs a Tokio runtime: {err}"))
        })?;

        let topology = GrpcQuartermasterClient::connect_lazy(
            &config.quartermaster.grpc_addr,
            &config.quartermaster_channel_settings(),
        )
        .map_err(|status| {
            ConfigError::Invalid(format!(
                "quartermaster.grpc_addr: {}",
                status.message()
            ))
        })?;
        let connector = GrpcFoghornConnector::new(config.foghorn_channel_settings());

        let router = Self::new(
            Arc::new(topology),
            Arc::new(connector),
            config.route_cache_ttl(),
        );
        router.spawn_maintenance(config.pool_sweep_interval(), config.pool_max_idle());

        info!(
            event = events::ROUTER_STARTED,
            component = COMPONENT,
            quartermaster_addr = config.quartermaster.grpc_addr.as_str(),
            route_ttl_secs = config.route_cache.ttl_secs,
            "cluster router started"
        );

        Ok(router)
    }

    /// Cached route of `tenant_id`, refreshed from Quartermaster when stale.
    pub async fn resolve_cluster_route_for_tenant(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
    ) -> Result<Arc<ClusterRoute>, RoutingError> {
        self.route_cache
            .resolve_cluster_route_for_tenant(ctx, tenant_id)
            .await
    }

    /// Client for the tenant's primary cluster.
    ///
    /// An empty primary address evicts the cached route and triggers one fresh
    /// lookup before failing.
    pub async fn resolve_foghorn_for_tenant(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
    ) -> Result<FoghornHandle, RoutingError> {
        let mut route = self
            .route_cache
            .resolve_cluster_route_for_tenant(ctx, tenant_id)
            .await?;

        if route.foghorn_addr.is_empty() {
            warn!(
                event = events::RESOLVE_EMPTY_PRIMARY_ADDR,
                component = COMPONENT,
                tenant_id,
                cluster_id = fields::value_or_none(&route.cluster_id),
                "primary cluster has no foghorn address, refreshing route"
            );
            self.route_cache.evict(tenant_id).await;
            route = self
                .route_cache
                .resolve_cluster_route_for_tenant(ctx, tenant_id)
                .await?;
        }

        if route.foghorn_addr.is_empty() {
            return Err(RoutingError::NoFoghornForPrimary {
                tenant_id: tenant_id.to_string(),
                cluster_id: route.cluster_id.clone(),
            });
        }

        self.dial(&route.cluster_id, &route.foghorn_addr).await
    }

    /// Client for one specific cluster of the tenant.
    ///
    /// A cluster unknown to the cached route evicts it and triggers one fresh
    /// lookup before failing with NotFound.
    pub async fn resolve_foghorn_for_cluster(
        &self,
        ctx: &RequestContext,
        target_cluster_id: &str,
        tenant_id: &str,
    ) -> Result<FoghornHandle, RoutingError> {
        let mut route = self
            .route_cache
            .resolve_cluster_route_for_tenant(ctx, tenant_id)
            .await?;
        let mut addr = resolve_addr_from_route(&route, target_cluster_id);

        if addr.is_empty() {
            debug!(
                event = events::RESOLVE_CLUSTER_MISS,
                component = COMPONENT,
                tenant_id,
                target_cluster_id = fields::value_or_none(target_cluster_id),
                "cluster not in cached route, refreshing route"
            );
            self.route_cache.evict(tenant_id).await;
            route = self
                .route_cache
                .resolve_cluster_route_for_tenant(ctx, tenant_id)
                .await?;
            addr = resolve_addr_from_route(&route, target_cluster_id);
        }

        if addr.is_empty() {
            warn!(
                event = events::RESOLVE_CLUSTER_NOT_FOUND,
                component = COMPONENT,
                tenant_id,
                target_cluster_id = fields::value_or_none(target_cluster_id),
                peers = fields::format_peers(&route.cluster_peers).as_str(),
                "no foghorn address for cluster"
            );
            return Err(RoutingError::ClusterNotFound {
                tenant_id: tenant_id.to_string(),
                cluster_id: target_cluster_id.to_string(),
                peer_count: route.cluster_peers.len(),
            });
        }

        self.dial(target_cluster_id, &addr).await
    }

    /// Client for the cluster holding an artifact; the primary when no origin is
    /// recorded.
    pub async fn resolve_foghorn_for_artifact(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        origin_cluster_id: &str,
    ) -> Result<FoghornHandle, RoutingError> {
        if origin_cluster_id.is_empty() {
            return self.resolve_foghorn_for_tenant(ctx, tenant_id).await;
        }
        self.resolve_foghorn_for_cluster(ctx, origin_cluster_id, tenant_id)
            .await
    }

    /// Client for a stream's active ingest cluster when it is already pooled,
    /// otherwise the tenant's primary.
    pub async fn resolve_foghorn_for_active_cluster(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        active_cluster_id: &str,
    ) -> Result<FoghornHandle, RoutingError> {
        if !active_cluster_id.is_empty() {
            let pool_key = foghorn_pool_key(active_cluster_id, "");
            if let Some((client, address)) = self.pool.get(pool_key).await {
                debug!(
                    event = events::RESOLVE_ACTIVE_CLUSTER_POOL_HIT,
                    component = COMPONENT,
                    tenant_id,
                    cluster_id = active_cluster_id,
                    addr = fields::value_or_none(&address),
                    "using pooled client of active ingest cluster"
                );
                return Ok(FoghornHandle {
                    client,
                    cluster_id: active_cluster_id.to_string(),
                    address,
                });
            }
        }

        self.resolve_foghorn_for_tenant(ctx, tenant_id).await
    }

    /// Terminates the tenant's streams on every distinct edge. Fails unless all
    /// edges confirmed.
    pub async fn terminate_tenant_streams(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<TerminateTenantStreamsSummary, RoutingError> {
        TenantFanout::new(&self.route_cache, &self.pool)
            .terminate_tenant_streams(ctx, tenant_id, reason)
            .await
    }

    /// Invalidates the tenant's cached state on every distinct edge, accepting
    /// partial success.
    pub async fn invalidate_tenant_cache(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<InvalidateTenantCacheSummary, RoutingError> {
        TenantFanout::new(&self.route_cache, &self.pool)
            .invalidate_tenant_cache(ctx, tenant_id, reason)
            .await
    }

    /// Fresh cached route, without contacting Quartermaster.
    pub async fn cached_route(&self, tenant_id: &str) -> Option<Arc<ClusterRoute>> {
        self.route_cache.cached_route(tenant_id).await
    }

    /// Forgets the tenant's route, e.g. after its cluster assignment changed.
    pub async fn evict_route(&self, tenant_id: &str) -> bool {
        self.route_cache.evict(tenant_id).await
    }

    pub fn pool(&self) -> &Arc<FoghornPool> {
        &self.pool
    }

    /// Every `interval`, drops stale routes and pooled clients idle for `max_idle`.
    ///
    /// Runs until [`ClusterRouter::close`] or until the router is dropped.
    pub fn spawn_maintenance(&self, interval: Duration, max_idle: Duration) -> JoinHandle<()> {
        let route_cache = Arc::downgrade(&self.route_cache);
        let pool = Arc::downgrade(&self.pool);
        let shutdown = self.shutdown.clone();
        let interval = interval.max(MIN_SWEEP_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let (Some(route_cache), Some(pool)) =
                            (route_cache.upgrade(), pool.upgrade())
                        else {
                            break;
                        };
                        route_cache.evict_stale().await;
                        pool.evict_idle(max_idle).await;
                    }
                }
            }
            debug!(
                event = events::ROUTER_MAINTENANCE_STOPPED,
                component = COMPONENT,
                "router maintenance stopped"
            );
        })
    }

    /// Releases pooled connections and stops maintenance. Requests already
    /// holding a client finish or fail on their own; later dials fail with
    /// Unavailable.
    pub async fn close(&self) {
        self.shutdown.cancel();
        self.pool.close().await;
    }

    async fn dial(&self, cluster_id: &str, address: &str) -> Result<FoghornHandle, RoutingError> {
        let pool_key = foghorn_pool_key(cluster_id, address);
        let client = self
            .pool
            .get_or_dial(pool_key, address)
            .await
            .map_err(|source| RoutingError::FoghornConnectionFailed {
                pool_key: pool_key.to_string(),
                source,
            })?;

        Ok(FoghornHandle {
            client,
            cluster_id: cluster_id.to_string(),
            address: address.to_string(),
        })
    }
}
