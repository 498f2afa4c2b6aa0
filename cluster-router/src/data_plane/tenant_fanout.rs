//! Tenant-wide operations issued to every distinct Foghorn edge serving a tenant.

use crate::context::RequestContext;
use crate::control_plane::route_cache::RouteCache;
use crate::data_plane::foghorn_pool::FoghornPool;
use crate::error::RoutingError;
use crate::observability::{events, fields, fields::FanoutContext};
use crate::routing::fanout_targets::{build_fanout_targets, FanoutTarget};
use crate::transport::foghorn::{FoghornClient, StreamsTerminated};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tonic::Status;
use tracing::{debug, info, warn};

const COMPONENT: &str = "tenant_fanout";

/// Aggregate of a fully successful stream termination.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TerminateTenantStreamsSummary {
    pub streams_terminated: u32,
    pub sessions_terminated: u32,
    /// Stream names in target order: primary, official, then peers.
    pub stream_names: Vec<String>,
    pub clusters_contacted: usize,
}

/// Aggregate of a cache invalidation; failed targets are counted, not fatal.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InvalidateTenantCacheSummary {
    pub entries_invalidated: u32,
    pub clusters_contacted: usize,
    pub clusters_failed: usize,
}

/// Coordinates one tenant-wide operation over the route cache and the pool.
///
/// Termination is fail-closed: one failed target fails the whole call. Cache
/// invalidation reports partial success as-is and only fails when no target
/// succeeded.
pub(crate) struct TenantFanout<'a> {
    route_cache: &'a RouteCache,
    pool: &'a FoghornPool,
}

impl<'a> TenantFanout<'a> {
    pub(crate) fn new(route_cache: &'a RouteCache, pool: &'a FoghornPool) -> Self {
        Self { route_cache, pool }
    }

    /// Stops every stream and session of `tenant_id` on all of its edges.
    pub(crate) async fn terminate_tenant_streams(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<TerminateTenantStreamsSummary, RoutingError> {
        let fanout = FanoutContext::new(fields::OPERATION_TERMINATE_TENANT_STREAMS);
        let targets = self.resolve_targets(ctx, &fanout, tenant_id, reason).await?;

        let results = self
            .dispatch(ctx, &fanout, tenant_id, &targets, move |client| async move {
                client.terminate_tenant_streams(ctx, tenant_id, reason).await
            })
            .await;

        let total = results.len();
        let mut summary = TerminateTenantStreamsSummary {
            clusters_contacted: total,
            ..Default::default()
        };
        let mut failed = 0;
        let mut last_error = None;

        for result in results {
            match result {
                Ok(StreamsTerminated {
                    streams_terminated,
                    sessions_terminated,
                    stream_names,
                }) => {
                    summary.streams_terminated =
                        summary.streams_terminated.saturating_add(streams_terminated);
                    summary.sessions_terminated =
                        summary.sessions_terminated.saturating_add(sessions_terminated);
                    summary.stream_names.extend(stream_names);
                }
                Err(status) => {
                    failed += 1;
                    last_error = Some(status);
                }
            }
        }

        if let Some(last_error) = last_error {
            // Partial counts stay in the log; the caller only sees the failure.
            warn!(
                event = events::FANOUT_PARTIAL_FAILURE,
                component = COMPONENT,
                fanout_id = fanout.fanout_id.as_str(),
                operation = fanout.operation,
                tenant_id,
                clusters_total = total,
                clusters_failed = failed,
                streams_terminated = summary.streams_terminated,
                sessions_terminated = summary.sessions_terminated,
                err = last_error.message(),
                "stream termination incomplete"
            );
            return Err(RoutingError::TerminationIncomplete {
                tenant_id: tenant_id.to_string(),
                failed,
                total,
                last_error,
            });
        }

        info!(
            event = events::FANOUT_COMPLETE,
            component = COMPONENT,
            fanout_id = fanout.fanout_id.as_str(),
            operation = fanout.operation,
            tenant_id,
            clusters_total = total,
            streams_terminated = summary.streams_terminated,
            sessions_terminated = summary.sessions_terminated,
            "terminated tenant streams on all clusters"
        );

        Ok(summary)
    }

    /// Drops cached tenant state on all of the tenant's edges.
    pub(crate) async fn invalidate_tenant_cache(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<InvalidateTenantCacheSummary, RoutingError> {
        let fanout = FanoutContext::new(fields::OPERATION_INVALIDATE_TENANT_CACHE);
        let targets = self.resolve_targets(ctx, &fanout, tenant_id, reason).await?;

        let results = self
            .dispatch(ctx, &fanout, tenant_id, &targets, move |client| async move {
                client.invalidate_tenant_cache(ctx, tenant_id, reason).await
            })
            .await;

        let total = results.len();
        let mut summary = InvalidateTenantCacheSummary {
            clusters_contacted: total,
            ..Default::default()
        };
        let mut last_error = None;

        for result in results {
            match result {
                Ok(entries) => {
                    summary.entries_invalidated = summary.entries_invalidated.saturating_add(entries);
                }
                Err(status) => {
                    summary.clusters_failed += 1;
                    last_error = Some(status);
                }
            }
        }

        if let Some(last_error) = last_error {
            if summary.clusters_failed == total {
                warn!(
                    event = events::FANOUT_FAILED,
                    component = COMPONENT,
                    fanout_id = fanout.fanout_id.as_str(),
                    operation = fanout.operation,
                    tenant_id,
                    clusters_total = total,
                    err = last_error.message(),
                    "cache invalidation failed on every cluster"
                );
                return Err(RoutingError::InvalidationFailed {
                    tenant_id: tenant_id.to_string(),
                    total,
                    last_error,
                });
            }

            warn!(
                event = events::FANOUT_PARTIAL_FAILURE,
                component = COMPONENT,
                fanout_id = fanout.fanout_id.as_str(),
                operation = fanout.operation,
                tenant_id,
                clusters_total = total,
                clusters_failed = summary.clusters_failed,
                entries_invalidated = summary.entries_invalidated,
                err = last_error.message(),
                "cache invalidation partially applied"
            );
            return Ok(summary);
        }

        info!(
            event = events::FANOUT_COMPLETE,
            component = COMPONENT,
            fanout_id = fanout.fanout_id.as_str(),
            operation = fanout.operation,
            tenant_id,
            clusters_total = total,
            entries_invalidated = summary.entries_invalidated,
            "invalidated tenant cache on all clusters"
        );

        Ok(summary)
    }

    async fn resolve_targets(
        &self,
        ctx: &RequestContext,
        fanout: &FanoutContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<Vec<FanoutTarget>, RoutingError> {
        let route = self
            .route_cache
            .resolve_cluster_route_for_tenant(ctx, tenant_id)
            .await
            .map_err(|err| {
                warn!(
                    event = events::FANOUT_FAILED,
                    component = COMPONENT,
                    fanout_id = fanout.fanout_id.as_str(),
                    operation = fanout.operation,
                    tenant_id,
                    err = %err,
                    "could not resolve tenant route"
                );
                err
            })?;

        let targets = build_fanout_targets(&route);
        if targets.is_empty() {
            warn!(
                event = events::FANOUT_FAILED,
                component = COMPONENT,
                fanout_id = fanout.fanout_id.as_str(),
                operation = fanout.operation,
                tenant_id,
                cluster_id = fields::value_or_none(&route.cluster_id),
                peers = fields::format_peers(&route.cluster_peers).as_str(),
                "tenant route has no reachable foghorn"
            );
            return Err(RoutingError::NoFanoutTargets {
                tenant_id: tenant_id.to_string(),
            });
        }

        info!(
            event = events::FANOUT_START,
            component = COMPONENT,
            fanout_id = fanout.fanout_id.as_str(),
            operation = fanout.operation,
            tenant_id,
            reason,
            clusters_total = targets.len(),
            "starting tenant fanout"
        );

        Ok(targets)
    }

    /// Issues `call` once per target concurrently. Results keep target order.
    ///
    /// A target whose client cannot be obtained, whose call fails, or that is cut
    /// off by the request deadline or cancellation reports an error.
    async fn dispatch<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        fanout: &FanoutContext,
        tenant_id: &str,
        targets: &[FanoutTarget],
        call: F,
    ) -> Vec<Result<T, Status>>
    where
        F: Fn(Arc<dyn FoghornClient>) -> Fut,
        Fut: Future<Output = Result<T, Status>>,
    {
        let call = &call;
        let calls = targets.iter().map(|target| async move {
            let result = match self.pool.get_or_dial(target.pool_key(), &target.addr).await {
                Ok(client) => ctx.run(call(client)).await,
                Err(status) => Err(status),
            };

            match &result {
                Ok(_) => debug!(
                    event = events::FANOUT_TARGET_OK,
                    component = COMPONENT,
                    fanout_id = fanout.fanout_id.as_str(),
                    operation = fanout.operation,
                    tenant_id,
                    cluster_id = fields::value_or_none(&target.cluster_id),
                    addr = target.addr.as_str(),
                    "fanout target succeeded"
                ),
                Err(status) => warn!(
                    event = events::FANOUT_TARGET_FAILED,
                    component = COMPONENT,
                    fanout_id = fanout.fanout_id.as_str(),
                    operation = fanout.operation,
                    tenant_id,
                    cluster_id = fields::value_or_none(&target.cluster_id),
                    addr = target.addr.as_str(),
                    code = ?status.code(),
                    err = status.message(),
                    "fanout target failed"
                ),
            }

            result
        });

        join_all(calls).await
    }
}
