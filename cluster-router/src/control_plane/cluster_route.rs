//! Cached tenant -> cluster -> Foghorn mapping.

use crate::transport::quartermaster::{ClusterPeer, ClusterRouting};
use std::time::Duration;
use tokio::time::Instant;

/// Resolved topology of one tenant, as held by the route cache.
///
/// Slug, base URL and name fields are display metadata and never influence routing.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterRoute {
    pub tenant_id: String,
    pub cluster_id: String,
    pub foghorn_addr: String,
    pub cluster_slug: String,
    pub base_url: String,
    pub cluster_name: String,
    pub official_cluster_id: String,
    pub official_cluster_slug: String,
    pub official_base_url: String,
    pub official_cluster_name: String,
    pub official_foghorn_grpc_addr: String,
    pub cluster_peers: Vec<ClusterPeer>,
    pub resolved_at: Instant,
}

impl ClusterRoute {
    /// Builds an unnormalized route stamped with `resolved_at`.
    pub fn from_routing(tenant_id: &str, routing: ClusterRouting, resolved_at: Instant) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            cluster_id: routing.cluster_id,
            foghorn_addr: routing.foghorn_grpc_addr,
            cluster_slug: routing.cluster_slug,
            base_url: routing.base_url,
            cluster_name: routing.cluster_name,
            official_cluster_id: routing.official_cluster_id,
            official_cluster_slug: routing.official_cluster_slug,
            official_base_url: routing.official_base_url,
            official_cluster_name: routing.official_cluster_name,
            official_foghorn_grpc_addr: routing.official_foghorn_grpc_addr,
            cluster_peers: routing.cluster_peers,
            resolved_at,
        }
    }

    /// A route is fresh strictly before `ttl` has elapsed since resolution.
    #[inline(always)]
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.resolved_at) < ttl
    }
}
