//! Distinct Foghorn targets serving a tenant.

use crate::control_plane::cluster_route::ClusterRoute;
use crate::routing::address_resolution::foghorn_pool_key;
use std::collections::HashSet;

/// One edge a tenant-wide operation must reach.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FanoutTarget {
    pub cluster_id: String,
    pub addr: String,
}

impl FanoutTarget {
    pub fn pool_key(&self) -> &str {
        foghorn_pool_key(&self.cluster_id, &self.addr)
    }
}

/// Primary, official (when distinct) and peers, in that order, with duplicates
/// collapsed.
///
/// An entry is dropped when its pool key or its address was already taken, so a
/// cluster listed twice, or two listings sharing one edge address, yield a single
/// target. Entries without an address are skipped.
pub fn build_fanout_targets(route: &ClusterRoute) -> Vec<FanoutTarget> {
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut seen_addrs: HashSet<String> = HashSet::new();
    let mut targets = Vec::with_capacity(route.cluster_peers.len() + 2);

    let mut add_target = |cluster_id: &str, addr: &str| {
        if addr.is_empty() {
            return;
        }
        let key = foghorn_pool_key(cluster_id, addr);
        if seen_keys.contains(key) || seen_addrs.contains(addr) {
            return;
        }
        seen_keys.insert(key.to_string());
        seen_addrs.insert(addr.to_string());
        targets.push(FanoutTarget {
            cluster_id: cluster_id.to_string(),
            addr: addr.to_string(),
        });
    };

    add_target(route.cluster_id.as_str(), route.foghorn_addr.as_str());
    if route.official_cluster_id != route.cluster_id {
        add_target(
            route.official_cluster_id.as_str(),
            route.official_foghorn_grpc_addr.as_str(),
        );
    }
    for peer in &route.cluster_peers {
        add_target(peer.cluster_id.as_str(), peer.foghorn_grpc_addr.as_str());
    }

    targets
}
