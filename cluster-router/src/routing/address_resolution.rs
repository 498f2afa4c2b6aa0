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

//! Address precedence, legacy route normalization and pool keying.

use crate::control_plane::cluster_route::ClusterRoute;

/// Identity of a pooled Foghorn connection: the cluster id when known, else the
/// raw address.
#[inline(always)]
pub fn foghorn_pool_key<'a>(cluster_id: &'a str, address: &'a str) -> &'a str {
    if cluster_id.is_empty() {
        address
    } else {
        cluster_id
    }
}

/// Looks up the Foghorn address for `target_cluster_id` within a cached route.
///
/// Precedence: primary (when its address is set), official cluster, then peers in
/// listing order. A primary without an address resolves through the peer entry
/// that lists the primary itself. Returns an empty string when nothing matches.
pub fn resolve_addr_from_route(route: &ClusterRoute, target_cluster_id: &str) -> String {
    if target_cluster_id.is_empty() {
        return String::new();
    }

    if route.cluster_id == target_cluster_id && !route.foghorn_addr.is_empty() {
        return route.foghorn_addr.clone();
    }

    if route.official_cluster_id == target_cluster_id
        && !route.official_foghorn_grpc_addr.is_empty()
    {
        return route.official_foghorn_grpc_addr.clone();
    }

    // Also covers the self-referencing primary entry of legacy topologies.
    route
        .cluster_peers
        .iter()
        .find(|peer| peer.cluster_id == target_cluster_id && !peer.foghorn_grpc_addr.is_empty())
        .map(|peer| peer.foghorn_grpc_addr.clone())
        .unwrap_or_default()
}

/// Backfills primary fields that older Quartermaster releases leave empty.
///
/// Only empty fields are written. The primary id comes from the first peer that
/// carries one; the primary address comes from the entry resolving the primary
/// id, falling back to the first peer that does not belong to another cluster.
/// Returns `true` when anything changed.
pub fn normalize_cluster_route(route: &mut ClusterRoute) -> bool {
    if route.cluster_peers.is_empty()
        || (!route.cluster_id.is_empty() && !route.foghorn_addr.is_empty())
    {
        return false;
    }

    let mut changed = false;

    if route.cluster_id.is_empty() {
        if let Some(peer) = route
            .cluster_peers
            .iter()
            .find(|peer| !peer.cluster_id.is_empty())
        {
            route.cluster_id = peer.cluster_id.clone();
            changed = true;
        }
    }

    if route.foghorn_addr.is_empty() {
        let mut addr = resolve_addr_from_route(route, &route.cluster_id);
        if addr.is_empty() {
            if let Some(peer) = route.cluster_peers.iter().find(|peer| {
                !peer.foghorn_grpc_addr.is_empty()
                    && (route.cluster_id.is_empty()
                        || peer.cluster_id.is_empty()
                        || peer.cluster_id == route.cluster_id)
            }) {
                addr = peer.foghorn_grpc_addr.clone();
            }
        }
        if !addr.is_empty() {
            route.foghorn_addr = addr;
            changed = true;
        }
    }

    changed
}
