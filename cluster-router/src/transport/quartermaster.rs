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

//! Boundary to the topology authority (Quartermaster).

use crate::context::RequestContext;
use async_trait::async_trait;
use tonic::Status;

/// One cluster, besides the primary, that a tenant may be served from.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ClusterPeer {
    pub cluster_id: String,
    pub foghorn_grpc_addr: String,
}

impl ClusterPeer {
    pub fn new(cluster_id: &str, foghorn_grpc_addr: &str) -> Self {
        Self {
            cluster_id: cluster_id.to_string(),
            foghorn_grpc_addr: foghorn_grpc_addr.to_string(),
        }
    }
}

/// Tenant topology as reported by Quartermaster.
///
/// Older Quartermaster releases leave the primary fields empty and only list the
/// primary inside `cluster_peers`; consumers must not assume they are set.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClusterRouting {
    pub cluster_id: String,
    pub foghorn_grpc_addr: String,
    pub cluster_slug: String,
    pub base_url: String,
    pub cluster_name: String,
    pub official_cluster_id: String,
    pub official_cluster_slug: String,
    pub official_base_url: String,
    pub official_cluster_name: String,
    pub official_foghorn_grpc_addr: String,
    pub cluster_peers: Vec<ClusterPeer>,
}

/// Resolves which cluster(s) serve a tenant.
///
/// Implementations report unreachability and remote failures as `Status`; the
/// route cache maps every failure to the same unavailable condition.
#[async_trait]
pub trait TopologyClient: Send + Sync {
    async fn get_cluster_routing(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
    ) -> Result<ClusterRouting, Status>;
}
