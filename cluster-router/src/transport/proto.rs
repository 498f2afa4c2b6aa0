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

//! Wire types for the Quartermaster and Foghorn tenant-control RPCs.
//!
//! Generated from `proto/*.proto` by the build script. Both clients and servers are
//! emitted; the servers are only used to stand up in-process fakes.

use super::foghorn::StreamsTerminated;
use super::quartermaster::{ClusterPeer, ClusterRouting};

#[allow(clippy::all)]
pub mod quartermaster {
    tonic::include_proto!("quartermaster");
}

#[allow(clippy::all)]
pub mod foghorn {
    tonic::include_proto!("foghorn");
}

use self::foghorn::TerminateTenantStreamsResponse;
use self::quartermaster::{ClusterRoutingResponse, TenantClusterPeer};

impl From<TenantClusterPeer> for ClusterPeer {
    fn from(peer: TenantClusterPeer) -> Self {
        Self {
            cluster_id: peer.cluster_id,
            foghorn_grpc_addr: peer.foghorn_grpc_addr,
        }
    }
}

impl From<ClusterRoutingResponse> for ClusterRouting {
    fn from(response: ClusterRoutingResponse) -> Self {
        Self {
            cluster_id: response.cluster_id,
            foghorn_grpc_addr: response.foghorn_grpc_addr,
            cluster_slug: response.cluster_slug,
            base_url: response.base_url,
            cluster_name: response.cluster_name,
            official_cluster_id: response.official_cluster_id,
            official_cluster_slug: response.official_cluster_slug,
            official_base_url: response.official_base_url,
            official_cluster_name: response.official_cluster_name,
            official_foghorn_grpc_addr: response.official_foghorn_grpc_addr,
            cluster_peers: response
                .cluster_peers
                .into_iter()
                .map(ClusterPeer::from)
                .collect(),
        }
    }
}

// Negative counts from a misbehaving edge are clamped rather than wrapped.
impl From<TerminateTenantStreamsResponse> for StreamsTerminated {
    fn from(response: TerminateTenantStreamsResponse) -> Self {
        Self {
            streams_terminated: response.streams_terminated.max(0) as u32,
            sessions_terminated: response.sessions_terminated.max(0) as u32,
            stream_names: response.stream_names,
        }
    }
}
