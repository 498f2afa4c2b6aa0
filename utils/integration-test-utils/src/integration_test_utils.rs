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

use cluster_router::{ClusterPeer, ClusterRouting};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once per test binary; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn peer(cluster_id: &str, foghorn_grpc_addr: &str) -> ClusterPeer {
    ClusterPeer::new(cluster_id, foghorn_grpc_addr)
}

/// Routing with a primary cluster and the given peers.
pub fn routing(cluster_id: &str, foghorn_grpc_addr: &str, peers: Vec<ClusterPeer>) -> ClusterRouting {
    ClusterRouting {
        cluster_id: cluster_id.to_string(),
        foghorn_grpc_addr: foghorn_grpc_addr.to_string(),
        cluster_peers: peers,
        ..Default::default()
    }
}
