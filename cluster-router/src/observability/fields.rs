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

//! Canonical structured field keys and value-format helpers.

use crate::transport::quartermaster::ClusterPeer;
use uuid::Uuid;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const TENANT_ID: &str = "tenant_id";
pub const CLUSTER_ID: &str = "cluster_id";
pub const TARGET_CLUSTER_ID: &str = "target_cluster_id";
pub const ADDR: &str = "addr";
pub const POOL_KEY: &str = "pool_key";
pub const PEERS: &str = "peers";

pub const FANOUT_ID: &str = "fanout_id";
pub const OPERATION: &str = "operation";
pub const CLUSTERS_TOTAL: &str = "clusters_total";
pub const CLUSTERS_FAILED: &str = "clusters_failed";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const OPERATION_TERMINATE_TENANT_STREAMS: &str = "terminate_tenant_streams";
pub const OPERATION_INVALIDATE_TENANT_CACHE: &str = "invalidate_tenant_cache";

/// Correlation data shared by every event of one fanout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FanoutContext {
    pub fanout_id: String,
    pub operation: &'static str,
}

impl FanoutContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            fanout_id: Uuid::new_v4().hyphenated().to_string(),
            operation,
        }
    }
}

pub fn value_or_none(value: &str) -> &str {
    if value.is_empty() {
        NONE
    } else {
        value
    }
}

/// Compact `cluster=addr` listing of a peer set for log lines.
pub fn format_peers(peers: &[ClusterPeer]) -> String {
    if peers.is_empty() {
        return NONE.to_string();
    }

    peers
        .iter()
        .map(|peer| {
            format!(
                "{}={}",
                value_or_none(&peer.cluster_id),
                value_or_none(&peer.foghorn_grpc_addr)
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}
