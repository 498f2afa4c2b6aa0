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

//! Boundary to per-cluster Foghorn edges.

use crate::context::RequestContext;
use async_trait::async_trait;
use std::sync::Arc;
use tonic::Status;

/// Result of stopping a tenant's traffic on one edge.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StreamsTerminated {
    pub streams_terminated: u32,
    pub sessions_terminated: u32,
    pub stream_names: Vec<String>,
}

/// Tenant-control operations a Foghorn edge exposes to the control plane.
///
/// Clients are shared across concurrent requests; implementations must be safe
/// for concurrent use once created.
#[async_trait]
pub trait FoghornClient: Send + Sync {
    async fn terminate_tenant_streams(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<StreamsTerminated, Status>;

    /// Returns the number of cache entries dropped on the edge.
    async fn invalidate_tenant_cache(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<u32, Status>;
}

/// Creates Foghorn clients that connect on first use.
///
/// `connect_lazy` must not wait for the connection to come up; it only fails for
/// targets that can never be dialled (for example a malformed address).
pub trait FoghornConnector: Send + Sync {
    fn connect_lazy(&self, address: &str) -> Result<Arc<dyn FoghornClient>, Status>;
}
