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

use async_trait::async_trait;
use cluster_router::{ClusterRouting, RequestContext, TopologyClient};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tonic::Status;
use tracing::debug;

/// In-memory Quartermaster whose answers can be changed between calls.
///
/// Tenants without a configured routing get `not_found`. A configured outage
/// takes precedence over every routing.
#[derive(Default)]
pub struct ScriptedTopologyClient {
    routings: Mutex<HashMap<String, ClusterRouting>>,
    outage: Mutex<Option<Status>>,
    latency: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    calls_per_tenant: Mutex<HashMap<String, usize>>,
}

impl ScriptedTopologyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_routing(tenant_id: &str, routing: ClusterRouting) -> Self {
        let client = Self::new();
        client.set_routing(tenant_id, routing);
        client
    }

    pub fn set_routing(&self, tenant_id: &str, routing: ClusterRouting) {
        self.routings
            .lock()
            .unwrap()
            .insert(tenant_id.to_string(), routing);
    }

    /// Makes every following call fail with `status` until [`Self::recover`].
    pub fn fail_with(&self, status: Status) {
        *self.outage.lock().unwrap() = Some(status);
    }

    pub fn recover(&self) {
        *self.outage.lock().unwrap() = None;
    }

    /// Delays every answer by `latency` (honours paused test time).
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, tenant_id: &str) -> usize {
        self.calls_per_tenant
            .lock()
            .unwrap()
            .get(tenant_id)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TopologyClient for ScriptedTopologyClient {
    async fn get_cluster_routing(
        &self,
        _ctx: &RequestContext,
        tenant_id: &str,
    ) -> Result<ClusterRouting, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_per_tenant
            .lock()
            .unwrap()
            .entry(tenant_id.to_string())
            .or_default() += 1;
        debug!(tenant_id, "scripted topology lookup");

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let outage = self.outage.lock().unwrap().clone();
        if let Some(status) = outage {
            return Err(status);
        }

        self.routings
            .lock()
            .unwrap()
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("tenant {tenant_id} not found")))
    }
}

/// Quartermaster that can never be reached.
#[derive(Default)]
pub struct UnreachableTopologyClient {
    calls: AtomicUsize,
}

impl UnreachableTopologyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TopologyClient for UnreachableTopologyClient {
    async fn get_cluster_routing(
        &self,
        _ctx: &RequestContext,
        _tenant_id: &str,
    ) -> Result<ClusterRouting, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Status::unavailable(
            "tcp connect error: Connection refused (os error 111)",
        ))
    }
}
