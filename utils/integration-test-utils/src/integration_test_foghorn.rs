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
use cluster_router::{FoghornClient, FoghornConnector, RequestContext, StreamsTerminated};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tonic::Status;
use tracing::debug;

/// How a fake Foghorn edge answers.
#[derive(Clone, Debug)]
pub enum EdgeBehaviour {
    /// Answers every call with the given counts.
    Healthy {
        streams_terminated: u32,
        sessions_terminated: u32,
        stream_names: Vec<String>,
        entries_invalidated: u32,
    },
    /// Dial succeeds, every call fails with `unavailable`.
    Unreachable,
    /// Dial succeeds, calls never complete.
    Hang,
    /// The connector refuses to create a client.
    RejectDial,
}

impl EdgeBehaviour {
    pub fn healthy(streams_terminated: u32, sessions_terminated: u32) -> Self {
        EdgeBehaviour::Healthy {
            streams_terminated,
            sessions_terminated,
            stream_names: Vec::new(),
            entries_invalidated: 0,
        }
    }

    pub fn invalidating(entries_invalidated: u32) -> Self {
        EdgeBehaviour::Healthy {
            streams_terminated: 0,
            sessions_terminated: 0,
            stream_names: Vec::new(),
            entries_invalidated,
        }
    }

    pub fn with_stream_names(self, names: &[&str]) -> Self {
        match self {
            EdgeBehaviour::Healthy {
                streams_terminated,
                sessions_terminated,
                entries_invalidated,
                ..
            } => EdgeBehaviour::Healthy {
                streams_terminated,
                sessions_terminated,
                stream_names: names.iter().map(|name| name.to_string()).collect(),
                entries_invalidated,
            },
            other => other,
        }
    }
}

impl Default for EdgeBehaviour {
    fn default() -> Self {
        EdgeBehaviour::healthy(0, 0)
    }
}

/// Call counters of one fake edge address.
#[derive(Debug, Default)]
struct EdgeCalls {
    dials: AtomicUsize,
    terminate: AtomicUsize,
    invalidate: AtomicUsize,
}

pub struct FakeFoghornClient {
    address: String,
    behaviour: EdgeBehaviour,
    calls: Arc<EdgeCalls>,
}

impl FakeFoghornClient {
    async fn fail_or_hang(&self) -> Option<Status> {
        match self.behaviour {
            EdgeBehaviour::Unreachable | EdgeBehaviour::RejectDial => Some(Status::unavailable(
                format!("connection refused by {}", self.address),
            )),
            EdgeBehaviour::Hang => std::future::pending().await,
            EdgeBehaviour::Healthy { .. } => None,
        }
    }
}

#[async_trait]
impl FoghornClient for FakeFoghornClient {
    async fn terminate_tenant_streams(
        &self,
        _ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<StreamsTerminated, Status> {
        self.calls.terminate.fetch_add(1, Ordering::SeqCst);
        debug!(address = self.address.as_str(), tenant_id, reason, "fake terminate");
        if let Some(status) = self.fail_or_hang().await {
            return Err(status);
        }

        match &self.behaviour {
            EdgeBehaviour::Healthy {
                streams_terminated,
                sessions_terminated,
                stream_names,
                ..
            } => Ok(StreamsTerminated {
                streams_terminated: *streams_terminated,
                sessions_terminated: *sessions_terminated,
                stream_names: stream_names.clone(),
            }),
            _ => Err(Status::internal("unreachable fake behaviour")),
        }
    }

    async fn invalidate_tenant_cache(
        &self,
        _ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<u32, Status> {
        self.calls.invalidate.fetch_add(1, Ordering::SeqCst);
        debug!(address = self.address.as_str(), tenant_id, reason, "fake invalidate");
        if let Some(status) = self.fail_or_hang().await {
            return Err(status);
        }

        match &self.behaviour {
            EdgeBehaviour::Healthy {
                entries_invalidated,
                ..
            } => Ok(*entries_invalidated),
            _ => Err(Status::internal("unreachable fake behaviour")),
        }
    }
}

/// Hands out [`FakeFoghornClient`]s configured per address.
///
/// Addresses without a configured behaviour get [`EdgeBehaviour::default`].
#[derive(Default)]
pub struct FakeFoghornConnector {
    behaviours: Mutex<HashMap<String, EdgeBehaviour>>,
    calls: Mutex<HashMap<String, Arc<EdgeCalls>>>,
}

impl FakeFoghornConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_behaviour(&self, address: &str, behaviour: EdgeBehaviour) {
        self.behaviours
            .lock()
            .unwrap()
            .insert(address.to_string(), behaviour);
    }

    fn calls(&self, address: &str) -> Arc<EdgeCalls> {
        self.calls
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .clone()
    }

    pub fn dials(&self, address: &str) -> usize {
        self.calls(address).dials.load(Ordering::SeqCst)
    }

    pub fn terminate_calls(&self, address: &str) -> usize {
        self.calls(address).terminate.load(Ordering::SeqCst)
    }

    pub fn invalidate_calls(&self, address: &str) -> usize {
        self.calls(address).invalidate.load(Ordering::SeqCst)
    }

    /// Sum of calls of either kind over every address.
    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .values()
            .map(|calls| {
                calls.terminate.load(Ordering::SeqCst) + calls.invalidate.load(Ordering::SeqCst)
            })
            .sum()
    }
}

impl FoghornConnector for FakeFoghornConnector {
    fn connect_lazy(&self, address: &str) -> Result<Arc<dyn FoghornClient>, Status> {
        let behaviour = self
            .behaviours
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default();
        if let EdgeBehaviour::RejectDial = behaviour {
            return Err(Status::invalid_argument(format!(
                "invalid grpc address {address}"
            )));
        }

        let calls = self.calls(address);
        calls.dials.fetch_add(1, Ordering::SeqCst);

        Ok(Arc::new(FakeFoghornClient {
            address: address.to_string(),
            behaviour,
            calls,
        }))
    }
}
