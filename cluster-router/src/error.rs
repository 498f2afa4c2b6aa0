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

//! Routing failures surfaced to control-plane handlers.

use std::error::Error;
use std::fmt::{Display, Formatter};
use tonic::{Code, Status};

/// Stable message for every topology-authority failure. Callers match on it.
pub const TOPOLOGY_UNAVAILABLE_MESSAGE: &str = "topology authority not available for cluster routing";

/// Coarse classification of a [`RoutingError`], mirroring gRPC status codes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RoutingErrorKind {
    Unavailable,
    NotFound,
}

impl RoutingErrorKind {
    pub fn code(self) -> Code {
        match self {
            RoutingErrorKind::Unavailable => Code::Unavailable,
            RoutingErrorKind::NotFound => Code::NotFound,
        }
    }
}

/// Failures produced while resolving or fanning out to Foghorn edges.
#[derive(Debug)]
pub enum RoutingError {
    /// Quartermaster could not be reached or answered with an error and no fresh
    /// route was cached.
    TopologyUnavailable { source: Status },
    /// The tenant's primary cluster still has no Foghorn address after one
    /// evict-and-retry cycle.
    NoFoghornForPrimary { tenant_id: String, cluster_id: String },
    /// A specific cluster could not be mapped to an address after one
    /// evict-and-retry cycle.
    ClusterNotFound {
        tenant_id: String,
        cluster_id: String,
        peer_count: usize,
    },
    /// The pool refused to hand out a client for the target.
    FoghornConnectionFailed { pool_key: String, source: Status },
    /// The tenant's route produced no callable fanout target.
    NoFanoutTargets { tenant_id: String },
    /// Stream termination did not complete on every distinct target.
    TerminationIncomplete {
        tenant_id: String,
        failed: usize,
        total: usize,
        last_error: Status,
    },
    /// Cache invalidation failed on every distinct target.
    InvalidationFailed {
        tenant_id: String,
        total: usize,
        last_error: Status,
    },
}

impl RoutingError {
    pub fn kind(&self) -> RoutingErrorKind {
        match self {
            RoutingError::ClusterNotFound { .. } => RoutingErrorKind::NotFound,
            RoutingError::TopologyUnavailable { .. }
            | RoutingError::NoFoghornForPrimary { .. }
            | RoutingError::FoghornConnectionFailed { .. }
            | RoutingError::NoFanoutTargets { .. }
            | RoutingError::TerminationIncomplete { .. }
            | RoutingError::InvalidationFailed { .. } => RoutingErrorKind::Unavailable,
        }
    }

    pub(crate) fn topology_unavailable(source: Status) -> Self {
        RoutingError::TopologyUnavailable { source }
    }
}

impl Display for RoutingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingError::TopologyUnavailable { .. } => {
                write!(f, "{TOPOLOGY_UNAVAILABLE_MESSAGE}")
            }
            RoutingError::NoFoghornForPrimary { cluster_id, .. } => {
                write!(f, "no foghorn registered for cluster {cluster_id}")
            }
            RoutingError::ClusterNotFound {
                tenant_id,
                cluster_id,
                peer_count,
            } => write!(
                f,
                "no foghorn address for cluster {cluster_id} (tenant {tenant_id} has access to {peer_count} clusters)"
            ),
            RoutingError::FoghornConnectionFailed { pool_key, source } => write!(
                f,
                "foghorn connection failed for cluster {pool_key}: {}",
                source.message()
            ),
            RoutingError::NoFanoutTargets { tenant_id } => {
                write!(f, "no foghorn targets for tenant {tenant_id}")
            }
            RoutingError::TerminationIncomplete {
                failed,
                total,
                last_error,
                ..
            } => write!(
                f,
                "failed to terminate streams on {failed} of {total} clusters: {}",
                last_error.message()
            ),
            RoutingError::InvalidationFailed {
                total, last_error, ..
            } => write!(
                f,
                "failed to invalidate cache on any of {total} clusters: {}",
                last_error.message()
            ),
        }
    }
}

impl Error for RoutingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RoutingError::TopologyUnavailable { source }
            | RoutingError::FoghornConnectionFailed { source, .. } => Some(source),
            RoutingError::TerminationIncomplete { last_error, .. }
            | RoutingError::InvalidationFailed { last_error, .. } => Some(last_error),
            _ => None,
        }
    }
}

impl From<RoutingError> for Status {
    fn from(err: RoutingError) -> Self {
        Status::new(err.kind().code(), err.to_string())
    }
}
