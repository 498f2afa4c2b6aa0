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

//! # cluster-router
//!
//! `cluster-router` decides which Foghorn edge serves a tenant and fans tenant-wide
//! control operations out to every edge the tenant touches.
//!
//! Typical usage is API-first and centered on [`ClusterRouter`]: build it once per
//! process from a [`RouterConfig`] (or from your own [`TopologyClient`] and
//! [`FoghornConnector`]) and pass each inbound request's [`RequestContext`] into
//! its operations.
//!
//! ## Configuration
//!
//! ```
//! use cluster_router::RouterConfig;
//! use std::time::Duration;
//!
//! let config = RouterConfig::from_json5_str(
//!     r#"{
//!         route_cache: { ttl_secs: 120 },
//!         quartermaster: { grpc_addr: "quartermaster:19002" },
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.route_cache_ttl(), Duration::from_secs(120));
//! ```
//!
//! ## Failure contract
//!
//! Routing never guesses. A tenant whose topology cannot be freshly confirmed gets
//! an Unavailable error carrying [`TOPOLOGY_UNAVAILABLE_MESSAGE`], a cluster that
//! stays unknown after one refresh gets NotFound, and stream termination fails
//! unless every edge confirmed it. [`RoutingError`] converts into
//! [`tonic::Status`] for handlers.
//!
//! ## Internal architecture map
//!
//! - API facade: [`ClusterRouter`] and its resolver/fanout operations
//! - Control plane: route model and the TTL-bounded route cache
//! - Routing: address precedence, legacy normalization, pool keys, fanout targets
//! - Data plane: pooled Foghorn clients and the tenant fanout coordinator
//! - Transport: Quartermaster/Foghorn boundary traits, `tonic` adapters and the
//!   generated wire types in [`proto`]
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Every event carries `event` and
//! `component` fields; fanout events also carry a per-operation `fanout_id`.
//! Library code does not initialize a global subscriber. Binaries and tests are
//! responsible for one-time `tracing_subscriber` initialization.

mod cluster_router;
pub use cluster_router::{ClusterRouter, FoghornHandle};

mod config;
pub use config::{ConfigError, FoghornPoolConfig, QuartermasterConfig, RouteCacheConfig, RouterConfig};

mod context;
pub use context::RequestContext;

mod control_plane;
pub use control_plane::cluster_route::ClusterRoute;
pub use control_plane::route_cache::{RouteCache, DEFAULT_ROUTE_CACHE_TTL};

mod data_plane;
pub use data_plane::foghorn_pool::FoghornPool;
pub use data_plane::tenant_fanout::{InvalidateTenantCacheSummary, TerminateTenantStreamsSummary};

mod error;
pub use error::{RoutingError, RoutingErrorKind, TOPOLOGY_UNAVAILABLE_MESSAGE};

#[doc(hidden)]
pub mod observability;

mod routing;
pub use routing::address_resolution::{
    foghorn_pool_key, normalize_cluster_route, resolve_addr_from_route,
};
pub use routing::fanout_targets::{build_fanout_targets, FanoutTarget};

mod transport;
pub use transport::foghorn::{FoghornClient, FoghornConnector, StreamsTerminated};
pub use transport::grpc::{
    GrpcChannelSettings, GrpcFoghornClient, GrpcFoghornConnector, GrpcQuartermasterClient,
};
pub use transport::proto;
pub use transport::quartermaster::{ClusterPeer, ClusterRouting, TopologyClient};
