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

//! Canonical structured event names used across `cluster-router`.

// Route cache events.
pub const ROUTE_CACHE_HIT: &str = "route_cache_hit";
pub const ROUTE_CACHE_STALE: &str = "route_cache_stale";
pub const ROUTE_CACHE_REFRESH_START: &str = "route_cache_refresh_start";
pub const ROUTE_CACHE_REFRESH_OK: &str = "route_cache_refresh_ok";
pub const ROUTE_CACHE_REFRESH_FAILED: &str = "route_cache_refresh_failed";
pub const ROUTE_CACHE_NORMALIZED: &str = "route_cache_normalized";
pub const ROUTE_CACHE_EVICT: &str = "route_cache_evict";
pub const ROUTE_CACHE_EVICT_STALE: &str = "route_cache_evict_stale";

// Resolution events.
pub const RESOLVE_EMPTY_PRIMARY_ADDR: &str = "resolve_empty_primary_addr";
pub const RESOLVE_CLUSTER_MISS: &str = "resolve_cluster_miss";
pub const RESOLVE_CLUSTER_NOT_FOUND: &str = "resolve_cluster_not_found";
pub const RESOLVE_ACTIVE_CLUSTER_POOL_HIT: &str = "resolve_active_cluster_pool_hit";

// Foghorn pool events.
pub const FOGHORN_POOL_CREATE: &str = "foghorn_pool_create";
pub const FOGHORN_POOL_REPLACE: &str = "foghorn_pool_replace";
pub const FOGHORN_POOL_DIAL_FAILED: &str = "foghorn_pool_dial_failed";
pub const FOGHORN_POOL_REMOVE: &str = "foghorn_pool_remove";
pub const FOGHORN_POOL_EVICT_IDLE: &str = "foghorn_pool_evict_idle";
pub const FOGHORN_POOL_CLOSED: &str = "foghorn_pool_closed";

// Tenant fanout events.
pub const FANOUT_START: &str = "fanout_start";
pub const FANOUT_TARGET_OK: &str = "fanout_target_ok";
pub const FANOUT_TARGET_FAILED: &str = "fanout_target_failed";
pub const FANOUT_PARTIAL_FAILURE: &str = "fanout_partial_failure";
pub const FANOUT_COMPLETE: &str = "fanout_complete";
pub const FANOUT_FAILED: &str = "fanout_failed";

// Router lifecycle events.
pub const ROUTER_STARTED: &str = "router_started";
pub const ROUTER_MAINTENANCE_STOPPED: &str = "router_maintenance_stopped";
