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

//! JSON5 configuration of a [`ClusterRouter`](crate::ClusterRouter).

use crate::control_plane::route_cache::DEFAULT_ROUTE_CACHE_TTL;
use crate::transport::grpc::GrpcChannelSettings;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    #[serde(default)]
    pub route_cache: RouteCacheConfig,
    #[serde(default)]
    pub foghorn_pool: FoghornPoolConfig,
    pub quartermaster: QuartermasterConfig,
    /// Bearer token attached to every outbound gRPC call.
    #[serde(default)]
    pub service_token: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouteCacheConfig {
    #[serde(default = "default_route_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FoghornPoolConfig {
    #[serde(default = "default_foghorn_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_max_idle_secs")]
    pub max_idle_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Dial every edge over TLS. `https://` addresses use TLS regardless.
    #[serde(default)]
    pub tls: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct QuartermasterConfig {
    pub grpc_addr: String,
    #[serde(default = "default_quartermaster_call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub tls: bool,
}

fn default_route_ttl_secs() -> u64 {
    DEFAULT_ROUTE_CACHE_TTL.as_secs()
}

fn default_foghorn_call_timeout_ms() -> u64 {
    30_000
}

fn default_quartermaster_call_timeout_ms() -> u64 {
    10_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_max_idle_secs() -> u64 {
    600
}

fn default_sweep_interval_secs() -> u64 {
    30
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_route_ttl_secs(),
        }
    }
}

impl Default for FoghornPoolConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_foghorn_call_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_idle_secs: default_max_idle_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            tls: false,
        }
    }
}

/// Failures while loading a [`RouterConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(json5::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read router config: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse router config: {err}"),
            ConfigError::Invalid(reason) => write!(f, "invalid router config: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl RouterConfig {
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = json5::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json5_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.quartermaster.grpc_addr.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "quartermaster.grpc_addr must not be empty".to_string(),
            ));
        }

        let non_zero = [
            ("route_cache.ttl_secs", self.route_cache.ttl_secs),
            ("foghorn_pool.call_timeout_ms", self.foghorn_pool.call_timeout_ms),
            (
                "foghorn_pool.connect_timeout_ms",
                self.foghorn_pool.connect_timeout_ms,
            ),
            ("foghorn_pool.max_idle_secs", self.foghorn_pool.max_idle_secs),
            (
                "foghorn_pool.sweep_interval_secs",
                self.foghorn_pool.sweep_interval_secs,
            ),
            ("quartermaster.call_timeout_ms", self.quartermaster.call_timeout_ms),
            (
                "quartermaster.connect_timeout_ms",
                self.quartermaster.connect_timeout_ms,
            ),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
        }

        if matches!(&self.service_token, Some(token) if token.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "service_token must not be blank when set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn route_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.route_cache.ttl_secs)
    }

    pub fn pool_max_idle(&self) -> Duration {
        Duration::from_secs(self.foghorn_pool.max_idle_secs)
    }

    pub fn pool_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.foghorn_pool.sweep_interval_secs)
    }

    pub fn quartermaster_channel_settings(&self) -> GrpcChannelSettings {
        GrpcChannelSettings {
            connect_timeout: Duration::from_millis(self.quartermaster.connect_timeout_ms),
            call_timeout: Duration::from_millis(self.quartermaster.call_timeout_ms),
            service_token: self.service_token.clone(),
            tls: self.quartermaster.tls,
        }
    }

    pub fn foghorn_channel_settings(&self) -> GrpcChannelSettings {
        GrpcChannelSettings {
            connect_timeout: Duration::from_millis(self.foghorn_pool.connect_timeout_ms),
            call_timeout: Duration::from_millis(self.foghorn_pool.call_timeout_ms),
            service_token: self.service_token.clone(),
            tls: self.foghorn_pool.tls,
        }
    }
}
