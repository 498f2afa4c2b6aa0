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

//! `tonic` adapters for the Quartermaster and Foghorn boundaries.
//!
//! Channels are created with [`Endpoint::connect_lazy`], so building a client never
//! waits on the network; connection failures surface on the first call. Creating a
//! channel spawns its background worker and must happen inside a Tokio runtime.
//!
//! An `https://` address always gets TLS, verified against the bundled web PKI roots.
//! With [`GrpcChannelSettings::tls`] set, a bare `host:port` does too and an explicit
//! `http://` address is refused.

use super::foghorn::{FoghornClient, FoghornConnector, StreamsTerminated};
use super::proto::foghorn::tenant_control_service_client::TenantControlServiceClient;
use super::proto::foghorn::{InvalidateTenantCacheRequest, TerminateTenantStreamsRequest};
use super::proto::quartermaster::tenant_service_client::TenantServiceClient;
use super::proto::quartermaster::GetClusterRoutingRequest;
use super::quartermaster::{ClusterRouting, TopologyClient};
use crate::context::RequestContext;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};
use tracing::debug;

const COMPONENT: &str = "grpc_transport";

/// Channel settings shared by every connection an adapter opens.
#[derive(Clone, Debug)]
pub struct GrpcChannelSettings {
    pub connect_timeout: Duration,
    pub call_timeout: Duration,
    /// Sent as `authorization: Bearer <token>` on every call when present.
    pub service_token: Option<String>,
    pub tls: bool,
}

impl Default for GrpcChannelSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(30),
            service_token: None,
            tls: false,
        }
    }
}

/// Per-call metadata stamped onto every outbound request.
#[derive(Clone)]
struct CallMetadata {
    authorization: Option<MetadataValue<Ascii>>,
}

impl CallMetadata {
    fn request<T>(&self, ctx: &RequestContext, message: T) -> Request<T> {
        let mut request = Request::new(message);
        if let Some(remaining) = ctx.remaining() {
            request.set_timeout(remaining);
        }
        if let Some(authorization) = &self.authorization {
            request
                .metadata_mut()
                .insert("authorization", authorization.clone());
        }
        request
    }
}

fn endpoint_uri(address: &str, tls: bool) -> Result<(String, bool), Status> {
    if address.starts_with("https://") {
        Ok((address.to_string(), true))
    } else if address.starts_with("http://") {
        if tls {
            return Err(Status::invalid_argument(format!(
                "plaintext grpc address {address} while tls is enabled"
            )));
        }
        Ok((address.to_string(), false))
    } else if tls {
        Ok((format!("https://{address}"), true))
    } else {
        Ok((format!("http://{address}"), false))
    }
}

fn open_channel(
    address: &str,
    settings: &GrpcChannelSettings,
) -> Result<(Channel, CallMetadata), Status> {
    let (uri, use_tls) = endpoint_uri(address, settings.tls)?;

    let mut endpoint = Endpoint::from_shared(uri)
        .map_err(|err| Status::invalid_argument(format!("invalid grpc address {address}: {err}")))?
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.call_timeout);
    if use_tls {
        endpoint = endpoint
            .tls_config(ClientTlsConfig::new().with_webpki_roots())
            .map_err(|err| {
                Status::invalid_argument(format!("invalid tls settings for {address}: {err}"))
            })?;
    }

    let authorization = settings
        .service_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .map(|token| {
            MetadataValue::try_from(format!("Bearer {token}"))
                .map_err(|_| Status::invalid_argument("service token is not valid header data"))
        })
        .transpose()?;

    let channel = endpoint.connect_lazy();
    debug!(
        component = COMPONENT,
        address,
        tls = use_tls,
        "opened lazy grpc channel"
    );

    Ok((channel, CallMetadata { authorization }))
}

/// Quartermaster client over a single lazily connected channel.
#[derive(Clone)]
pub struct GrpcQuartermasterClient {
    client: TenantServiceClient<Channel>,
    metadata: CallMetadata,
}

impl GrpcQuartermasterClient {
    pub fn connect_lazy(address: &str, settings: &GrpcChannelSettings) -> Result<Self, Status> {
        let (channel, metadata) = open_channel(address, settings)?;
        Ok(Self {
            client: TenantServiceClient::new(channel),
            metadata,
        })
    }
}

#[async_trait]
impl TopologyClient for GrpcQuartermasterClient {
    async fn get_cluster_routing(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
    ) -> Result<ClusterRouting, Status> {
        let request = self.metadata.request(
            ctx,
            GetClusterRoutingRequest {
                tenant_id: tenant_id.to_string(),
            },
        );
        let response = self.client.clone().get_cluster_routing(request).await?;
        Ok(response.into_inner().into())
    }
}

/// Foghorn tenant-control client bound to one edge address.
#[derive(Clone)]
pub struct GrpcFoghornClient {
    client: TenantControlServiceClient<Channel>,
    metadata: CallMetadata,
}

#[async_trait]
impl FoghornClient for GrpcFoghornClient {
    async fn terminate_tenant_streams(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<StreamsTerminated, Status> {
        let request = self.metadata.request(
            ctx,
            TerminateTenantStreamsRequest {
                tenant_id: tenant_id.to_string(),
                reason: reason.to_string(),
            },
        );
        let response = self.client.clone().terminate_tenant_streams(request).await?;
        Ok(response.into_inner().into())
    }

    async fn invalidate_tenant_cache(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
        reason: &str,
    ) -> Result<u32, Status> {
        let request = self.metadata.request(
            ctx,
            InvalidateTenantCacheRequest {
                tenant_id: tenant_id.to_string(),
                reason: reason.to_string(),
            },
        );
        let response = self.client.clone().invalidate_tenant_cache(request).await?;
        Ok(response.into_inner().entries_invalidated.max(0) as u32)
    }
}

/// Opens one lazy gRPC channel per Foghorn address handed out by the pool.
#[derive(Clone, Debug, Default)]
pub struct GrpcFoghornConnector {
    settings: GrpcChannelSettings,
}

impl GrpcFoghornConnector {
    pub fn new(settings: GrpcChannelSettings) -> Self {
        Self { settings }
    }
}

impl FoghornConnector for GrpcFoghornConnector {
    fn connect_lazy(&self, address: &str) -> Result<Arc<dyn FoghornClient>, Status> {
        let (channel, metadata) = open_channel(address, &self.settings)?;
        Ok(Arc::new(GrpcFoghornClient {
            client: TenantControlServiceClient::new(channel),
            metadata,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{endpoint_uri, GrpcChannelSettings, GrpcFoghornConnector, GrpcQuartermasterClient};
    use crate::transport::foghorn::FoghornConnector;
    use tonic::Code;

    #[tokio::test]
    async fn connect_lazy_does_not_wait_for_unreachable_edges() {
        let connector = GrpcFoghornConnector::new(GrpcChannelSettings::default());

        // Nothing listens on port 9; a lazy channel is still handed out.
        assert!(connector.connect_lazy("127.0.0.1:9").is_ok());
    }

    #[tokio::test]
    async fn malformed_address_is_rejected_up_front() {
        let connector = GrpcFoghornConnector::new(GrpcChannelSettings::default());

        let err = connector
            .connect_lazy("not a uri")
            .err()
            .expect("malformed address should be rejected");

        assert_eq!(err.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn invalid_service_token_is_rejected() {
        let settings = GrpcChannelSettings {
            service_token: Some("line\nbreak".to_string()),
            ..Default::default()
        };

        let result = GrpcQuartermasterClient::connect_lazy("127.0.0.1:9", &settings);

        assert_eq!(result.err().map(|err| err.code()), Some(Code::InvalidArgument));
    }

    #[test]
    fn https_scheme_always_selects_tls() {
        assert_eq!(
            endpoint_uri("https://edge-1:18019", false).unwrap(),
            ("https://edge-1:18019".to_string(), true)
        );
        assert_eq!(
            endpoint_uri("edge-1:18019", true).unwrap(),
            ("https://edge-1:18019".to_string(), true)
        );
        assert_eq!(
            endpoint_uri("edge-1:18019", false).unwrap(),
            ("http://edge-1:18019".to_string(), false)
        );
    }

    #[test]
    fn plaintext_scheme_is_refused_when_tls_is_enabled() {
        let err = endpoint_uri("http://edge-1:18019", true).unwrap_err();

        assert_eq!(err.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn tls_channel_opens_lazily() {
        let settings = GrpcChannelSettings {
            tls: true,
            ..Default::default()
        };

        assert!(GrpcQuartermasterClient::connect_lazy("quartermaster:19002", &settings).is_ok());
    }
}
