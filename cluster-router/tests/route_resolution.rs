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

use cluster_router::{
    ClusterRouter, ClusterRouting, RequestContext, RoutingError, RoutingErrorKind,
    TOPOLOGY_UNAVAILABLE_MESSAGE,
};
use integration_test_utils::{
    init_logging, peer, routing, FakeFoghornConnector, ScriptedTopologyClient,
    UnreachableTopologyClient,
};
use std::sync::Arc;
use std::time::Duration;
use tonic::{Code, Status};

const TTL: Duration = Duration::from_secs(300);

fn make_router(topology: Arc<ScriptedTopologyClient>) -> (Arc<ClusterRouter>, Arc<FakeFoghornConnector>) {
    let connector = Arc::new(FakeFoghornConnector::new());
    let router = Arc::new(ClusterRouter::new(topology, connector.clone(), TTL));
    (router, connector)
}

#[tokio::test]
async fn unreachable_topology_fails_with_stable_message() {
    init_logging();
    let topology = Arc::new(UnreachableTopologyClient::new());
    let router = ClusterRouter::new(
        topology.clone(),
        Arc::new(FakeFoghornConnector::new()),
        TTL,
    );

    let err = router
        .resolve_foghorn_for_tenant(&RequestContext::background(), "tenant-1")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RoutingErrorKind::Unavailable);
    assert_eq!(err.to_string(), TOPOLOGY_UNAVAILABLE_MESSAGE);
    let status = Status::from(err);
    assert_eq!(status.code(), Code::Unavailable);
    assert_eq!(
        status.message(),
        "topology authority not available for cluster routing"
    );
    assert_eq!(topology.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn route_is_reused_within_ttl_and_refreshed_after() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::with_routing(
        "tenant-1",
        routing("cluster-a", "a:18019", vec![]),
    ));
    let (router, connector) = make_router(topology.clone());
    let ctx = RequestContext::background();

    for _ in 0..3 {
        router.resolve_foghorn_for_tenant(&ctx, "tenant-1").await.unwrap();
    }
    assert_eq!(topology.calls(), 1);
    assert_eq!(connector.dials("a:18019"), 1);

    topology.set_routing("tenant-1", routing("cluster-a", "a2:18019", vec![]));
    tokio::time::advance(TTL).await;

    let handle = router.resolve_foghorn_for_tenant(&ctx, "tenant-1").await.unwrap();
    assert_eq!(topology.calls(), 2);
    assert_eq!(handle.address, "a2:18019");
    // The edge moved: the pooled client was replaced, not duplicated.
    assert_eq!(router.pool().len().await, 1);
}

#[tokio::test]
async fn routes_are_cached_and_evicted_per_tenant() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::with_routing(
        "tenant-1",
        routing("cluster-a", "a:18019", vec![]),
    ));
    topology.set_routing("tenant-2", routing("cluster-b", "b:18019", vec![]));
    let (router, _) = make_router(topology.clone());
    let ctx = RequestContext::background();

    for tenant_id in ["tenant-1", "tenant-2", "tenant-1", "tenant-2"] {
        router.resolve_foghorn_for_tenant(&ctx, tenant_id).await.unwrap();
    }
    assert!(router.evict_route("tenant-2").await);
    let handle = router.resolve_foghorn_for_tenant(&ctx, "tenant-2").await.unwrap();

    assert_eq!(handle.cluster_id, "cluster-b");
    assert_eq!(topology.calls_for("tenant-1"), 1);
    assert_eq!(topology.calls_for("tenant-2"), 2);
}

#[tokio::test(start_paused = true)]
async fn stale_route_is_not_served_during_an_outage() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::with_routing(
        "tenant-1",
        routing("cluster-a", "a:18019", vec![]),
    ));
    let (router, _) = make_router(topology.clone());
    let ctx = RequestContext::background();

    router
        .resolve_cluster_route_for_tenant(&ctx, "tenant-1")
        .await
        .unwrap();
    topology.fail_with(Status::unavailable("connection reset"));
    tokio::time::advance(TTL + Duration::from_secs(1)).await;

    let err = router
        .resolve_foghorn_for_tenant(&ctx, "tenant-1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), TOPOLOGY_UNAVAILABLE_MESSAGE);

    topology.recover();
    assert!(router.resolve_foghorn_for_tenant(&ctx, "tenant-1").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn empty_primary_address_evicts_before_the_retry_completes() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::with_routing(
        "tenant-1",
        routing("cluster-a", "", vec![]),
    ));
    topology.set_latency(Duration::from_secs(1));
    let (router, _) = make_router(topology.clone());

    let task = tokio::spawn({
        let router = router.clone();
        async move {
            router
                .resolve_foghorn_for_tenant(&RequestContext::background(), "tenant-1")
                .await
        }
    });

    while topology.calls() < 2 {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(router.cached_route("tenant-1").await.is_none());

    topology.set_routing("tenant-1", routing("cluster-a", "a:18019", vec![]));
    let handle = task.await.unwrap().unwrap();

    assert_eq!(handle.cluster_id, "cluster-a");
    assert_eq!(handle.address, "a:18019");
    assert_eq!(topology.calls(), 2);
}

#[tokio::test]
async fn legacy_topology_resolves_primary_from_peer_listing() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::with_routing(
        "tenant-1",
        routing(
            "",
            "",
            vec![peer("cluster-a", "a:18019"), peer("cluster-b", "b:18019")],
        ),
    ));
    let (router, _) = make_router(topology);

    let handle = router
        .resolve_foghorn_for_tenant(&RequestContext::background(), "tenant-1")
        .await
        .unwrap();

    assert_eq!(handle.cluster_id, "cluster-a");
    assert_eq!(handle.address, "a:18019");
}

#[tokio::test]
async fn artifacts_route_to_their_origin_cluster() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::with_routing(
        "tenant-1",
        ClusterRouting {
            official_cluster_id: "cluster-official".to_string(),
            official_foghorn_grpc_addr: "official:18019".to_string(),
            ..routing(
                "cluster-primary",
                "primary:18019",
                vec![peer("cluster-peer-1", "a1"), peer("cluster-peer-2", "a2")],
            )
        },
    ));
    let (router, _) = make_router(topology.clone());
    let ctx = RequestContext::background();

    let legacy = router
        .resolve_foghorn_for_artifact(&ctx, "tenant-1", "")
        .await
        .unwrap();
    let peer_clip = router
        .resolve_foghorn_for_artifact(&ctx, "tenant-1", "cluster-peer-2")
        .await
        .unwrap();
    let official_clip = router
        .resolve_foghorn_for_artifact(&ctx, "tenant-1", "cluster-official")
        .await
        .unwrap();

    assert_eq!(legacy.address, "primary:18019");
    assert_eq!(peer_clip.address, "a2");
    assert_eq!(official_clip.address, "official:18019");
    assert_eq!(topology.calls(), 1);
}

#[tokio::test]
async fn unknown_origin_cluster_is_not_found_after_one_refresh() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::with_routing(
        "tenant-1",
        routing(
            "cluster-primary",
            "primary:18019",
            vec![peer("cluster-peer-1", "a1"), peer("cluster-peer-2", "a2")],
        ),
    ));
    let (router, connector) = make_router(topology.clone());

    let err = router
        .resolve_foghorn_for_artifact(&RequestContext::background(), "tenant-1", "cluster-unknown")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), RoutingErrorKind::NotFound);
    assert_eq!(
        err.to_string(),
        "no foghorn address for cluster cluster-unknown (tenant tenant-1 has access to 2 clusters)"
    );
    assert_eq!(Status::from(err).code(), Code::NotFound);
    assert_eq!(topology.calls(), 2);
    assert_eq!(connector.total_calls(), 0);
}

#[tokio::test]
async fn topology_error_for_specific_cluster_lookup_is_unavailable() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::new());
    topology.fail_with(Status::internal("database unavailable"));
    let (router, _) = make_router(topology);

    let err = router
        .resolve_foghorn_for_cluster(&RequestContext::background(), "cluster-b", "tenant-1")
        .await
        .unwrap_err();

    assert!(matches!(err, RoutingError::TopologyUnavailable { .. }));
}

#[tokio::test(start_paused = true)]
async fn slow_topology_is_cut_off_by_the_request_deadline() {
    init_logging();
    let topology = Arc::new(ScriptedTopologyClient::with_routing(
        "tenant-1",
        routing("cluster-a", "a:18019", vec![]),
    ));
    topology.set_latency(Duration::from_secs(30));
    let (router, _) = make_router(topology);

    let err = router
        .resolve_foghorn_for_tenant(&RequestContext::with_timeout(Duration::from_secs(2)), "tenant-1")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), TOPOLOGY_UNAVAILABLE_MESSAGE);
    assert!(router.cached_route("tenant-1").await.is_none());
}
