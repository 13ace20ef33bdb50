//! Lifecycle tests for the RPC transport.

use std::time::Instant;

use server_lifecycle::{with_service_register, Server, ServerError, ServerState, Transport, TransportKind};
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

mod common;

#[tokio::test]
async fn port_in_use_fails_within_window() {
    let (_holder, addr) = common::occupied_port().await;
    let mut server = Server::rpc([]);
    let started = Instant::now();

    let err = server.start(&addr).await.unwrap_err();
    assert!(err.is_bind_conflict(), "unexpected error: {}", err);
    assert!(started.elapsed() < common::START_DEADLINE);
    assert_eq!(server.state(), ServerState::Unstarted);
}

#[tokio::test]
async fn start_ready_stop() {
    let mut server = Server::rpc([]);
    assert_eq!(server.transport().kind(), TransportKind::Rpc);

    server.start("127.0.0.1:0").await.unwrap();
    assert!(server.ready().await.unwrap());

    server.stop().await.unwrap();
    server.stop().await.unwrap();
    assert_eq!(server.state(), ServerState::Stopped);

    let err = server.ready().await.unwrap_err();
    assert!(matches!(err, ServerError::Unreachable { .. }));
}

#[tokio::test]
async fn registered_services_are_served() {
    let (_reporter, health_service) = tonic_health::server::health_reporter();
    let mut server = Server::rpc([with_service_register(move |routes| {
        routes.add_service(health_service);
    })]);

    server.start("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();

    let channel = tonic::transport::Endpoint::from_shared(format!("http://{}", addr))
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut client = HealthClient::new(channel);
    let response = client
        .check(HealthCheckRequest {
            service: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(response.into_inner().status, ServingStatus::Serving as i32);

    drop(client);
    server.stop().await.unwrap();
}
