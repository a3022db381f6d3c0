use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Response;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use l7_gateway::pool::{BackendPool, Endpoint, HealthCheckConfig, Protocol, ServiceRegistry};
use l7_gateway::proxy::ProxyConfig;
use l7_gateway::routing::{RouteRule, RoutingTable};
use l7_gateway::server::handler::RequestHandler;
use l7_gateway::server::listener::ServerListener;
use l7_gateway::server::GatewayManager;
use l7_gateway::settings::{
    HealthCheckSettings, LogSettings, PoolSettings, RouteSettings, ServerSettings, Settings,
};

// 고정 본문으로 응답하는 테스트 백엔드
async fn spawn_backend(tag: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |_req| async move {
                    Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(tag))))
                });
                let _ = http1::Builder::new().serve_connection(io, service).await;
            });
        }
    });
    addr
}

fn seeded_pool(id: &str, addr: SocketAddr) -> BackendPool {
    let pool = BackendPool::new(id, Protocol::Http, addr.port(), HealthCheckConfig::default());
    let endpoint = Endpoint::new(addr);
    pool.add_endpoint(endpoint);
    pool.publish_healthy(vec![endpoint]);
    pool
}

#[tokio::test]
async fn test_gateway_routes_by_path_end_to_end() {
    let be_addr = spawn_backend("be").await;
    let fe_addr = spawn_backend("fe").await;

    let registry = Arc::new(ServiceRegistry::new(vec![
        seeded_pool("BE", be_addr),
        seeded_pool("FE", fe_addr),
        BackendPool::new("EMPTY", Protocol::Http, 9999, HealthCheckConfig::default()),
    ]));

    let mut table = RoutingTable::new("FE");
    table.add_rule(RouteRule::new("/api/*", 123, "BE").unwrap());
    table.add_rule(RouteRule::new("/down/*", 10, "EMPTY").unwrap());

    let handler = Arc::new(RequestHandler::new(
        Arc::new(table),
        registry,
        ProxyConfig::new(Duration::from_secs(2), Duration::from_secs(5)),
    ));

    let settings = ServerSettings {
        bind_address: "127.0.0.1".to_string(),
        http_port: 0,
        attempt_timeout: 2,
        request_timeout: 5,
    };
    let listener = ServerListener::new(&settings).await.unwrap();
    let gateway_addr = listener.local_addr().unwrap();
    tokio::spawn(listener.run(handler));

    let client = reqwest::Client::new();

    // /api/* 는 BE 풀로
    let response = client
        .get(format!("http://{}/api/users", gateway_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "be");

    // 나머지는 기본 풀 FE로
    let response = client
        .get(format!("http://{}/home", gateway_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "fe");

    // healthy 엔드포인트가 없는 풀은 503 (행이 아님)
    let response = client
        .get(format!("http://{}/down/page", gateway_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
}

fn base_settings() -> Settings {
    Settings {
        server: ServerSettings::default(),
        logging: LogSettings::default(),
        pools: vec![PoolSettings {
            id: "FE".to_string(),
            protocol: "http".to_string(),
            target_port: 80,
            endpoints: vec!["10.0.0.1:80".to_string()],
            health_check: HealthCheckSettings::default(),
        }],
        routes: Vec::new(),
        default_pool: "FE".to_string(),
    }
}

#[test]
fn test_manager_rejects_unknown_pool_before_listening() {
    // 알 수 없는 풀을 참조하는 설정은 리스너 시작 전에 거부됨
    let mut settings = base_settings();
    settings.routes.push(RouteSettings {
        pattern: "/api/*".to_string(),
        priority: 10,
        pool: "MISSING".to_string(),
    });

    assert!(GatewayManager::new(settings).is_err());

    let mut settings = base_settings();
    settings.default_pool = "NOWHERE".to_string();
    assert!(GatewayManager::new(settings).is_err());
}

#[test]
fn test_manager_seeds_endpoints_untrusted() {
    let manager = GatewayManager::new(base_settings()).expect("유효한 설정이어야 함");
    let registry = manager.registry();

    let pool = registry.pool("FE").expect("FE 풀이 생성되어야 함");
    assert_eq!(pool.endpoints().len(), 1, "시드 엔드포인트가 등록되어야 함");
    assert!(
        registry.list_healthy("FE").unwrap().is_empty(),
        "시드 엔드포인트도 헬스 체크 통과 전까지는 unhealthy"
    );
    assert_eq!(manager.routing_table().default_pool(), "FE");
}
