use std::net::SocketAddr;
use l7_gateway::pool::{
    BackendPool, Endpoint, HealthCheckConfig, Protocol, RegistryError, ServiceRegistry,
};

fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

fn make_registry(ids: &[&str]) -> ServiceRegistry {
    ServiceRegistry::new(ids.iter().map(|id| {
        BackendPool::new(*id, Protocol::Http, 80, HealthCheckConfig::default())
    }))
}

#[test]
fn test_register_unknown_pool_fails() {
    let registry = make_registry(&["BE"]);
    let result = registry.register("NOPE", Endpoint::new(addr("127.0.0.1:8080")));

    assert!(matches!(result, Err(RegistryError::InvalidPool { .. })));
    assert!(registry
        .deregister("NOPE", &addr("127.0.0.1:8080"))
        .is_err());
    assert!(registry.list_healthy("NOPE").is_err());
}

#[test]
fn test_register_is_idempotent() {
    let registry = make_registry(&["BE"]);
    let endpoint = Endpoint::new(addr("127.0.0.1:8080"));

    registry.register("BE", endpoint).unwrap();
    registry.register("BE", endpoint).unwrap();

    let pool = registry.pool("BE").unwrap();
    assert_eq!(pool.endpoints().len(), 1, "같은 주소의 재등록은 no-op이어야 함");
}

#[test]
fn test_registered_endpoint_is_not_instantly_healthy() {
    let registry = make_registry(&["BE"]);
    registry.register("BE", Endpoint::new(addr("127.0.0.1:8080"))).unwrap();

    // 헬스 체크 통과 전까지는 healthy 부분집합에 들어가지 않음
    assert!(registry.list_healthy("BE").unwrap().is_empty());
}

#[test]
fn test_empty_healthy_is_not_an_error() {
    let registry = make_registry(&["BE"]);
    let healthy = registry.list_healthy("BE").unwrap();
    assert!(healthy.is_empty(), "빈 healthy 목록은 정상 상태여야 함");
}

#[test]
fn test_deregister_removes_from_both_sets() {
    let registry = make_registry(&["BE"]);
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    let e2 = Endpoint::new(addr("127.0.0.1:8081"));
    registry.register("BE", e1).unwrap();
    registry.register("BE", e2).unwrap();

    let pool = registry.pool("BE").unwrap();
    pool.publish_healthy(vec![e1, e2]);
    assert_eq!(registry.list_healthy("BE").unwrap().len(), 2);

    registry.deregister("BE", &e1.addr).unwrap();

    assert_eq!(pool.endpoints().len(), 1);
    let healthy = registry.list_healthy("BE").unwrap();
    assert_eq!(healthy.len(), 1, "해제된 엔드포인트는 healthy에서도 즉시 빠져야 함");
    assert_eq!(healthy[0].addr, e2.addr);

    // 해제도 멱등
    registry.deregister("BE", &e1.addr).unwrap();
    assert_eq!(pool.endpoints().len(), 1);
}

#[test]
fn test_healthy_is_always_subset_of_full() {
    let pool = BackendPool::new("BE", Protocol::Http, 80, HealthCheckConfig::default());
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    let e2 = Endpoint::new(addr("127.0.0.1:8081"));
    pool.add_endpoint(e1);

    // 전체 집합에 없는 엔드포인트를 게시해도 걸러져야 함
    pool.publish_healthy(vec![e1, e2]);

    let healthy = pool.healthy_endpoints();
    let full = pool.endpoints();
    assert!(
        healthy.iter().all(|h| full.iter().any(|f| f.addr == h.addr)),
        "healthy ⊆ full 불변식 위반"
    );
    assert_eq!(healthy.len(), 1);
}

#[test]
fn test_inflight_snapshot_survives_deregistration() {
    let registry = make_registry(&["BE"]);
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    registry.register("BE", e1).unwrap();

    let pool = registry.pool("BE").unwrap();
    pool.publish_healthy(vec![e1]);

    // 진행 중 요청이 들고 있는 스냅샷
    let snapshot = registry.list_healthy("BE").unwrap();

    registry.deregister("BE", &e1.addr).unwrap();

    // 새 요청에는 보이지 않지만 기존 스냅샷은 그대로 (graceful drain)
    assert!(registry.list_healthy("BE").unwrap().is_empty());
    assert_eq!(snapshot.len(), 1);
}

#[test]
fn test_round_robin_selection() {
    let pool = BackendPool::new("BE", Protocol::Http, 80, HealthCheckConfig::default());
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    let e2 = Endpoint::new(addr("127.0.0.1:8081"));
    let e3 = Endpoint::new(addr("127.0.0.1:8082"));
    for e in [e1, e2, e3] {
        pool.add_endpoint(e);
    }
    pool.publish_healthy(vec![e1, e2, e3]);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..3 {
        let (primary, alternate) = pool.select_for_request().unwrap();
        assert_ne!(
            alternate.unwrap().addr,
            primary.addr,
            "대체 엔드포인트는 주 엔드포인트와 달라야 함"
        );
        seen.insert(primary.addr);
    }
    assert_eq!(seen.len(), 3, "모든 백엔드가 순환되어야 함");
}

#[test]
fn test_selection_with_empty_or_single_healthy() {
    let pool = BackendPool::new("BE", Protocol::Http, 80, HealthCheckConfig::default());
    assert!(pool.select_for_request().is_none(), "healthy 없음 → 선택 없음");

    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    pool.add_endpoint(e1);
    pool.publish_healthy(vec![e1]);

    let (primary, alternate) = pool.select_for_request().unwrap();
    assert_eq!(primary.addr, e1.addr);
    assert!(alternate.is_none(), "후보가 하나면 대체 엔드포인트 없음");
}

#[test]
fn test_selection_rebalances_after_membership_change() {
    let pool = BackendPool::new("BE", Protocol::Http, 80, HealthCheckConfig::default());
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    let e2 = Endpoint::new(addr("127.0.0.1:8081"));
    pool.add_endpoint(e1);
    pool.add_endpoint(e2);
    pool.publish_healthy(vec![e1, e2]);

    for _ in 0..5 {
        pool.select_for_request().unwrap();
    }

    // 멤버십 축소 후에는 남은 엔드포인트만 선택됨
    pool.remove_endpoint(&e1.addr);
    for _ in 0..5 {
        let (primary, alternate) = pool.select_for_request().unwrap();
        assert_eq!(primary.addr, e2.addr);
        assert!(alternate.is_none());
    }
}
