use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use l7_gateway::health::{
    probe_cycle, EndpointHealth, HealthProbe, ProbeResult, ProbeStatus, TcpProbe,
};
use l7_gateway::pool::{BackendPool, Endpoint, HealthCheckConfig, Protocol};

fn addr(s: &str) -> SocketAddr {
    s.parse().unwrap()
}

fn make_pool(healthy_threshold: u32, unhealthy_threshold: u32) -> BackendPool {
    BackendPool::new(
        "BE",
        Protocol::Http,
        80,
        HealthCheckConfig {
            healthy_threshold,
            unhealthy_threshold,
            ..Default::default()
        },
    )
}

// 스크립트 가능한 프로브: 집합에 있는 주소만 Healthy로 판정
struct ScriptedProbe {
    healthy: Mutex<HashSet<SocketAddr>>,
}

impl ScriptedProbe {
    fn new() -> Self {
        Self {
            healthy: Mutex::new(HashSet::new()),
        }
    }

    fn set_healthy(&self, addr: SocketAddr, healthy: bool) {
        let mut set = self.healthy.lock().unwrap();
        if healthy {
            set.insert(addr);
        } else {
            set.remove(&addr);
        }
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let healthy = self.healthy.lock().unwrap().contains(&endpoint.addr);
        // 판정만 중요하므로 메시지는 고정
        ProbeResult {
            status: if healthy { ProbeStatus::Healthy } else { ProbeStatus::Unhealthy },
            message: "scripted".to_string(),
            timestamp: std::time::SystemTime::now(),
        }
    }
}

#[test]
fn test_hysteresis_requires_consecutive_successes() {
    let mut state = EndpointHealth::new();

    // 임계값 3: 성공 2번으로는 전환되지 않음
    assert_eq!(state.record(ProbeStatus::Healthy, 3, 3), None);
    assert_eq!(state.record(ProbeStatus::Healthy, 3, 3), None);
    assert!(!state.is_healthy());

    // 3번째 연속 성공에서 전환
    assert_eq!(state.record(ProbeStatus::Healthy, 3, 3), Some(true));
    assert!(state.is_healthy());
}

#[test]
fn test_hysteresis_failure_resets_success_streak() {
    let mut state = EndpointHealth::new();

    // 성공-성공-실패-성공 시퀀스는 연속 3회가 아님
    state.record(ProbeStatus::Healthy, 3, 3);
    state.record(ProbeStatus::Healthy, 3, 3);
    state.record(ProbeStatus::Unhealthy, 3, 3);
    assert_eq!(state.record(ProbeStatus::Healthy, 3, 3), None);
    assert!(!state.is_healthy());
}

#[test]
fn test_hysteresis_prevents_flapping() {
    let mut state = EndpointHealth::new();
    state.record(ProbeStatus::Healthy, 1, 3);
    assert!(state.is_healthy());

    // 실패 2번으로는 healthy 유지 (unhealthy_threshold=3)
    assert_eq!(state.record(ProbeStatus::Unhealthy, 1, 3), None);
    assert_eq!(state.record(ProbeStatus::Unhealthy, 1, 3), None);
    assert!(state.is_healthy());

    // 3번째 연속 실패에서 전환
    assert_eq!(state.record(ProbeStatus::Unhealthy, 1, 3), Some(false));
    assert!(!state.is_healthy());
}

#[tokio::test]
async fn test_unhealthy_endpoint_leaves_healthy_subset() {
    // 스펙 시나리오: E1이 3번 연속 실패하면 listHealthy(BE)는 {E2}만 반환
    let pool = make_pool(1, 3);
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    let e2 = Endpoint::new(addr("127.0.0.1:8081"));
    pool.add_endpoint(e1);
    pool.add_endpoint(e2);

    let probe = ScriptedProbe::new();
    probe.set_healthy(e1.addr, true);
    probe.set_healthy(e2.addr, true);

    let mut states: HashMap<SocketAddr, EndpointHealth> = HashMap::new();
    probe_cycle(&pool, &probe, &mut states).await;
    assert_eq!(pool.healthy_endpoints().len(), 2);

    probe.set_healthy(e1.addr, false);
    for _ in 0..2 {
        probe_cycle(&pool, &probe, &mut states).await;
        // 아직 임계값 미달: E1은 healthy 유지
        assert_eq!(pool.healthy_endpoints().len(), 2);
    }

    probe_cycle(&pool, &probe, &mut states).await;
    let healthy = pool.healthy_endpoints();
    assert_eq!(healthy.len(), 1);
    assert_eq!(healthy[0].addr, e2.addr);
}

#[tokio::test]
async fn test_reregistered_endpoint_must_repass_threshold() {
    let pool = make_pool(2, 3);
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    pool.add_endpoint(e1);

    let probe = ScriptedProbe::new();
    probe.set_healthy(e1.addr, true);

    let mut states: HashMap<SocketAddr, EndpointHealth> = HashMap::new();
    probe_cycle(&pool, &probe, &mut states).await;
    probe_cycle(&pool, &probe, &mut states).await;
    assert_eq!(pool.healthy_endpoints().len(), 1);

    // 해제 후 재등록: 전체 집합에는 돌아오지만 즉시 신뢰되지 않음
    pool.remove_endpoint(&e1.addr);
    assert!(pool.healthy_endpoints().is_empty());
    pool.add_endpoint(e1);

    probe_cycle(&pool, &probe, &mut states).await;
    assert!(
        pool.healthy_endpoints().is_empty(),
        "재등록된 엔드포인트는 임계값을 다시 통과해야 함"
    );

    probe_cycle(&pool, &probe, &mut states).await;
    assert_eq!(pool.healthy_endpoints().len(), 1);
}

#[tokio::test]
async fn test_fast_churn_between_cycles_drops_old_state() {
    // 해제와 재등록이 프로브 사이클 사이에 모두 일어나는 경우:
    // 멤버십만 보면 아무 일도 없었던 것처럼 보이지만, 이전의 healthy
    // 상태를 물려받으면 안 됨
    let pool = make_pool(2, 3);
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    pool.add_endpoint(e1);

    let probe = ScriptedProbe::new();
    probe.set_healthy(e1.addr, true);

    let mut states: HashMap<SocketAddr, EndpointHealth> = HashMap::new();
    probe_cycle(&pool, &probe, &mut states).await;
    probe_cycle(&pool, &probe, &mut states).await;
    assert_eq!(pool.healthy_endpoints().len(), 1);

    // 사이클이 돌지 않는 사이에 해제 + 재등록 (프로브는 계속 성공)
    pool.remove_endpoint(&e1.addr);
    pool.add_endpoint(e1);

    probe_cycle(&pool, &probe, &mut states).await;
    assert!(
        pool.healthy_endpoints().is_empty(),
        "사이클 사이에 교체된 엔드포인트가 이전 상태로 즉시 신뢰되면 안 됨"
    );

    probe_cycle(&pool, &probe, &mut states).await;
    assert_eq!(pool.healthy_endpoints().len(), 1, "임계값을 다시 통과하면 복귀해야 함");
}

#[tokio::test]
async fn test_probe_cycle_keeps_subset_invariant() {
    let pool = make_pool(1, 1);
    let e1 = Endpoint::new(addr("127.0.0.1:8080"));
    let e2 = Endpoint::new(addr("127.0.0.1:8081"));
    pool.add_endpoint(e1);
    pool.add_endpoint(e2);

    let probe = ScriptedProbe::new();
    probe.set_healthy(e1.addr, true);
    probe.set_healthy(e2.addr, true);

    let mut states: HashMap<SocketAddr, EndpointHealth> = HashMap::new();
    for cycle in 0..5 {
        if cycle == 2 {
            // 사이클 도중의 해제도 불변식을 깨지 않아야 함
            pool.remove_endpoint(&e1.addr);
        }
        probe_cycle(&pool, &probe, &mut states).await;

        let full = pool.endpoints();
        let healthy = pool.healthy_endpoints();
        assert!(
            healthy.iter().all(|h| full.iter().any(|f| f.addr == h.addr)),
            "사이클 {} 후 healthy ⊆ full 불변식 위반",
            cycle
        );
    }
}

#[tokio::test]
async fn test_tcp_probe_against_real_socket() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let live_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            if listener.accept().await.is_err() {
                break;
            }
        }
    });

    let probe = TcpProbe::new(None, Duration::from_secs(1));

    let result = probe.probe(&Endpoint::new(live_addr)).await;
    assert_eq!(result.status, ProbeStatus::Healthy, "열린 포트는 Healthy여야 함");

    // 닫힌 포트는 연결 실패 → Unhealthy (에러가 아니라 결과로 보고됨)
    let dead = Endpoint::new(addr("127.0.0.1:1"));
    let result = probe.probe(&dead).await;
    assert_eq!(result.status, ProbeStatus::Unhealthy);
}
