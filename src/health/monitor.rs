use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tracing::info;

use crate::pool::{BackendPool, Endpoint, ServiceRegistry};
use crate::health::probe::{HealthProbe, ProbeStatus, probe_for};

/// 엔드포인트 하나의 히스테리시스 상태입니다.
///
/// 연속된 동일 판정이 임계값에 도달해야만 상태가 전환되므로 일시적인
/// 프로브 결과 요동으로 healthy 부분집합이 출렁이지 않습니다. 새로
/// 등록된(또는 재등록된) 엔드포인트는 unhealthy에서 시작합니다.
#[derive(Debug)]
pub struct EndpointHealth {
    healthy: bool,
    consecutive_successes: u32,
    consecutive_failures: u32,
}

impl EndpointHealth {
    pub fn new() -> Self {
        Self {
            healthy: false,
            consecutive_successes: 0,
            consecutive_failures: 0,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// 프로브 판정 하나를 반영합니다.
    ///
    /// 상태 전환이 일어난 경우 새 상태를 `Some`으로 반환합니다.
    pub fn record(
        &mut self,
        status: ProbeStatus,
        healthy_threshold: u32,
        unhealthy_threshold: u32,
    ) -> Option<bool> {
        match status {
            ProbeStatus::Healthy => {
                self.consecutive_failures = 0;
                self.consecutive_successes += 1;
                if !self.healthy && self.consecutive_successes >= healthy_threshold {
                    self.healthy = true;
                    return Some(true);
                }
            }
            ProbeStatus::Unhealthy => {
                self.consecutive_successes = 0;
                self.consecutive_failures += 1;
                if self.healthy && self.consecutive_failures >= unhealthy_threshold {
                    self.healthy = false;
                    return Some(false);
                }
            }
        }
        None
    }
}

impl Default for EndpointHealth {
    fn default() -> Self {
        Self::new()
    }
}

/// 한 번의 프로브 사이클을 수행하고 풀의 healthy 부분집합을 갱신합니다.
///
/// 사이클 시작 시점의 멤버십 스냅샷에 대해 모든 엔드포인트를 동시에
/// 프로브합니다. 해제된 엔드포인트의 상태는 폐기되므로 같은 주소가
/// 다시 등록되면 임계값을 처음부터 다시 통과해야 합니다. 해제와 재등록이
/// 사이클 사이에 모두 일어난 경우도 풀의 해제 기록으로 감지합니다.
pub async fn probe_cycle(
    pool: &BackendPool,
    probe: &dyn HealthProbe,
    states: &mut HashMap<SocketAddr, EndpointHealth>,
) {
    // 멤버십 비교만으로는 사이클 사이의 해제+재등록을 볼 수 없으므로
    // 해제 기록을 먼저 반영
    for addr in pool.drain_removed() {
        states.remove(&addr);
    }

    let endpoints = pool.endpoints();
    states.retain(|addr, _| endpoints.iter().any(|e| e.addr == *addr));

    let config = pool.health_check();
    let results = join_all(endpoints.iter().map(|e| probe.probe(e))).await;

    for (endpoint, result) in endpoints.iter().zip(results) {
        let state = states.entry(endpoint.addr).or_default();
        if let Some(now_healthy) = state.record(
            result.status,
            config.healthy_threshold,
            config.unhealthy_threshold,
        ) {
            info!(
                pool = %pool.id(),
                endpoint = %endpoint,
                healthy = now_healthy,
                message = %result.message,
                "엔드포인트 상태 전환"
            );
        }
    }

    let healthy: Vec<Endpoint> = endpoints
        .iter()
        .filter(|e| states.get(&e.addr).map_or(false, |s| s.is_healthy()))
        .copied()
        .collect();
    pool.publish_healthy(healthy);
}

/// 모든 풀의 헬스 체크를 구동하는 모니터입니다.
///
/// 풀마다 독립된 태스크가 고정 간격으로 프로브 사이클을 돌리며, 풀 사이에
/// 순서 보장은 없습니다. 요청 라우팅은 풀의 스냅샷만 읽으므로 진행 중인
/// 프로브에 막히지 않습니다.
pub struct HealthMonitor {
    registry: Arc<ServiceRegistry>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// 풀마다 프로브 루프 태스크를 시작하고 핸들을 반환합니다.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.registry
            .pools()
            .map(|pool| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let probe = probe_for(pool.health_check());
                    let mut states: HashMap<SocketAddr, EndpointHealth> = HashMap::new();
                    let mut ticker = tokio::time::interval(pool.health_check().interval);
                    info!(
                        pool = %pool.id(),
                        interval = ?pool.health_check().interval,
                        "헬스 체크 루프 시작"
                    );
                    loop {
                        ticker.tick().await;
                        probe_cycle(&pool, probe.as_ref(), &mut states).await;
                    }
                })
            })
            .collect()
    }
}
