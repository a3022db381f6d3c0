use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::pool::endpoint::{Endpoint, Protocol};

/// 헬스 체크 프로브의 종류입니다.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthCheckKind {
    Http {
        protocol: Protocol,
        path: String,
        /// 성공으로 분류할 상태 코드 범위 (양끝 포함, 기본값 200-399)
        acceptable_statuses: (u16, u16),
    },
    Tcp,
}

/// 풀 단위로 공유되는 헬스 체크 사양입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheckConfig {
    pub kind: HealthCheckKind,
    /// 프로브 대상 포트. None이면 엔드포인트 자신의 포트를 사용
    pub port: Option<u16>,
    pub interval: Duration,
    pub timeout: Duration,
    /// unhealthy → healthy 전환에 필요한 연속 성공 횟수
    pub healthy_threshold: u32,
    /// healthy → unhealthy 전환에 필요한 연속 실패 횟수
    pub unhealthy_threshold: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            kind: HealthCheckKind::Http {
                protocol: Protocol::Http,
                path: "/".to_string(),
                acceptable_statuses: (200, 399),
            },
            port: None,
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            healthy_threshold: 2,
            unhealthy_threshold: 3,
        }
    }
}

/// 이름을 가진 백엔드 풀입니다.
///
/// 전체 엔드포인트 집합과 파생된 healthy 부분집합을 `Arc` 스냅샷으로
/// 보관합니다. 읽기 쪽은 짧은 락 안에서 `Arc`를 복제해 가므로 진행 중인
/// 요청은 이후의 등록/해제에 영향을 받지 않습니다 (graceful drain).
/// healthy 부분집합은 항상 전체 집합의 부분집합으로 유지됩니다.
#[derive(Debug)]
pub struct BackendPool {
    id: String,
    protocol: Protocol,
    target_port: u16,
    health_check: HealthCheckConfig,
    endpoints: RwLock<Arc<Vec<Endpoint>>>,
    healthy: RwLock<Arc<Vec<Endpoint>>>,
    // 헬스 모니터가 아직 확인하지 못한 해제 주소들. 같은 주소가 프로브
    // 사이클 사이에 해제 후 재등록되더라도 낡은 히스테리시스 상태를
    // 물려받지 않도록 기록을 남김
    removed: Mutex<HashSet<SocketAddr>>,
    current_index: AtomicUsize,
}

impl BackendPool {
    pub fn new(
        id: impl Into<String>,
        protocol: Protocol,
        target_port: u16,
        health_check: HealthCheckConfig,
    ) -> Self {
        Self {
            id: id.into(),
            protocol,
            target_port,
            health_check,
            endpoints: RwLock::new(Arc::new(Vec::new())),
            healthy: RwLock::new(Arc::new(Vec::new())),
            removed: Mutex::new(HashSet::new()),
            current_index: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn target_port(&self) -> u16 {
        self.target_port
    }

    pub fn health_check(&self) -> &HealthCheckConfig {
        &self.health_check
    }

    /// 엔드포인트를 전체 집합에 추가합니다. 같은 주소의 재등록은 무시됩니다.
    ///
    /// 새로 추가된 경우 true를 반환합니다. healthy 부분집합에는 들어가지
    /// 않으므로 헬스 체크 임계값을 통과하기 전까지는 선택되지 않습니다.
    pub fn add_endpoint(&self, endpoint: Endpoint) -> bool {
        let mut full = self.endpoints.write().unwrap();
        if full.iter().any(|e| e.addr == endpoint.addr) {
            return false;
        }
        let mut next = full.as_ref().clone();
        next.push(endpoint);
        *full = Arc::new(next);
        true
    }

    /// 엔드포인트를 전체 집합과 healthy 부분집합에서 즉시 제거합니다.
    ///
    /// 실제로 제거된 경우 true를 반환합니다. 이미 해당 엔드포인트를 선택한
    /// 진행 중 요청은 자신의 스냅샷으로 계속 진행됩니다. 해제 주소는
    /// `drain_removed`가 소비할 때까지 기록되므로, 같은 주소가 곧바로
    /// 재등록되어도 unhealthy에서 다시 시작합니다.
    pub fn remove_endpoint(&self, addr: &SocketAddr) -> bool {
        let removed = {
            let mut full = self.endpoints.write().unwrap();
            if !full.iter().any(|e| e.addr == *addr) {
                false
            } else {
                let next: Vec<Endpoint> = full.iter().filter(|e| e.addr != *addr).copied().collect();
                *full = Arc::new(next);
                true
            }
        };

        if removed {
            {
                let mut healthy = self.healthy.write().unwrap();
                if healthy.iter().any(|e| e.addr == *addr) {
                    let next: Vec<Endpoint> = healthy.iter().filter(|e| e.addr != *addr).copied().collect();
                    *healthy = Arc::new(next);
                }
            }
            self.removed.lock().unwrap().insert(*addr);
        }
        removed
    }

    /// 마지막 호출 이후 해제된 주소들을 반환하고 기록을 비웁니다.
    ///
    /// 헬스 모니터가 사이클 시작 시 호출해 해당 주소의 히스테리시스 상태를
    /// 폐기합니다. 해제와 재등록이 한 사이클 안에서 모두 일어나도 여기서
    /// 드러납니다.
    pub fn drain_removed(&self) -> Vec<SocketAddr> {
        self.removed.lock().unwrap().drain().collect()
    }

    /// 전체 엔드포인트 집합의 현재 스냅샷을 반환합니다.
    pub fn endpoints(&self) -> Arc<Vec<Endpoint>> {
        self.endpoints.read().unwrap().clone()
    }

    /// healthy 부분집합의 현재 스냅샷을 반환합니다. 비어 있을 수 있으며,
    /// 비어 있음은 "풀이 일시적으로 사용 불가"를 뜻하는 정상 상태입니다.
    pub fn healthy_endpoints(&self) -> Arc<Vec<Endpoint>> {
        self.healthy.read().unwrap().clone()
    }

    /// 헬스 모니터가 새로운 healthy 부분집합을 게시합니다.
    ///
    /// 게시 시점의 전체 집합과 교집합을 취하므로, 모니터가 낡은 멤버십을
    /// 기준으로 계산했더라도 healthy ⊆ full 불변식이 깨지지 않습니다.
    /// 교체는 Arc 단위라서 읽는 쪽이 부분적으로 갱신된 집합을 보는 일은
    /// 없습니다.
    pub fn publish_healthy(&self, healthy: Vec<Endpoint>) {
        let full = self.endpoints();
        let filtered: Vec<Endpoint> = healthy
            .into_iter()
            .filter(|e| full.iter().any(|f| f.addr == e.addr))
            .collect();
        *self.healthy.write().unwrap() = Arc::new(filtered);
    }

    /// 요청 하나를 위해 주 엔드포인트와 재시도용 대체 엔드포인트를
    /// 라운드 로빈으로 선택합니다.
    ///
    /// healthy 부분집합이 비어 있으면 None을 반환합니다. 대체 엔드포인트는
    /// 같은 스냅샷 안의 다른 주소이며, 후보가 하나뿐이면 None입니다.
    pub fn select_for_request(&self) -> Option<(Endpoint, Option<Endpoint>)> {
        let snapshot = self.healthy_endpoints();
        let len = snapshot.len();
        if len == 0 {
            return None;
        }

        let index = self.current_index.fetch_add(1, Ordering::Relaxed) % len;
        let primary = snapshot[index];
        let alternate = if len > 1 {
            Some(snapshot[(index + 1) % len])
        } else {
            None
        };
        Some((primary, alternate))
    }
}
