use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::pool::backend::BackendPool;
use crate::pool::endpoint::Endpoint;
use crate::pool::error::RegistryError;

/// 백엔드 서비스 멤버십 변경을 받아들이는 서비스 레지스트리입니다.
///
/// 풀 집합 자체는 설정 시점에 고정되고, 멤버십은 풀 내부의 스냅샷 교체로
/// 변하므로 등록/해제가 요청 라우팅을 막지 않습니다. 풀은 명시적으로
/// 해체되기 전까지 제거되지 않습니다.
#[derive(Debug)]
pub struct ServiceRegistry {
    pools: HashMap<String, Arc<BackendPool>>,
}

impl ServiceRegistry {
    pub fn new(pools: impl IntoIterator<Item = BackendPool>) -> Self {
        Self {
            pools: pools
                .into_iter()
                .map(|p| (p.id().to_string(), Arc::new(p)))
                .collect(),
        }
    }

    pub fn pool(&self, pool_id: &str) -> Option<&Arc<BackendPool>> {
        self.pools.get(pool_id)
    }

    pub fn pools(&self) -> impl Iterator<Item = &Arc<BackendPool>> {
        self.pools.values()
    }

    pub fn pool_ids(&self) -> HashSet<String> {
        self.pools.keys().cloned().collect()
    }

    fn get(&self, pool_id: &str) -> Result<&Arc<BackendPool>, RegistryError> {
        self.pools.get(pool_id).ok_or_else(|| RegistryError::InvalidPool {
            pool_id: pool_id.to_string(),
            known_pools: self.sorted_ids(),
        })
    }

    /// 엔드포인트를 풀에 등록합니다. 같은 주소의 재등록은 no-op입니다.
    ///
    /// 등록 직후에는 healthy 부분집합에 포함되지 않으며, 헬스 체크의
    /// 연속 성공 임계값을 통과한 뒤에야 트래픽을 받습니다.
    pub fn register(&self, pool_id: &str, endpoint: Endpoint) -> Result<(), RegistryError> {
        let pool = self.get(pool_id)?;
        if pool.add_endpoint(endpoint) {
            info!(pool = %pool_id, endpoint = %endpoint, "엔드포인트 등록");
        } else {
            debug!(pool = %pool_id, endpoint = %endpoint, "이미 등록된 엔드포인트");
        }
        Ok(())
    }

    /// 엔드포인트를 풀에서 해제합니다. 존재하지 않는 주소의 해제는 no-op입니다.
    ///
    /// 전체 집합과 healthy 부분집합에서 즉시 제거되지만, 이미 이 엔드포인트를
    /// 선택한 진행 중 요청은 완료까지 허용됩니다.
    pub fn deregister(&self, pool_id: &str, addr: &SocketAddr) -> Result<(), RegistryError> {
        let pool = self.get(pool_id)?;
        if pool.remove_endpoint(addr) {
            info!(pool = %pool_id, endpoint = %addr, "엔드포인트 해제");
        } else {
            debug!(pool = %pool_id, endpoint = %addr, "등록되지 않은 엔드포인트 해제 요청");
        }
        Ok(())
    }

    /// 현재 healthy 부분집합의 스냅샷을 반환합니다.
    ///
    /// 빈 목록은 에러가 아니라 "풀이 일시적으로 사용 불가"라는 뜻입니다.
    pub fn list_healthy(&self, pool_id: &str) -> Result<Arc<Vec<Endpoint>>, RegistryError> {
        Ok(self.get(pool_id)?.healthy_endpoints())
    }

    fn sorted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pools.keys().cloned().collect();
        ids.sort();
        ids
    }
}
