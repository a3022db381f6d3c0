use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::{
    health::HealthMonitor,
    pool::ServiceRegistry,
    proxy::ProxyConfig,
    routing::RoutingTable,
    settings::Settings,
};
use super::{
    handler::RequestHandler,
    listener::ServerListener,
    Result,
};

/// 게이트웨이 구성 요소를 묶는 컨텍스트 객체입니다.
///
/// 설정에서 레지스트리와 라우팅 테이블을 만들고, 헬스 모니터와 리스너의
/// 수명을 관리합니다. 설정이 알 수 없는 풀을 참조하면 리스너가 트래픽을
/// 받기 전에 여기서 거부됩니다.
pub struct GatewayManager {
    pub settings: Settings,
    registry: Arc<ServiceRegistry>,
    routing_table: Arc<RoutingTable>,
}

impl GatewayManager {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate().map_err(|e| {
            error!(error = %e, "설정 검증 실패");
            e
        })?;

        // 1. 풀 생성과 시드 엔드포인트 등록
        let mut pools = Vec::with_capacity(settings.pools.len());
        for pool_settings in &settings.pools {
            pools.push(pool_settings.build()?);
        }
        let registry = Arc::new(ServiceRegistry::new(pools));

        // 2. 라우팅 테이블 구성
        let mut table = RoutingTable::new(settings.default_pool.clone());
        for route in &settings.routes {
            table.add_rule(route.build()?);
        }

        // 3. 테이블 검증. 모호한 규칙은 경고로만 보고됨
        let warnings = table.validate(&registry.pool_ids())?;
        info!(
            pools = settings.pools.len(),
            rules = table.rules().len(),
            warnings = warnings.len(),
            default_pool = %settings.default_pool,
            "게이트웨이 구성 완료"
        );

        Ok(Self {
            settings,
            registry,
            routing_table: Arc::new(table),
        })
    }

    pub fn registry(&self) -> Arc<ServiceRegistry> {
        self.registry.clone()
    }

    pub fn routing_table(&self) -> Arc<RoutingTable> {
        self.routing_table.clone()
    }

    /// 헬스 모니터를 띄우고 리스너 루프를 실행합니다.
    pub async fn run(self) -> Result<()> {
        let monitor = HealthMonitor::new(self.registry.clone());
        let monitor_handles = monitor.start();
        info!(tasks = monitor_handles.len(), "헬스 모니터 시작");

        let proxy_config = ProxyConfig::new(
            Duration::from_secs(self.settings.server.attempt_timeout),
            Duration::from_secs(self.settings.server.request_timeout),
        );
        let handler = Arc::new(RequestHandler::new(
            self.routing_table.clone(),
            self.registry.clone(),
            proxy_config,
        ));

        let listener = ServerListener::new(&self.settings.server).await?;
        let result = listener.run(handler).await;

        // 리스너가 끝나면 프로브 루프도 함께 정리
        for handle in monitor_handles {
            handle.abort();
        }
        result
    }
}
