use std::sync::Arc;
use hyper::{Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use tracing::{debug, error};

use crate::{
    pool::ServiceRegistry,
    proxy::{self, ProxyConfig},
    routing::RoutingTable,
};

/// 요청 하나를 라우팅하고 전달하는 핸들러입니다.
///
/// 라우팅 테이블은 시작 시점에 고정되고, 풀 멤버십과 healthy 부분집합은
/// 레지스트리를 통해 계속 변합니다.
pub struct RequestHandler {
    routing_table: Arc<RoutingTable>,
    registry: Arc<ServiceRegistry>,
    proxy_config: ProxyConfig,
}

impl RequestHandler {
    pub fn new(
        routing_table: Arc<RoutingTable>,
        registry: Arc<ServiceRegistry>,
        proxy_config: ProxyConfig,
    ) -> Self {
        Self {
            routing_table,
            registry,
            proxy_config,
        }
    }

    pub async fn handle_request(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
        // 1. 경로 해석 (기본 풀 덕분에 항상 정확히 하나의 풀로 해석됨)
        let pool_id = self.routing_table.resolve(req.uri().path()).to_string();
        debug!(path = %req.uri().path(), pool = %pool_id, "풀 해석 완료");

        // 2. 풀 조회. 검증된 설정에서는 실패하지 않으며, 실패는 설정 오류
        let Some(pool) = self.registry.pool(&pool_id) else {
            error!(pool = %pool_id, "해석된 풀이 레지스트리에 없음");
            return Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::from(format!("Error: unknown pool {}", pool_id))))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error")))));
        };

        // 3. 프록시 요청
        match proxy::proxy_request(&self.proxy_config, pool, req).await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!(pool = %pool_id, error = %e, "프록시 요청 실패");
                Ok(proxy::error_response(&e))
            }
        }
    }

    pub async fn handle_connection<I>(&self, io: I) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(
                io,
                service_fn(|req| self.handle_request(req)),
            )
            .await
            .map_err(|e| e.into())
    }
}
