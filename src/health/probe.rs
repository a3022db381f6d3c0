use std::time::{Duration, SystemTime};
use async_trait::async_trait;
use hyper::StatusCode;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use http_body_util::Empty;
use bytes::Bytes;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::pool::{Endpoint, HealthCheckConfig, HealthCheckKind};

/// 단일 프로브의 판정입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug)]
pub struct ProbeResult {
    pub status: ProbeStatus,
    pub message: String,
    pub timestamp: SystemTime,
}

impl ProbeResult {
    fn healthy(message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Healthy,
            message: message.into(),
            timestamp: SystemTime::now(),
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Unhealthy,
            message: message.into(),
            timestamp: SystemTime::now(),
        }
    }
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// 엔드포인트 하나에 프로브를 수행합니다.
    ///
    /// 타임아웃을 포함한 모든 실패는 결과로만 보고되고 에러로 올라가지
    /// 않습니다.
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;
}

/// HTTP 헬스 프로브
pub struct HttpProbe {
    client: Client<HttpConnector, Empty<Bytes>>,
    path: String,
    port: Option<u16>,
    acceptable_statuses: (u16, u16),
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(
        path: impl Into<String>,
        port: Option<u16>,
        acceptable_statuses: (u16, u16),
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
            path: path.into(),
            port,
            acceptable_statuses,
            timeout,
        }
    }

    fn is_acceptable(&self, status: StatusCode) -> bool {
        let code = status.as_u16();
        self.acceptable_statuses.0 <= code && code <= self.acceptable_statuses.1
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let port = self.port.unwrap_or(endpoint.addr.port());
        let url = format!("http://{}:{}{}", endpoint.addr.ip(), port, self.path);
        debug!(url = %url, "HTTP 헬스 프로브 시작");

        let request = match hyper::Request::builder()
            .method(hyper::Method::GET)
            .uri(&url)
            .body(Empty::<Bytes>::new())
        {
            Ok(request) => request,
            Err(e) => return ProbeResult::unhealthy(format!("프로브 요청 생성 실패: {}", e)),
        };

        match timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if self.is_acceptable(status) {
                    ProbeResult::healthy(format!("HTTP {} 응답 성공", status))
                } else {
                    ProbeResult::unhealthy(format!(
                        "허용 범위 밖의 상태 코드: {} (허용 {}-{})",
                        status, self.acceptable_statuses.0, self.acceptable_statuses.1
                    ))
                }
            }
            Ok(Err(e)) => ProbeResult::unhealthy(format!("프로브 요청 실패: {}", e)),
            Err(_) => ProbeResult::unhealthy(format!("타임아웃 ({:?})", self.timeout)),
        }
    }
}

/// TCP 연결 헬스 프로브
pub struct TcpProbe {
    port: Option<u16>,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(port: Option<u16>, timeout: Duration) -> Self {
        Self { port, timeout }
    }
}

#[async_trait]
impl HealthProbe for TcpProbe {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let addr = std::net::SocketAddr::new(
            endpoint.addr.ip(),
            self.port.unwrap_or(endpoint.addr.port()),
        );
        debug!(addr = %addr, "TCP 헬스 프로브 시작");

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => ProbeResult::healthy(format!("TCP 연결 성공: {}", addr)),
            Ok(Err(e)) => ProbeResult::unhealthy(format!("TCP 연결 실패: {}", e)),
            Err(_) => ProbeResult::unhealthy(format!("타임아웃 ({:?})", self.timeout)),
        }
    }
}

/// 풀의 헬스 체크 사양에 맞는 프로브를 생성합니다.
pub fn probe_for(config: &HealthCheckConfig) -> Box<dyn HealthProbe> {
    match &config.kind {
        HealthCheckKind::Http { path, acceptable_statuses, .. } => Box::new(HttpProbe::new(
            path.clone(),
            config.port,
            *acceptable_statuses,
            config.timeout,
        )),
        HealthCheckKind::Tcp => Box::new(TcpProbe::new(config.port, config.timeout)),
    }
}
