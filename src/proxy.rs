use std::fmt;
use std::time::{Duration, Instant};
use hyper::{Request, Response, StatusCode, Uri};
use hyper::body::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tokio::time::timeout;
use uuid::Uuid;
use tracing::{info, warn};

use crate::pool::{BackendPool, Endpoint};
use crate::logging::{RequestLog, log_request};

/// 백엔드 전달 단계에서 발생하는 에러입니다.
///
/// 내부 에러 타입은 라우터 경계에서 모두 HTTP 상태 코드로 변환되며
/// 호출자에게 그대로 노출되지 않습니다.
#[derive(Debug)]
pub enum ProxyError {
    /// 풀의 healthy 부분집합이 비어 있음 (503)
    NoHealthyBackend {
        pool_id: String,
    },
    /// 선택된 엔드포인트와의 연결/프로토콜 실패, 대체 엔드포인트 재시도 후에도 실패 (502)
    BackendUnavailable {
        pool_id: String,
        reason: String,
    },
    /// 요청 전체 시간 예산 초과 (504). 중복 부작용 위험 때문에 재시도하지 않음
    Timeout {
        pool_id: String,
        elapsed: Duration,
    },
    /// 인바운드 요청을 전달용 요청으로 변환하지 못함 (400)
    RequestBuild {
        reason: String,
    },
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::NoHealthyBackend { pool_id } =>
                write!(f, "풀 {}에 healthy 엔드포인트가 없음", pool_id),
            ProxyError::BackendUnavailable { pool_id, reason } =>
                write!(f, "풀 {}의 백엔드에 연결할 수 없음: {}", pool_id, reason),
            ProxyError::Timeout { pool_id, elapsed } =>
                write!(f, "풀 {} 요청 시간 초과 ({:?})", pool_id, elapsed),
            ProxyError::RequestBuild { reason } =>
                write!(f, "전달용 요청 생성 실패: {}", reason),
        }
    }
}

impl std::error::Error for ProxyError {}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoHealthyBackend { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::BackendUnavailable { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::RequestBuild { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

/// 에러를 합성된 HTTP 응답으로 변환합니다.
pub fn error_response(error: &ProxyError) -> Response<Full<Bytes>> {
    build_error_response(error.status(), format!("Error: {}", error))
}

// 프록시 요청을 위한 불변 설정 구조체
#[derive(Clone)]
pub struct ProxyConfig {
    client: legacy::Client<HttpConnector, Full<Bytes>>,
    /// 엔드포인트 한 곳에 대한 시도 하나의 시간 제한
    attempt_timeout: Duration,
    /// 요청 전체(재시도 포함)의 시간 예산
    request_timeout: Duration,
}

impl ProxyConfig {
    pub fn new(attempt_timeout: Duration, request_timeout: Duration) -> Self {
        let connector = HttpConnector::new();
        let client = legacy::Client::builder(TokioExecutor::new())
            .build::<_, Full<Bytes>>(connector);

        Self {
            client,
            attempt_timeout,
            request_timeout,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(30))
    }
}

/// 요청 하나를 풀의 healthy 엔드포인트로 전달합니다.
///
/// 라운드 로빈으로 주 엔드포인트를 고르고, 연결 실패나 시도 시간 초과 시
/// 같은 풀의 대체 엔드포인트 정확히 한 곳에만 재시도합니다. 전체 시간
/// 예산을 넘기면 즉시 `Timeout`으로 중단하며 재시도하지 않습니다.
/// 성공한 백엔드 응답은 상태/헤더/본문 그대로 반환됩니다.
pub async fn proxy_request<B>(
    config: &ProxyConfig,
    pool: &BackendPool,
    req: Request<B>,
) -> Result<Response<Full<Bytes>>, ProxyError>
where
    B: hyper::body::Body,
    B::Error: fmt::Display,
{
    let request_id = Uuid::new_v4().to_string();
    let start_time = Instant::now();
    let mut log = RequestLog::new(request_id);
    log.with_request(&req);
    log.with_pool(pool.id());

    let result = match timeout(
        config.request_timeout,
        forward_with_retry(config, pool, req, &mut log),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(ProxyError::Timeout {
            pool_id: pool.id().to_string(),
            elapsed: start_time.elapsed(),
        }),
    };

    match &result {
        Ok(response) => log.with_response(response.status()),
        Err(e) => log.with_error(e),
    }
    log.duration_ms = start_time.elapsed().as_millis() as u64;
    log_request(&log);

    result
}

async fn forward_with_retry<B>(
    config: &ProxyConfig,
    pool: &BackendPool,
    req: Request<B>,
    log: &mut RequestLog,
) -> Result<Response<Full<Bytes>>, ProxyError>
where
    B: hyper::body::Body,
    B::Error: fmt::Display,
{
    let (primary, alternate) = pool
        .select_for_request()
        .ok_or_else(|| ProxyError::NoHealthyBackend {
            pool_id: pool.id().to_string(),
        })?;

    // 재시도에서 본문을 다시 보낼 수 있도록 한 번만 버퍼링
    let (parts, body) = req.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| ProxyError::RequestBuild {
            reason: format!("요청 본문 읽기 실패: {}", e),
        })?
        .to_bytes();

    log.with_backend(primary.addr);
    info!(pool = %pool.id(), backend = %primary, "백엔드로 요청 전달");

    let first_failure = match attempt(config, pool, &primary, &parts, body.clone()).await {
        Ok(response) => return Ok(response),
        Err(reason) => reason,
    };

    // 같은 풀의 대체 엔드포인트 한 곳에만 재시도. 풀 간 재시도는 없음
    let Some(alternate) = alternate else {
        return Err(ProxyError::BackendUnavailable {
            pool_id: pool.id().to_string(),
            reason: first_failure,
        });
    };

    warn!(
        pool = %pool.id(),
        failed = %primary,
        alternate = %alternate,
        reason = %first_failure,
        "대체 엔드포인트로 재시도"
    );
    log.with_backend(alternate.addr);

    attempt(config, pool, &alternate, &parts, body)
        .await
        .map_err(|second_failure| ProxyError::BackendUnavailable {
            pool_id: pool.id().to_string(),
            reason: format!("{} / 재시도: {}", first_failure, second_failure),
        })
}

// 엔드포인트 한 곳에 대한 단일 시도. 실패 사유를 문자열로 반환
async fn attempt(
    config: &ProxyConfig,
    pool: &BackendPool,
    endpoint: &Endpoint,
    parts: &hyper::http::request::Parts,
    body: Bytes,
) -> Result<Response<Full<Bytes>>, String> {
    let proxied_req = build_proxied_request(pool, endpoint, parts, body)?;

    match timeout(config.attempt_timeout, config.client.request(proxied_req)).await {
        Ok(Ok(response)) => {
            let (parts, body) = response.into_parts();
            match body.collect().await {
                Ok(collected) => {
                    let bytes = collected.to_bytes();
                    Ok(Response::from_parts(parts, Full::new(bytes)))
                }
                Err(e) => Err(format!("응답 본문 수집 실패: {}", e)),
            }
        }
        Ok(Err(e)) => Err(format!("백엔드 요청 실패: {}", e)),
        Err(_) => Err(format!("시도 타임아웃 ({:?})", config.attempt_timeout)),
    }
}

// 대상 포트는 풀의 target_port로 덮어쓰고 메서드/헤더/본문은 원본 유지
fn build_proxied_request(
    pool: &BackendPool,
    endpoint: &Endpoint,
    parts: &hyper::http::request::Parts,
    body: Bytes,
) -> Result<Request<Full<Bytes>>, String> {
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri: Uri = format!(
        "http://{}:{}{}",
        endpoint.addr.ip(),
        pool.target_port(),
        path_and_query
    )
    .parse()
    .map_err(|e| format!("백엔드 URI 생성 실패: {}", e))?;

    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        *headers = parts.headers.clone();
    }
    builder
        .body(Full::new(body))
        .map_err(|e| format!("요청 생성 실패: {}", e))
}

fn build_error_response(status: StatusCode, message: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(message)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}
