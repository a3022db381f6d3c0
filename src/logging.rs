use std::path::Path;
use tracing::{info, warn, error, Level, span};
use tracing_subscriber::EnvFilter;
use tracing_appender::non_blocking::WorkerGuard;

use crate::settings::{LogFormat, LogOutput, LogSettings};

/// 로깅 서브스크라이버를 초기화합니다.
///
/// 파일 출력일 때는 non-blocking 어펜더의 가드를 반환하므로, 호출자는
/// 프로세스가 끝날 때까지 가드를 유지해야 버퍼가 유실되지 않습니다.
pub fn init_logging(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env()
        .add_directive(settings.level().into())
        .add_directive("l7_gateway=debug".parse().unwrap());

    match &settings.output {
        LogOutput::Stdout => {
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);
            match settings.format {
                LogFormat::Text => builder.init(),
                LogFormat::Json => builder.json().init(),
            }
            None
        }
        LogOutput::File(path) => {
            let path = Path::new(path);
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "l7_gateway.log".to_string());
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer);
            match settings.format {
                LogFormat::Text => builder.init(),
                LogFormat::Json => builder.json().init(),
            }
            Some(guard)
        }
    }
}

/// 요청 하나의 관측 기록입니다.
///
/// 해석된 풀, 선택된 엔드포인트, 최종 상태를 외부 로깅 수집기가 쓸 수
/// 있는 형태로 남깁니다.
#[derive(Debug)]
pub struct RequestLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub pool_id: Option<String>,
    pub status_code: u16,
    pub duration_ms: u64,
    pub backend_address: Option<String>,
    pub error: Option<String>,
}

impl RequestLog {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            method: String::new(),
            path: String::new(),
            pool_id: None,
            status_code: 0,
            duration_ms: 0,
            backend_address: None,
            error: None,
        }
    }

    pub fn with_request<B>(&mut self, req: &hyper::Request<B>) {
        self.method = req.method().to_string();
        self.path = req.uri().path().to_string();

        info!(
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            "Received request"
        );
    }

    pub fn with_pool(&mut self, pool_id: &str) {
        self.pool_id = Some(pool_id.to_string());
        info!(
            request_id = %self.request_id,
            pool = %pool_id,
            "Resolved pool"
        );
    }

    pub fn with_response(&mut self, status: hyper::StatusCode) {
        self.status_code = status.as_u16();
        info!(
            request_id = %self.request_id,
            status = %self.status_code,
            "Response status set"
        );
    }

    pub fn with_backend(&mut self, addr: std::net::SocketAddr) {
        self.backend_address = Some(addr.to_string());
        info!(
            request_id = %self.request_id,
            backend = %addr,
            "Selected backend"
        );
    }

    pub fn with_error(&mut self, error: impl std::fmt::Display) {
        let error_msg = error.to_string();
        error!(
            request_id = %self.request_id,
            error = %error_msg,
            "Request error occurred"
        );
        self.error = Some(error_msg);
    }
}

pub fn log_request(log: &RequestLog) {
    let level = if log.error.is_some() {
        Level::ERROR
    } else if log.status_code >= 400 {
        Level::WARN
    } else {
        Level::INFO
    };

    let span = span!(
        Level::INFO,
        "request",
        request_id = %log.request_id,
        method = %log.method,
        path = %log.path,
        pool = ?log.pool_id,
        status = %log.status_code,
        duration_ms = %log.duration_ms
    );
    let _enter = span.enter();

    match level {
        Level::ERROR => error!(
            backend = ?log.backend_address,
            error = ?log.error,
            "Request failed"
        ),
        Level::WARN => warn!(
            backend = ?log.backend_address,
            "Request completed with warning"
        ),
        _ => info!(
            backend = ?log.backend_address,
            "Request completed successfully"
        ),
    }
}
