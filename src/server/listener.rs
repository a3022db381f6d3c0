use std::sync::Arc;
use tokio::net::TcpListener;
use hyper_util::rt::TokioIo;
use tracing::{error, info};

use crate::settings::ServerSettings;
use super::handler::RequestHandler;
use super::Result;

/// 인바운드 연결을 받아들이는 리스너입니다.
///
/// 시작 시 한 번 바인드되고 프로세스가 끝날 때까지 살아 있습니다.
pub struct ServerListener {
    http_listener: TcpListener,
}

impl ServerListener {
    pub async fn new(settings: &ServerSettings) -> Result<Self> {
        let bind_addr = format!("{}:{}", settings.bind_address, settings.http_port);
        let http_listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| {
                error!(error = %e, addr = %bind_addr, "HTTP 포트 바인딩 실패");
                e
            })?;

        info!(addr = %bind_addr, "HTTP 리스너 시작");

        Ok(Self { http_listener })
    }

    /// 리스너가 실제로 바인드된 주소를 반환합니다. (포트 0 바인드 시 사용)
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.http_listener.local_addr()?)
    }

    pub async fn run(self, handler: Arc<RequestHandler>) -> Result<()> {
        loop {
            match self.http_listener.accept().await {
                Ok((stream, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        if let Err(err) = handler.handle_connection(io).await {
                            error!(error = %err, "HTTP 연결 처리 실패");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "HTTP 연결 수락 실패");
                }
            }
        }
    }
}
