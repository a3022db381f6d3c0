use tracing::{error, info};

use l7_gateway::logging::init_logging;
use l7_gateway::server::GatewayManager;
use l7_gateway::settings::Settings;

#[tokio::main]
async fn main() {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    // 파일 출력일 때 가드를 프로세스 종료까지 유지
    let _log_guard = init_logging(&settings.logging);

    let manager = match GatewayManager::new(settings) {
        Ok(manager) => manager,
        Err(e) => {
            error!(error = %e, "게이트웨이 초기화 실패");
            std::process::exit(1);
        }
    };

    info!("게이트웨이 시작");
    if let Err(e) = manager.run().await {
        error!(error = %e, "게이트웨이 실행 실패");
        std::process::exit(1);
    }
}
