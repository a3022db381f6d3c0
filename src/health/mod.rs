//! 엔드포인트 헬스 체크를 제공하는 모듈입니다.
//!
//! 프로브 결과는 저장될 뿐 요청 처리 경로로 전파되지 않으며, 모니터는
//! 풀의 healthy 부분집합만 갱신합니다 (전체 집합은 건드리지 않음).

mod probe;
mod monitor;

pub use probe::{HealthProbe, HttpProbe, TcpProbe, ProbeResult, ProbeStatus, probe_for};
pub use monitor::{EndpointHealth, HealthMonitor, probe_cycle};
