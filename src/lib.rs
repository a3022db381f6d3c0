//! L7 Gateway는 경로 기반 라우팅을 지원하는 경량 Layer-7 HTTP 라우터입니다.
//!
//! # 주요 기능
//!
//! - 우선순위와 구체성 기반의 결정적 경로 라우팅 (기본 풀 폴백 포함)
//! - 백엔드 풀 멤버십의 런타임 변경 (서비스 레지스트리)
//! - 히스테리시스 임계값을 가진 지속적 헬스 체크
//! - healthy 엔드포인트 간 라운드 로빈과 단일 대체 재시도
//!
//! # 라우팅 테이블
//!
//! ```
//! use l7_gateway::routing::{RoutingTable, RouteRule};
//!
//! let mut table = RoutingTable::new("FE");
//!
//! // /api 아래의 모든 경로를 BE 풀로 (PathPrefix 매칭 사용)
//! table.add_rule(RouteRule::new("/api/*", 123, "BE").unwrap());
//!
//! assert_eq!(table.resolve("/api/users"), "BE");
//! assert_eq!(table.resolve("/home"), "FE");
//! ```
//!
//! # 백엔드 풀과 레지스트리
//!
//! ```
//! use l7_gateway::pool::{BackendPool, Endpoint, HealthCheckConfig, Protocol, ServiceRegistry};
//!
//! let pool = BackendPool::new("BE", Protocol::Http, 80, HealthCheckConfig::default());
//! let registry = ServiceRegistry::new(vec![pool]);
//!
//! // 엔드포인트 등록 (헬스 체크 통과 전까지는 트래픽을 받지 않음)
//! let addr = "127.0.0.1:8080".parse().unwrap();
//! registry.register("BE", Endpoint::new(addr)).unwrap();
//! assert!(registry.list_healthy("BE").unwrap().is_empty());
//! ```

pub mod logging;
pub mod proxy;
pub mod routing;
pub mod pool;
pub mod health;
pub mod server;
pub mod settings;
