//! 백엔드 풀과 서비스 레지스트리를 제공하는 모듈입니다.

mod endpoint;
mod backend;
mod registry;
mod error;

pub use endpoint::{Endpoint, Protocol};
pub use backend::{BackendPool, HealthCheckConfig, HealthCheckKind};
pub use registry::ServiceRegistry;
pub use error::RegistryError;
