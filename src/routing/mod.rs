//! 경로 기반 라우팅을 위한 핵심 기능을 제공하는 모듈입니다.

mod error;
mod matcher;
mod rule;
mod table;

pub use error::{RoutingError, RoutingWarning};
pub use matcher::{PathMatcher, PathMatcherKind};
pub use rule::RouteRule;
pub use table::RoutingTable;
