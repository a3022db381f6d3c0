use crate::routing::matcher::PathMatcher;
use crate::routing::error::RoutingError;

/// 경로 패턴과 우선순위를 백엔드 풀에 연결하는 라우팅 규칙입니다.
///
/// 우선순위는 숫자가 작을수록 먼저 평가됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRule {
    pub matcher: PathMatcher,
    pub priority: u32,
    pub pool_id: String,
}

impl RouteRule {
    pub fn new(pattern: &str, priority: u32, pool_id: impl Into<String>) -> Result<Self, RoutingError> {
        Ok(Self {
            matcher: PathMatcher::from_str(pattern)?,
            priority,
            pool_id: pool_id.into(),
        })
    }
}
