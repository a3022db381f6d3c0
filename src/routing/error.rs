use std::fmt;

/// 라우팅 관련 에러를 표현하는 열거형입니다.
#[derive(Debug, PartialEq)]
pub enum RoutingError {
    /// 잘못된 경로 패턴
    InvalidPathPattern {
        pattern: String,
        reason: String,
    },
    /// 라우팅 규칙이 존재하지 않는 풀을 참조함
    UnknownPool {
        pool_id: String,
        known_pools: Vec<String>,
    },
    /// 기본 풀이 존재하지 않는 풀을 참조함
    UnknownDefaultPool {
        pool_id: String,
        known_pools: Vec<String>,
    },
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::InvalidPathPattern { pattern, reason } =>
                write!(f, "잘못된 경로 패턴: {} ({})", pattern, reason),
            RoutingError::UnknownPool { pool_id, known_pools } =>
                write!(f, "라우팅 규칙이 알 수 없는 풀 {}을 참조함 (등록된 풀: {:?})", pool_id, known_pools),
            RoutingError::UnknownDefaultPool { pool_id, known_pools } =>
                write!(f, "기본 풀 {}이 등록되지 않음 (등록된 풀: {:?})", pool_id, known_pools),
        }
    }
}

impl std::error::Error for RoutingError {}

/// 설정 검증 시 보고되는 경고입니다. 라우팅 자체는 결정적으로 동작합니다.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingWarning {
    /// 동일 우선순위, 동일 구체성의 패턴이 겹침 (먼저 등록된 규칙이 선택됨)
    AmbiguousRules {
        first_pattern: String,
        second_pattern: String,
        priority: u32,
    },
}

impl fmt::Display for RoutingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingWarning::AmbiguousRules { first_pattern, second_pattern, priority } =>
                write!(
                    f,
                    "우선순위 {}에서 패턴 {}과 {}의 구체성이 같음 (먼저 등록된 규칙이 우선함)",
                    priority, first_pattern, second_pattern
                ),
        }
    }
}
