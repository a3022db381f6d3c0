use std::fmt;

/// 서비스 레지스트리 관련 에러를 표현하는 열거형입니다.
#[derive(Debug, PartialEq)]
pub enum RegistryError {
    /// 알 수 없는 풀 식별자
    InvalidPool {
        pool_id: String,
        known_pools: Vec<String>,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidPool { pool_id, known_pools } =>
                write!(f, "알 수 없는 풀: {} (등록된 풀: {:?})", pool_id, known_pools),
        }
    }
}

impl std::error::Error for RegistryError {}
