use serde::Deserialize;

use crate::routing::RouteRule;
use super::SettingsError;

#[derive(Debug, Clone, Deserialize)]
pub struct RouteSettings {
    /// 경로 패턴 (정확, '*' 접미사 접두, 디렉터리 스타일, '^' 정규식)
    pub pattern: String,

    /// 우선순위 (작을수록 먼저 평가, 기본값: 100)
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// 대상 풀 식별자
    pub pool: String,
}

fn default_priority() -> u32 { 100 }

impl RouteSettings {
    pub fn build(&self) -> Result<RouteRule, SettingsError> {
        RouteRule::new(&self.pattern, self.priority, self.pool.clone())
            .map_err(|e| SettingsError::InvalidConfig(e.to_string()))
    }
}
