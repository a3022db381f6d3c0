use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use serde::Deserialize;

use crate::pool::{BackendPool, Endpoint, HealthCheckConfig, HealthCheckKind, Protocol};
use super::SettingsError;

#[derive(Debug, Clone, Deserialize)]
pub struct HealthCheckSettings {
    /// 프로브 종류 (http 또는 tcp)
    #[serde(default = "default_check_type")]
    pub check_type: String,

    /// HTTP 프로브 경로
    #[serde(default = "default_check_path")]
    pub path: String,

    /// 프로브 대상 포트. 생략하면 엔드포인트 자신의 포트 사용
    pub port: Option<u16>,

    /// 프로브 프로토콜 (http/https)
    #[serde(default = "default_check_protocol")]
    pub protocol: String,

    /// 체크 간격 (초)
    #[serde(default = "default_check_interval")]
    pub interval: u64,

    /// 체크 타임아웃 (초)
    #[serde(default = "default_check_timeout")]
    pub timeout: u64,

    /// unhealthy → healthy 전환에 필요한 연속 성공 횟수
    #[serde(default = "default_healthy_threshold")]
    pub healthy_threshold: u32,

    /// healthy → unhealthy 전환에 필요한 연속 실패 횟수
    #[serde(default = "default_unhealthy_threshold")]
    pub unhealthy_threshold: u32,

    /// 성공으로 분류할 상태 코드 범위 (양끝 포함)
    #[serde(default = "default_status_min")]
    pub status_min: u16,

    #[serde(default = "default_status_max")]
    pub status_max: u16,
}

fn default_check_type() -> String { "http".to_string() }
fn default_check_path() -> String { "/".to_string() }
fn default_check_protocol() -> String { "http".to_string() }
fn default_check_interval() -> u64 { 30 }
fn default_check_timeout() -> u64 { 5 }
fn default_healthy_threshold() -> u32 { 2 }
fn default_unhealthy_threshold() -> u32 { 3 }
fn default_status_min() -> u16 { 200 }
fn default_status_max() -> u16 { 399 }

impl Default for HealthCheckSettings {
    fn default() -> Self {
        Self {
            check_type: default_check_type(),
            path: default_check_path(),
            port: None,
            protocol: default_check_protocol(),
            interval: default_check_interval(),
            timeout: default_check_timeout(),
            healthy_threshold: default_healthy_threshold(),
            unhealthy_threshold: default_unhealthy_threshold(),
            status_min: default_status_min(),
            status_max: default_status_max(),
        }
    }
}

impl HealthCheckSettings {
    pub fn validate(&self, pool_id: &str) -> Result<(), SettingsError> {
        if self.check_type != "http" && self.check_type != "tcp" {
            return Err(SettingsError::InvalidConfig(format!(
                "풀 {}: 알 수 없는 헬스 체크 종류 {}", pool_id, self.check_type
            )));
        }

        self.protocol.parse::<Protocol>().map_err(|reason| {
            SettingsError::InvalidConfig(format!("풀 {}: {}", pool_id, reason))
        })?;

        if self.interval == 0 || self.timeout == 0 {
            return Err(SettingsError::InvalidConfig(format!(
                "풀 {}: 헬스 체크 간격과 타임아웃은 0이 될 수 없습니다", pool_id
            )));
        }

        if self.healthy_threshold == 0 || self.unhealthy_threshold == 0 {
            return Err(SettingsError::InvalidConfig(format!(
                "풀 {}: 헬스 체크 임계값은 1 이상이어야 합니다", pool_id
            )));
        }

        if self.status_min > self.status_max {
            return Err(SettingsError::InvalidConfig(format!(
                "풀 {}: 상태 코드 범위가 뒤집혀 있습니다 ({}-{})",
                pool_id, self.status_min, self.status_max
            )));
        }

        Ok(())
    }

    pub fn to_config(&self) -> HealthCheckConfig {
        let kind = match self.check_type.as_str() {
            "tcp" => HealthCheckKind::Tcp,
            _ => HealthCheckKind::Http {
                protocol: self.protocol.parse().unwrap_or_default(),
                path: self.path.clone(),
                acceptable_statuses: (self.status_min, self.status_max),
            },
        };

        HealthCheckConfig {
            kind,
            port: self.port,
            interval: Duration::from_secs(self.interval),
            timeout: Duration::from_secs(self.timeout),
            healthy_threshold: self.healthy_threshold,
            unhealthy_threshold: self.unhealthy_threshold,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolSettings {
    /// 풀 식별자 (유일해야 함)
    pub id: String,

    /// 백엔드 프로토콜 (http/https)
    #[serde(default = "default_pool_protocol")]
    pub protocol: String,

    /// 전달 시 덮어쓰는 대상 포트
    pub target_port: u16,

    /// 시작 시점에 등록할 엔드포인트 ("host:port")
    #[serde(default)]
    pub endpoints: Vec<String>,

    #[serde(default)]
    pub health_check: HealthCheckSettings,
}

fn default_pool_protocol() -> String { "http".to_string() }

impl PoolSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.id.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "풀 식별자는 비어있을 수 없습니다".to_string(),
            ));
        }

        self.protocol.parse::<Protocol>().map_err(|reason| {
            SettingsError::InvalidConfig(format!("풀 {}: {}", self.id, reason))
        })?;

        if self.target_port == 0 {
            return Err(SettingsError::InvalidConfig(format!(
                "풀 {}: 대상 포트는 0이 될 수 없습니다", self.id
            )));
        }

        // 시드 엔드포인트 주소 파싱과 풀 내 유일성 검사
        let mut seen: HashSet<SocketAddr> = HashSet::new();
        for endpoint in &self.endpoints {
            let addr = endpoint.parse::<SocketAddr>().map_err(|e| {
                SettingsError::InvalidConfig(format!(
                    "풀 {}: 잘못된 엔드포인트 주소 {} ({})", self.id, endpoint, e
                ))
            })?;
            if !seen.insert(addr) {
                return Err(SettingsError::InvalidConfig(format!(
                    "풀 {}: 중복된 엔드포인트 주소 {}", self.id, addr
                )));
            }
        }

        self.health_check.validate(&self.id)
    }

    /// 설정에서 백엔드 풀을 생성하고 시드 엔드포인트를 등록합니다.
    ///
    /// `validate`를 통과한 설정만 넘어온다고 가정하지 않고 주소 파싱
    /// 실패는 다시 에러로 돌려줍니다.
    pub fn build(&self) -> Result<BackendPool, SettingsError> {
        let protocol: Protocol = self.protocol.parse().map_err(|reason: String| {
            SettingsError::InvalidConfig(format!("풀 {}: {}", self.id, reason))
        })?;

        let pool = BackendPool::new(
            self.id.clone(),
            protocol,
            self.target_port,
            self.health_check.to_config(),
        );

        for endpoint in &self.endpoints {
            let addr = endpoint.parse::<SocketAddr>().map_err(|e| {
                SettingsError::InvalidConfig(format!(
                    "풀 {}: 잘못된 엔드포인트 주소 {} ({})", self.id, endpoint, e
                ))
            })?;
            pool.add_endpoint(Endpoint::with_protocol(addr, protocol));
        }

        Ok(pool)
    }
}
