use serde::Deserialize;
use std::env;
use super::SettingsError;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerSettings {
    /// 리스너 바인드 주소 (기본값: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP 포트 (기본값: 80)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// 엔드포인트 한 곳에 대한 시도 하나의 타임아웃 (초, 기본값: 10)
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout: u64,

    /// 요청 전체의 시간 예산 (초, 기본값: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_bind_address() -> String { "0.0.0.0".to_string() }
fn default_http_port() -> u16 { 80 }
fn default_attempt_timeout() -> u64 { 10 }
fn default_request_timeout() -> u64 { 30 }

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            bind_address: parse_env_var("PROXY_BIND_ADDRESS", default_bind_address)?,
            http_port: parse_env_var("PROXY_HTTP_PORT", default_http_port)?,
            attempt_timeout: parse_env_var("PROXY_ATTEMPT_TIMEOUT", default_attempt_timeout)?,
            request_timeout: parse_env_var("PROXY_REQUEST_TIMEOUT", default_request_timeout)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.http_port == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "PROXY_HTTP_PORT".to_string(),
                value: self.http_port.to_string(),
                reason: "포트는 0이 될 수 없습니다".to_string(),
            });
        }

        if self.request_timeout == 0 || self.attempt_timeout == 0 {
            return Err(SettingsError::InvalidConfig(
                "타임아웃은 0이 될 수 없습니다".to_string(),
            ));
        }

        // 시도 타임아웃이 전체 예산보다 크면 재시도가 의미를 잃음
        if self.attempt_timeout > self.request_timeout {
            return Err(SettingsError::InvalidConfig(format!(
                "attempt_timeout({}초)이 request_timeout({}초)보다 큽니다",
                self.attempt_timeout, self.request_timeout
            )));
        }

        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            attempt_timeout: default_attempt_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}
