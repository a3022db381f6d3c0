use std::collections::HashSet;
use std::{env, fs, path::Path};
use serde::Deserialize;
use tracing::info;

mod server;
pub mod logging;
mod pool;
mod route;
mod error;

pub use server::ServerSettings;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use pool::{HealthCheckSettings, PoolSettings};
pub use route::RouteSettings;
pub use error::SettingsError;

pub type Result<T> = std::result::Result<T, SettingsError>;
pub use server::parse_env_var;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    /// 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 백엔드 풀 설정
    #[serde(default)]
    pub pools: Vec<PoolSettings>,

    /// 라우팅 규칙 설정
    #[serde(default)]
    pub routes: Vec<RouteSettings>,

    /// 기본(캐치올) 풀 식별자
    pub default_pool: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("PROXY_CONFIG_FILE") {
            Self::from_file(&config_path)
        } else {
            Self::from_env()
        }
    }

    /// 설정 파일을 읽습니다. 확장자에 따라 TOML 또는 JSON으로 파싱합니다.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = fs::read_to_string(path_ref).map_err(|e| SettingsError::FileError {
            path: path_ref.to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = if path_ref.extension().map_or(false, |ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| SettingsError::JsonParseError { source: e })?
        } else {
            toml::from_str(&content)
                .map_err(|e| SettingsError::TomlParseError { source: e })?
        };

        settings.validate()?;
        info!(
            path = %path_ref.display(),
            pools = settings.pools.len(),
            routes = settings.routes.len(),
            "설정 파일 로드"
        );
        Ok(settings)
    }

    /// 환경 변수에서 최소 구성을 만듭니다.
    ///
    /// 파일 없이 기동할 때는 PROXY_DEFAULT_POOL 이름의 풀 하나와
    /// PROXY_TARGET_PORT 대상 포트만으로 시작하고, 멤버십은 레지스트리
    /// API로 이후에 채워집니다.
    pub fn from_env() -> Result<Self> {
        let default_pool: String = parse_env_var("PROXY_DEFAULT_POOL", || "default".to_string())?;
        let target_port: u16 = parse_env_var("PROXY_TARGET_PORT", || 80u16)?;

        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            pools: vec![PoolSettings {
                id: default_pool.clone(),
                protocol: "http".to_string(),
                target_port,
                endpoints: Vec::new(),
                health_check: HealthCheckSettings::default(),
            }],
            routes: Vec::new(),
            default_pool,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    ///
    /// 풀을 참조하는 모든 곳(기본 풀, 라우팅 규칙)이 실제 존재하는 풀을
    /// 가리키는지 여기서 확인합니다. 위반은 리스너가 트래픽을 받기 전에
    /// 거부됩니다.
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;

        if self.pools.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "최소 한 개의 풀이 필요합니다".to_string(),
            ));
        }

        let mut pool_ids: HashSet<&str> = HashSet::new();
        for pool in &self.pools {
            pool.validate()?;
            if !pool_ids.insert(&pool.id) {
                return Err(SettingsError::InvalidConfig(format!(
                    "중복된 풀 식별자: {}", pool.id
                )));
            }
        }

        if !pool_ids.contains(self.default_pool.as_str()) {
            return Err(SettingsError::UnknownPool {
                pool_id: self.default_pool.clone(),
                referenced_by: "default_pool".to_string(),
            });
        }

        for route in &self.routes {
            route.build()?;
            if !pool_ids.contains(route.pool.as_str()) {
                return Err(SettingsError::UnknownPool {
                    pool_id: route.pool.clone(),
                    referenced_by: format!("라우팅 규칙 {}", route.pattern),
                });
            }
        }

        Ok(())
    }
}
