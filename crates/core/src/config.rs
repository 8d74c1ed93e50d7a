//! 설정 관리 — synwall.toml 파싱 및 런타임 설정
//!
//! [`SynwallConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SYNWALL_FILTER_SYN_THRESHOLD=10` 형식)
//! 3. 설정 파일 (`synwall.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), synwall_core::error::SynwallError> {
//! use synwall_core::config::SynwallConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SynwallConfig::load("synwall.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SynwallConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SynwallError};

/// Synwall 통합 설정
///
/// `synwall.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynwallConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 필터 엔진 설정
    #[serde(default)]
    pub filter: FilterConfig,
    /// 메트릭 샘플러 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Prometheus 익스포트 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl SynwallConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SynwallError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SynwallError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SynwallError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SynwallError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SynwallError> {
        toml::from_str(toml_str).map_err(|e| {
            SynwallError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SYNWALL_{SECTION}_{FIELD}`
    /// 예: `SYNWALL_FILTER_SYN_THRESHOLD=20`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SYNWALL_GENERAL_LOG_LEVEL");
        override_log_format(&mut self.general.log_format, "SYNWALL_GENERAL_LOG_FORMAT");

        // Filter
        override_u64(&mut self.filter.window_secs, "SYNWALL_FILTER_WINDOW_SECS");
        override_u64(
            &mut self.filter.syn_threshold,
            "SYNWALL_FILTER_SYN_THRESHOLD",
        );
        override_usize(
            &mut self.filter.flow_capacity,
            "SYNWALL_FILTER_FLOW_CAPACITY",
        );
        override_block_policy(
            &mut self.filter.block_policy,
            "SYNWALL_FILTER_BLOCK_POLICY",
        );
        override_u64(
            &mut self.filter.block_expiry_secs,
            "SYNWALL_FILTER_BLOCK_EXPIRY_SECS",
        );

        // Monitor
        override_u64(
            &mut self.monitor.sample_interval_secs,
            "SYNWALL_MONITOR_SAMPLE_INTERVAL_SECS",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "SYNWALL_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "SYNWALL_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "SYNWALL_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SynwallError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format은 enum이라 파싱 단계에서 이미 닫혀 있다

        // 윈도우/임계값은 0이면 모든 SYN이 차단되거나 나눗셈이 무의미해짐
        if self.filter.window_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "filter.window_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }
        if self.filter.syn_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "filter.syn_threshold".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }
        if self.filter.flow_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "filter.flow_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.monitor.sample_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.sample_interval_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식
    pub log_format: LogFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: LogFormat::Json,
        }
    }
}

/// 로그 출력 형식
///
/// 타입 수준에서 닫혀 있으므로 알 수 없는 형식은 TOML 파싱 단계에서
/// 거부됩니다. CLI/환경변수 문자열은 [`FromStr`](std::str::FromStr)로
/// 같은 검증을 거칩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 머신 파싱용 JSON 라인 (프로덕션 기본)
    #[default]
    Json,
    /// 사람이 읽는 출력 (개발용)
    Pretty,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("unknown log format '{s}', expected 'json' or 'pretty'"),
            }),
        }
    }
}

/// 차단 정책 변형
///
/// 임계값 초과 시 출발지를 어떻게 다룰지 결정합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockPolicy {
    /// 열려 있는 윈도우가 끝날 때까지만 차단 — 윈도우가 만료되면
    /// 새 카운트로 재입장. 별도 차단 플래그 없이 윈도우/카운트
    /// 메커니즘 자체가 집행 수단입니다.
    #[default]
    Transient,
    /// 임계값을 넘는 즉시 출발지를 차단 상태로 표시 — 이후의 pure SYN은
    /// 윈도우 로직을 거치지 않고 fast path에서 차단됩니다.
    /// `block_expiry_secs`로 만료를 설정하지 않으면 프로세스 수명 동안
    /// 유지됩니다.
    Persistent,
}

impl fmt::Display for BlockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockPolicy::Transient => write!(f, "transient"),
            BlockPolicy::Persistent => write!(f, "persistent"),
        }
    }
}

/// 필터 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 고정 윈도우 크기 (초)
    pub window_secs: u64,
    /// 윈도우당 허용 pure SYN 수 — 초과분부터 차단
    pub syn_threshold: u64,
    /// 플로우 테이블 최대 엔트리 수
    pub flow_capacity: usize,
    /// 차단 정책 (transient, persistent)
    pub block_policy: BlockPolicy,
    /// persistent 차단의 만료 시간 (초, 0이면 만료 없음)
    pub block_expiry_secs: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_secs: 2,
            syn_threshold: 10,
            flow_capacity: 16_384,
            block_policy: BlockPolicy::Transient,
            block_expiry_secs: 300,
        }
    }
}

/// 메트릭 샘플러 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 샘플링 주기 (초)
    pub sample_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: 1,
        }
    }
}

/// Prometheus 익스포트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 수신 대기 주소
    pub listen_addr: String,
    /// 수신 대기 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9465,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---
// 파싱에 실패한 값은 경고 로그 후 무시합니다 (기존 값 유지).

fn override_string(target: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var) {
        *target = value;
    }
}

fn override_bool(target: &mut bool, var: &str) {
    if let Ok(value) = std::env::var(var) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(var, value, "ignoring unparsable boolean env override"),
        }
    }
}

fn override_u16(target: &mut u16, var: &str) {
    if let Ok(value) = std::env::var(var) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(var, value, "ignoring unparsable u16 env override"),
        }
    }
}

fn override_u64(target: &mut u64, var: &str) {
    if let Ok(value) = std::env::var(var) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(var, value, "ignoring unparsable u64 env override"),
        }
    }
}

fn override_usize(target: &mut usize, var: &str) {
    if let Ok(value) = std::env::var(var) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(var, value, "ignoring unparsable usize env override"),
        }
    }
}

fn override_block_policy(target: &mut BlockPolicy, var: &str) {
    if let Ok(value) = std::env::var(var) {
        match value.as_str() {
            "transient" => *target = BlockPolicy::Transient,
            "persistent" => *target = BlockPolicy::Persistent,
            _ => warn!(var, value, "ignoring unknown block policy env override"),
        }
    }
}

fn override_log_format(target: &mut LogFormat, var: &str) {
    if let Ok(value) = std::env::var(var) {
        match value.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(var, value, "ignoring unknown log format env override"),
        }
    }
}
