#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//! - [`config`]: synwall.toml 파싱 + 런타임 설정
//! - [`counters`]: 패킷 경로/샘플러 공유 원자 카운터
//! - [`error`]: 도메인별 에러 타입
//! - [`metrics`]: Prometheus 메트릭 이름 상수
//! - [`types`]: 판정/샘플/요약 등 공유 도메인 타입

pub mod config;
pub mod counters;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, FlowTableError, ParseError, PipelineError, SynwallError};

// 설정
pub use config::{BlockPolicy, LogFormat, SynwallConfig};

// 카운터
pub use counters::{CounterBank, CounterSnapshot};

// 도메인 타입
pub use types::{MetricsSample, Summary, Verdict};
