#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//! - [`cpu`]: CpuSampler trait + sysinfo 기반 CpuProbe
//! - [`sampler`]: MetricsSampler — 주기 샘플링 태스크와 핸들
//! - [`report`]: 샘플 시계열 → 요약 리포트 (순수 함수)
//!
//! # 공유 타입
//! 샘플/요약 타입은 [`synwall_core`] 크레이트에 정의되어 있습니다.

pub mod cpu;
pub mod report;
pub mod sampler;

// --- 주요 타입 re-export ---

// 샘플러
pub use sampler::{MetricsSampler, MetricsSamplerBuilder, SamplerHandle};

// CPU 프로브
pub use cpu::{CpuProbe, CpuSampler};

// 리포트
pub use report::summarize;
