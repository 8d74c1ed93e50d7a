#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//! - [`packet`]: Ethernet/IPv4/TCP 헤더의 zero-copy 해석
//! - [`flow`]: 출발지별 레이트 리밋 상태 테이블 (용량 제한 + 축출)
//! - [`engine`]: AdmissionEngine — 고정 윈도우 카운터와 차단 정책
//! - [`pipeline`]: FilterPipeline — 프레임 채널을 소비하는 분류 루프
//! - [`testutil`]: 테스트/벤치마크/퍼징용 프레임 빌더
//!
//! # 공유 타입
//! 판정/카운터/설정 타입은 [`synwall_core`] 크레이트에 정의되어 있습니다.

pub mod engine;
pub mod flow;
pub mod packet;
pub mod pipeline;
pub mod testutil;

// --- 주요 타입 re-export ---

// 엔진
pub use engine::{AdmissionEngine, Outcome};

// 파이프라인
pub use pipeline::{FilterPipeline, FilterPipelineBuilder};

// 플로우 테이블
pub use flow::{FlowKey, FlowState, FlowTable};

// 패킷 해석
pub use packet::{HeaderView, Parsed, parse};
