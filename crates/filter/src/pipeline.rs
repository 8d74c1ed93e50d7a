//! 필터 파이프라인 — 프레임 채널을 소비하는 분류 루프
//!
//! [`FilterPipeline`]은 mpsc 채널로 수신한 raw 프레임을
//! [`AdmissionEngine`]으로 분류하는 tokio 태스크를 관리합니다.
//! 빌더 패턴([`FilterPipelineBuilder`])으로 생성합니다.
//!
//! # 아키텍처
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │ 어태치먼트    │────▶│ mpsc<Bytes> │────▶│ FilterPipeline   │
//! │ (커널 훅 등) │     │ (frames)    │     │ (classify loop)  │
//! └──────────────┘     └─────────────┘     └──────┬───────────┘
//!                                                  │
//!                                ┌─────────────────┼─────────────┐
//!                                ▼                 ▼             ▼
//!                         AdmissionEngine    CounterBank   mpsc<Verdict>
//!                         (PASS/DROP 판정)   (집계)        (→ 집행 지점)
//! ```
//!
//! 실제 인터페이스 어태치는 이 크레이트 범위 밖입니다 — 프레임 채널이
//! 입력 경계, 판정 채널이 출력 경계입니다.
//!
//! # 사용 예시
//! ```ignore
//! let (mut pipeline, frame_tx) = FilterPipeline::builder()
//!     .config(filter_config)
//!     .counters(Arc::clone(&counters))
//!     .build()?;
//!
//! pipeline.start()?;
//! frame_tx.send(frame).await?;
//! pipeline.stop().await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use synwall_core::config::FilterConfig;
use synwall_core::counters::CounterBank;
use synwall_core::error::PipelineError;
use synwall_core::metrics as m;
use synwall_core::types::Verdict;

use crate::engine::AdmissionEngine;

/// 필터 파이프라인
///
/// # 필드
/// - `engine`: 공유 어드미션 엔진 (분류 태스크와 진단 경로가 공유)
/// - `frame_rx`: 프레임 수신 채널 (start 시 태스크로 이동)
/// - `verdict_tx`: 판정 내보내기 채널 (선택)
/// - `cancel`: 분류 루프 협조 종료 토큰
pub struct FilterPipeline {
    engine: Arc<AdmissionEngine>,
    frame_rx: Option<mpsc::Receiver<Bytes>>,
    verdict_tx: Option<mpsc::Sender<Verdict>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// 필터 파이프라인 빌더
///
/// `build()`는 `(FilterPipeline, mpsc::Sender<Bytes>)` 튜플을 반환하여
/// 프레임 송신자를 호출자(어태치먼트/리플레이 소스)에게 전달합니다.
pub struct FilterPipelineBuilder {
    config: Option<FilterConfig>,
    counters: Option<Arc<CounterBank>>,
    verdict_tx: Option<mpsc::Sender<Verdict>>,
    channel_capacity: usize,
}

impl FilterPipelineBuilder {
    fn new() -> Self {
        Self {
            config: None,
            counters: None,
            verdict_tx: None,
            channel_capacity: 1024,
        }
    }

    /// 필터 설정을 지정합니다.
    pub fn config(mut self, config: FilterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 공유 카운터를 지정합니다.
    ///
    /// 지정하지 않으면 `build()` 시 내부적으로 생성합니다.
    pub fn counters(mut self, counters: Arc<CounterBank>) -> Self {
        self.counters = Some(counters);
        self
    }

    /// 판정 내보내기 채널의 송신자를 지정합니다 (선택).
    pub fn verdict_sender(mut self, tx: mpsc::Sender<Verdict>) -> Self {
        self.verdict_tx = Some(tx);
        self
    }

    /// 내부 프레임 채널 용량을 지정합니다 (기본: 1024).
    pub fn channel_capacity(mut self, cap: usize) -> Self {
        self.channel_capacity = cap;
        self
    }

    /// 파이프라인과 프레임 송신 채널을 생성합니다.
    ///
    /// # 에러
    /// - `PipelineError::InitFailed`: 필수 설정이 누락된 경우
    pub fn build(self) -> Result<(FilterPipeline, mpsc::Sender<Bytes>), PipelineError> {
        let config = self
            .config
            .ok_or_else(|| PipelineError::InitFailed("config is required".to_owned()))?;
        let counters = self.counters.unwrap_or_else(|| Arc::new(CounterBank::new()));

        let (frame_tx, frame_rx) = mpsc::channel(self.channel_capacity);

        let pipeline = FilterPipeline {
            engine: Arc::new(AdmissionEngine::new(&config, counters)),
            frame_rx: Some(frame_rx),
            verdict_tx: self.verdict_tx,
            cancel: CancellationToken::new(),
            task: None,
        };

        Ok((pipeline, frame_tx))
    }
}

impl FilterPipeline {
    /// 빌더를 반환합니다.
    pub fn builder() -> FilterPipelineBuilder {
        FilterPipelineBuilder::new()
    }

    /// 공유 어드미션 엔진 핸들
    pub fn engine(&self) -> &Arc<AdmissionEngine> {
        &self.engine
    }

    /// 공유 카운터 핸들
    pub fn counters(&self) -> &Arc<CounterBank> {
        self.engine.counters()
    }

    /// 분류 루프를 시작합니다.
    ///
    /// # 에러
    /// - `PipelineError::AlreadyRunning`: 이미 실행 중인 경우
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.task.is_some() {
            return Err(PipelineError::AlreadyRunning);
        }
        let frame_rx = self
            .frame_rx
            .take()
            .ok_or_else(|| PipelineError::InitFailed("frame channel already consumed".to_owned()))?;

        info!("starting filter pipeline");

        let engine = Arc::clone(&self.engine);
        let verdict_tx = self.verdict_tx.clone();
        let cancel = self.cancel.clone();
        self.task = Some(tokio::spawn(classify_loop(
            engine, frame_rx, verdict_tx, cancel,
        )));
        Ok(())
    }

    /// 분류 루프를 정지하고 태스크가 끝날 때까지 기다립니다.
    ///
    /// 프레임 송신자를 먼저 드롭하면 루프는 큐에 남은 프레임을 전부
    /// 분류한 뒤 끝납니다. 송신자가 살아 있으면 취소 시점에 대기 중이던
    /// 프레임부터 유실됩니다.
    ///
    /// # 에러
    /// - `PipelineError::NotRunning`: 실행 중이 아닌 경우
    pub async fn stop(&mut self) -> Result<(), PipelineError> {
        let Some(task) = self.task.take() else {
            return Err(PipelineError::NotRunning);
        };

        info!("stopping filter pipeline");
        self.cancel.cancel();
        if let Err(err) = task.await {
            warn!(error = %err, "classify task ended abnormally");
        }
        Ok(())
    }
}

/// 분류 루프 본체 — 취소 또는 프레임 채널 종료까지 실행
async fn classify_loop(
    engine: Arc<AdmissionEngine>,
    mut frame_rx: mpsc::Receiver<Bytes>,
    verdict_tx: Option<mpsc::Sender<Verdict>>,
    cancel: CancellationToken,
) {
    loop {
        // 이미 수신된 프레임을 우선 처리 — 송신자가 닫힌 뒤에도 큐에 남은
        // 프레임은 전부 분류하고 나서 루프를 끝낸다
        let frame = tokio::select! {
            biased;
            maybe_frame = frame_rx.recv() => match maybe_frame {
                Some(frame) => frame,
                None => {
                    debug!("frame channel closed, classify loop ending");
                    break;
                }
            },
            _ = cancel.cancelled() => {
                debug!("classify loop cancelled");
                break;
            }
        };

        let outcome = engine.classify(&frame, Instant::now());
        metrics::gauge!(m::FILTER_FLOWS_TRACKED).set(engine.flows_tracked() as f64);

        if let Some(tx) = &verdict_tx {
            // 집행 지점이 밀리면 경고만 남기고 분류는 계속한다
            if let Err(err) = tx.try_send(outcome.verdict) {
                warn!(error = %err, "verdict channel backpressure, dropping verdict");
            }
        }
    }
}
