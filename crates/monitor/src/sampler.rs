//! 메트릭 샘플러 — 주기적 카운터 스냅샷과 시계열 축적
//!
//! [`MetricsSampler`]는 고정 주기(기본 1초)마다 [`CounterBank`]를 원자적으로
//! 스냅샷하여 [`MetricsSample`] 시계열을 만드는 tokio 태스크입니다.
//! 빌더 패턴([`MetricsSamplerBuilder`])으로 생성합니다.
//!
//! # 상태 전이
//! ```text
//! Idle ──start()──▶ Running ──handle.stop()──▶ Stopped
//!                      │                          │
//!                      └── 틱마다 샘플 추가        └── Vec<MetricsSample> 반환
//! ```
//!
//! 샘플러는 스스로 종료하지 않습니다 — 종료는 오직
//! [`SamplerHandle::stop`]의 취소 토큰으로만 일어납니다. 취소 시에는
//! 마지막 스냅샷을 한 번 더 기록한 뒤 축적된 샘플을 전부 반환하므로,
//! 한 주기보다 짧게 실행해도 최종 카운터 값이 결과에 남습니다.
//!
//! # 사용 예시
//! ```ignore
//! let sampler = MetricsSampler::builder()
//!     .counters(Arc::clone(&counters))
//!     .interval(Duration::from_secs(1))
//!     .build()?;
//!
//! let handle = sampler.start();
//! // ... 필터 동작 ...
//! let samples = handle.stop().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use synwall_core::counters::CounterBank;
use synwall_core::error::PipelineError;
use synwall_core::metrics as m;
use synwall_core::types::MetricsSample;

use crate::cpu::{CpuProbe, CpuSampler};

/// 메트릭 샘플러
pub struct MetricsSampler {
    counters: Arc<CounterBank>,
    interval: Duration,
    cpu: Box<dyn CpuSampler>,
}

/// 실행 중인 샘플러의 핸들
///
/// 취소 토큰과 태스크 join 핸들을 묶습니다. [`stop`](Self::stop)이
/// 유일한 종료 경로입니다.
pub struct SamplerHandle {
    cancel: CancellationToken,
    task: JoinHandle<Vec<MetricsSample>>,
}

/// 메트릭 샘플러 빌더
pub struct MetricsSamplerBuilder {
    counters: Option<Arc<CounterBank>>,
    interval: Duration,
    cpu: Option<Box<dyn CpuSampler>>,
}

impl MetricsSamplerBuilder {
    fn new() -> Self {
        Self {
            counters: None,
            interval: Duration::from_secs(1),
            cpu: None,
        }
    }

    /// 스냅샷 대상 카운터를 지정합니다 (필수).
    pub fn counters(mut self, counters: Arc<CounterBank>) -> Self {
        self.counters = Some(counters);
        self
    }

    /// 샘플링 주기를 지정합니다 (기본: 1초).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// CPU 측정기를 지정합니다.
    ///
    /// 지정하지 않으면 sysinfo 기반 [`CpuProbe`]를 사용합니다.
    /// 테스트에서 고정값 스텁을 주입하는 용도입니다.
    pub fn cpu_sampler(mut self, cpu: Box<dyn CpuSampler>) -> Self {
        self.cpu = Some(cpu);
        self
    }

    /// 샘플러를 생성합니다.
    ///
    /// # 에러
    /// - `PipelineError::InitFailed`: 카운터 미지정 또는 주기가 0인 경우
    pub fn build(self) -> Result<MetricsSampler, PipelineError> {
        let counters = self
            .counters
            .ok_or_else(|| PipelineError::InitFailed("counters are required".to_owned()))?;
        if self.interval.is_zero() {
            return Err(PipelineError::InitFailed(
                "sample interval must be positive".to_owned(),
            ));
        }
        Ok(MetricsSampler {
            counters,
            interval: self.interval,
            cpu: self.cpu.unwrap_or_else(|| Box::new(CpuProbe::new())),
        })
    }
}

impl MetricsSampler {
    /// 빌더를 반환합니다.
    pub fn builder() -> MetricsSamplerBuilder {
        MetricsSamplerBuilder::new()
    }

    /// 샘플링 태스크를 시작하고 핸들을 반환합니다.
    ///
    /// 첫 샘플은 시작 시점이 아니라 첫 주기가 지난 뒤에 기록됩니다.
    pub fn start(self) -> SamplerHandle {
        info!(interval_secs = self.interval.as_secs_f64(), "starting metrics sampler");
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        SamplerHandle { cancel, task }
    }

    async fn run(mut self, cancel: CancellationToken) -> Vec<MetricsSample> {
        let start = Instant::now();
        let mut ticker = tokio::time::interval_at(start + self.interval, self.interval);
        let mut samples = Vec::new();
        let mut prev_total = 0u64;
        let mut last_tick = start;

        loop {
            // 취소되면 마지막 스냅샷을 한 번 더 기록하고 종료한다.
            let flush = tokio::select! {
                _ = cancel.cancelled() => true,
                _ = ticker.tick() => false,
            };

            let now = Instant::now();
            let snap = self.counters.snapshot();
            let cpu_pct = self.cpu.usage_percent();
            let delta = snap.syn_total.saturating_sub(prev_total);
            let elapsed = now.duration_since(last_tick);
            let pps = if elapsed.is_zero() {
                0.0
            } else {
                delta as f64 / elapsed.as_secs_f64()
            };
            prev_total = snap.syn_total;
            last_tick = now;

            let sample = MetricsSample {
                offset_secs: start.elapsed().as_secs_f64(),
                syn_total: snap.syn_total,
                syn_dropped: snap.syn_dropped,
                cpu_pct,
                pps,
            };

            metrics::counter!(m::MONITOR_SAMPLES_TOTAL).increment(1);
            metrics::gauge!(m::MONITOR_SYN_PER_SECOND).set(pps);
            metrics::gauge!(m::MONITOR_CPU_PERCENT).set(cpu_pct);
            metrics::counter!(m::FILTER_SYN_TOTAL).absolute(snap.syn_total);
            metrics::counter!(m::FILTER_SYN_DROPPED_TOTAL).absolute(snap.syn_dropped);
            metrics::counter!(m::FILTER_TABLE_FULL_PASSES_TOTAL).absolute(snap.table_full_passes);

            debug!(
                offset_secs = sample.offset_secs,
                syn_total = sample.syn_total,
                syn_dropped = sample.syn_dropped,
                cpu_pct = sample.cpu_pct,
                pps = sample.pps,
                "metrics sample"
            );
            samples.push(sample);

            if flush {
                debug!(samples = samples.len(), "metrics sampler cancelled");
                break;
            }
        }

        samples
    }
}

impl SamplerHandle {
    /// 샘플러를 정지하고 축적된 시계열을 반환합니다.
    ///
    /// 정지 시점의 카운터로 마지막 샘플을 한 번 더 기록하므로
    /// 반환된 시계열의 마지막 원소는 항상 최종 누적치를 담습니다.
    pub async fn stop(self) -> Vec<MetricsSample> {
        self.cancel.cancel();
        match self.task.await {
            Ok(samples) => samples,
            Err(err) => {
                error!(error = %err, "sampler task ended abnormally, samples lost");
                Vec::new()
            }
        }
    }
}
