//! 어드미션 엔진 — 고정 윈도우 카운터 기반 SYN 레이트 리밋
//!
//! [`AdmissionEngine::classify`]는 수신 프레임 하나에 대해 PASS/DROP을
//! 판정합니다. pure SYN(SYN=1, ACK=0)만 검사 대상이며, 출발지별로
//! 고정 2초 윈도우에서 임계값(기본 10)을 초과하는 SYN을 차단합니다.
//!
//! # 알고리즘 (고정 윈도우 — 슬라이딩 아님)
//! 1. pure SYN이 아니면 즉시 Pass (비-SYN TCP는 더 검사하지 않음)
//! 2. 모든 pure SYN에 대해 `syn_total` 증가
//! 3. 출발지 상태 조회:
//!    - 차단 상태(persistent)면 윈도우 갱신 없이 즉시 Drop
//!    - 윈도우가 만료됐으면 리셋 후 카운트 1
//!    - 아니면 카운트 증가; 임계값 초과 시 정책 적용
//! 4. Drop 판정마다 `syn_dropped` 증가
//!
//! 윈도우는 만료 후 첫 접근에서 리셋되는 버킷이므로, 한 윈도우 안의
//! 정확히 임계값 개수까지는 통과하고 임계값+1번째부터 차단됩니다.
//!
//! # 차단 정책
//! - [`BlockPolicy::Transient`]: 열려 있는 윈도우가 끝날 때까지 차단 —
//!   윈도우 만료 시 새 카운트로 재입장
//! - [`BlockPolicy::Persistent`]: 첫 초과 시 차단 플래그 설정 — 이후의
//!   pure SYN은 fast path에서 차단. 차단은 SYN에만 적용되며 확립된
//!   연결의 비-SYN 트래픽은 영향받지 않습니다 (1번 단계가 먼저 적용됨).

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, trace, warn};

use synwall_core::config::{BlockPolicy, FilterConfig};
use synwall_core::counters::CounterBank;
use synwall_core::error::FlowTableError;
use synwall_core::metrics as m;
use synwall_core::types::Verdict;

use crate::flow::{FlowState, FlowTable};
use crate::packet::{self, Parsed};

/// 분류 한 건의 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// 판정
    pub verdict: Verdict,
    /// 이 패킷으로 출발지가 처음 차단 상태가 되었는지 여부
    pub newly_blocked: bool,
}

impl Outcome {
    fn pass() -> Self {
        Self {
            verdict: Verdict::Pass,
            newly_blocked: false,
        }
    }

    fn drop(newly_blocked: bool) -> Self {
        Self {
            verdict: Verdict::Drop,
            newly_blocked,
        }
    }
}

/// SYN 어드미션 컨트롤 엔진
///
/// 분류 경로는 블로킹 I/O나 무제한 작업 없이 패킷당 유한 시간에
/// 완료됩니다. 여러 스레드에서 동시에 호출해도 안전합니다 (`&self`).
#[derive(Debug)]
pub struct AdmissionEngine {
    table: FlowTable,
    counters: Arc<CounterBank>,
    window: Duration,
    threshold: u64,
    policy: BlockPolicy,
    block_expiry: Option<Duration>,
}

impl AdmissionEngine {
    /// 설정과 카운터 핸들로 엔진을 생성합니다.
    pub fn new(config: &FilterConfig, counters: Arc<CounterBank>) -> Self {
        let window = Duration::from_secs(config.window_secs);
        let block_expiry = if config.block_expiry_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(config.block_expiry_secs))
        };
        Self {
            table: FlowTable::new(config.flow_capacity, window, block_expiry),
            counters,
            window,
            threshold: config.syn_threshold,
            policy: config.block_policy,
            block_expiry,
        }
    }

    /// 공유 카운터 핸들
    pub fn counters(&self) -> &Arc<CounterBank> {
        &self.counters
    }

    /// 현재 추적 중인 플로우 수
    pub fn flows_tracked(&self) -> usize {
        self.table.len()
    }

    /// 프레임 하나를 분류합니다.
    ///
    /// 비-TCP, 비-IPv4, malformed 프레임은 필터링 없이 Pass입니다 —
    /// 이 필터는 TCP-over-IPv4의 pure SYN만 검사합니다.
    pub fn classify(&self, frame: &[u8], now: Instant) -> Outcome {
        let view = match packet::parse(frame) {
            Ok(Parsed::Tcp(view)) => view,
            Ok(Parsed::NotApplicable) => return Outcome::pass(),
            // malformed 프레임은 크래시 대신 통과로 처리한다
            Err(_) => return Outcome::pass(),
        };

        if !view.is_pure_syn() {
            return Outcome::pass();
        }

        self.counters.record_syn();
        let src = view.src_addr();

        let result = self.table.upsert(src, now, |state| {
            self.admit_syn(state, now)
        });

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(FlowTableError::TableFull { capacity }) => {
                // fail-open: 추적 불가능한 출발지는 통과시키고 집계만 남긴다
                self.counters.record_table_full_pass();
                warn!(src_ip = src, capacity, "flow table full, passing SYN unfiltered");
                return Outcome::pass();
            }
        };

        if outcome.verdict == Verdict::Drop {
            self.counters.record_drop();
            trace!(src_ip = src, "dropping SYN over rate limit");
        }
        if outcome.newly_blocked {
            metrics::counter!(m::FILTER_SOURCES_BLOCKED_TOTAL).increment(1);
            info!(
                src_ip = src,
                policy = %self.policy,
                "source exceeded SYN threshold, blocking"
            );
        }

        outcome
    }

    /// 플로우 상태를 갱신하고 판정을 내립니다 (샤드 락 아래에서 실행).
    fn admit_syn(&self, state: &mut FlowState, now: Instant) -> Outcome {
        // persistent fast path: 윈도우 갱신 없이 차단
        if state.blocked {
            if self.block_has_expired(state, now) {
                // 만료 — 차단 해제 후 새 윈도우로 재입장
                state.blocked = false;
                state.blocked_since = None;
                state.window_start = now;
                state.count = 1;
                return Outcome::pass();
            }
            return Outcome::drop(false);
        }

        // 만료 후 첫 접근에서 윈도우 리셋
        if now.saturating_duration_since(state.window_start) > self.window {
            state.window_start = now;
            state.count = 0;
        }

        state.count += 1;
        if state.count <= self.threshold {
            return Outcome::pass();
        }

        match self.policy {
            // 윈도우/카운트 자체가 집행 수단 — 만료되면 자연 재입장
            BlockPolicy::Transient => Outcome::drop(false),
            BlockPolicy::Persistent => {
                let newly = !state.blocked;
                state.blocked = true;
                state.blocked_since = Some(now);
                Outcome::drop(newly)
            }
        }
    }

    fn block_has_expired(&self, state: &FlowState, now: Instant) -> bool {
        match self.block_expiry {
            Some(expiry) => {
                let since = state.blocked_since.unwrap_or(state.window_start);
                now.saturating_duration_since(since) > expiry
            }
            None => false,
        }
    }
}
