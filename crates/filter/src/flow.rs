//! 플로우 테이블 — 출발지 IP → 레이트 리밋 상태 매핑
//!
//! 이 설계에서 플로우는 출발지 IPv4 주소 하나로 식별됩니다
//! (목적지 포트나 5-tuple로 구분하지 않음). 분류 경로 여러 개가 동시에
//! 접근하므로 [`DashMap`]의 샤드 락으로 키 단위 변경을 선형화합니다 —
//! 같은 출발지의 SYN 두 개가 동시에 도착해도 둘 다 낡은 카운트를 읽는
//! 일이 없습니다.
//!
//! # 용량과 축출
//! 원본 설계는 고정 용량 해시 테이블에서 삽입 실패를 조용히 무시했습니다.
//! 여기서는 용량 도달 시 만료된 엔트리를 한 번 축출하고, 그래도 가득하면
//! [`FlowTableError::TableFull`]을 표면화하여 호출자가 fail-open 정책을
//! 적용하게 합니다. 용량은 동시 삽입 경쟁에서 소폭 초과될 수 있는
//! 소프트 상한입니다.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use synwall_core::error::FlowTableError;

/// 플로우 키 — 출발지 IPv4 주소 (host order)
pub type FlowKey = u32;

/// 출발지 하나의 레이트 리밋 상태
///
/// [`crate::engine::AdmissionEngine`]만이 키의 샤드 락 아래에서 변경합니다.
#[derive(Debug, Clone)]
pub struct FlowState {
    /// 현재 고정 윈도우의 시작 시각
    pub window_start: Instant,
    /// 현재 윈도우에서 관측한 pure SYN 수
    pub count: u64,
    /// persistent 정책에서 차단 상태 여부
    pub blocked: bool,
    /// 차단 시각 (만료 계산용)
    pub blocked_since: Option<Instant>,
}

impl FlowState {
    /// 새 출발지의 초기 상태 — 카운트는 엔진이 증가시키므로 0에서 시작
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
            blocked: false,
            blocked_since: None,
        }
    }
}

/// 용량 제한이 있는 동시 접근 플로우 테이블
#[derive(Debug)]
pub struct FlowTable {
    flows: DashMap<FlowKey, FlowState>,
    capacity: usize,
    /// 고정 윈도우 크기 — 축출 시 만료 판단에 사용
    window: Duration,
    /// persistent 차단 만료 (None이면 만료 없음)
    block_expiry: Option<Duration>,
}

impl FlowTable {
    /// 테이블을 생성합니다.
    pub fn new(capacity: usize, window: Duration, block_expiry: Option<Duration>) -> Self {
        Self {
            flows: DashMap::new(),
            capacity,
            window,
            block_expiry,
        }
    }

    /// 현재 추적 중인 플로우 수
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// 테이블이 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// 설정된 용량 상한
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 키의 상태를 샤드 락 아래에서 변경합니다. 없으면 생성합니다.
    ///
    /// 클로저는 락을 잡은 채 실행되므로 짧게 유지해야 합니다.
    /// 새 플로우 삽입이 용량에 막히면 만료 엔트리를 한 번 축출하고,
    /// 그래도 가득하면 `TableFull`을 반환합니다.
    pub fn upsert<R>(
        &self,
        key: FlowKey,
        now: Instant,
        mutate: impl FnOnce(&mut FlowState) -> R,
    ) -> Result<R, FlowTableError> {
        // fast path: 기존 엔트리
        if let Some(mut entry) = self.flows.get_mut(&key) {
            return Ok(mutate(entry.value_mut()));
        }

        // 삽입 경로: 용량 검사 (락을 잡지 않은 상태에서 축출)
        if self.flows.len() >= self.capacity {
            self.evict_expired(now);
            if self.flows.len() >= self.capacity {
                return Err(FlowTableError::TableFull {
                    capacity: self.capacity,
                });
            }
        }

        // 경쟁 삽입 시 entry()가 선착 엔트리를 재사용한다
        let mut entry = self.flows.entry(key).or_insert_with(|| FlowState::new(now));
        Ok(mutate(entry.value_mut()))
    }

    /// 키의 상태 사본을 반환합니다 (테스트/진단용).
    pub fn get(&self, key: FlowKey) -> Option<FlowState> {
        self.flows.get(&key).map(|entry| entry.value().clone())
    }

    /// 만료된 엔트리를 축출합니다.
    ///
    /// 축출 대상: 윈도우가 만료된 비차단 엔트리, 그리고 차단 만료가
    /// 설정된 경우 `blocked_since`가 만료 시한을 넘긴 차단 엔트리.
    pub fn evict_expired(&self, now: Instant) {
        self.flows.retain(|_, state| {
            if state.blocked {
                match self.block_expiry {
                    Some(expiry) => {
                        let since = state.blocked_since.unwrap_or(state.window_start);
                        now.saturating_duration_since(since) <= expiry
                    }
                    // 만료 없음 — 차단 엔트리는 프로세스 수명 동안 유지
                    None => true,
                }
            } else {
                now.saturating_duration_since(state.window_start) <= self.window
            }
        });
    }
}
