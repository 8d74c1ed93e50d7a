//! 전역 카운터 — 패킷 경로와 샘플러가 공유하는 단조 증가 카운터
//!
//! [`CounterBank`]는 프로세스 수명 동안 유지되는 원자 카운터 묶음입니다.
//! 분류 경로는 fetch-and-add로 증가시키고, 샘플러는 락 없이 원자 로드로
//! 읽습니다. 전역 변수가 아니라 `Arc` 핸들로 주입하여 엔진과 샘플러가
//! 같은 인스턴스를 공유합니다.
//!
//! # 메모리 오더링
//! 카운터 간 순서 보장이 필요 없으므로 모든 연산은 `Relaxed`입니다.
//! 샘플러의 스냅샷은 최종 일관성만 보장하면 충분합니다.

use std::sync::atomic::{AtomicU64, Ordering};

/// 전역 카운터 묶음
#[derive(Debug, Default)]
pub struct CounterBank {
    /// 관측된 pure SYN 수
    syn_total: AtomicU64,
    /// 차단된 SYN 수
    syn_dropped: AtomicU64,
    /// 테이블 포화로 필터링 없이 통과시킨 SYN 수
    table_full_passes: AtomicU64,
}

/// 한 시점의 카운터 스냅샷
///
/// 각 필드는 개별 원자 로드의 결과이므로 필드 간 완전한 동시성 일관성은
/// 보장되지 않습니다. 단조 증가 카운터 용도로는 충분합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// 누적 SYN 관측 수
    pub syn_total: u64,
    /// 누적 SYN 차단 수
    pub syn_dropped: u64,
    /// 누적 테이블 포화 통과 수
    pub table_full_passes: u64,
}

impl CounterSnapshot {
    /// 허용된 SYN 수 (`syn_total - syn_dropped`, 언더플로우 방지)
    pub fn admitted(&self) -> u64 {
        self.syn_total.saturating_sub(self.syn_dropped)
    }
}

impl CounterBank {
    /// 제로 초기화된 카운터 묶음을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// pure SYN 관측을 기록합니다.
    pub fn record_syn(&self) {
        self.syn_total.fetch_add(1, Ordering::Relaxed);
    }

    /// SYN 차단을 기록합니다.
    pub fn record_drop(&self) {
        self.syn_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// 테이블 포화로 인한 fail-open 통과를 기록합니다.
    pub fn record_table_full_pass(&self) {
        self.table_full_passes.fetch_add(1, Ordering::Relaxed);
    }

    /// 현재 카운터 값의 스냅샷을 반환합니다.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            syn_total: self.syn_total.load(Ordering::Relaxed),
            syn_dropped: self.syn_dropped.load(Ordering::Relaxed),
            table_full_passes: self.table_full_passes.load(Ordering::Relaxed),
        }
    }
}
