//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 필터 엔진의 판정, 모니터의 시계열 샘플, 종료 시 요약 리포트를 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 패킷 판정 결과
///
/// 어태치먼트 메커니즘(커널 훅, 방화벽 룰 테이블)이 실제 통과/차단을
/// 집행합니다. 엔진은 판정만 내립니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// 패킷 통과
    Pass,
    /// 패킷 차단
    Drop,
}

impl Verdict {
    /// 판정이 `Pass`인지 여부
    pub fn is_pass(self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Drop => write!(f, "drop"),
        }
    }
}

/// 샘플링 틱 하나의 측정값
///
/// 샘플러가 틱마다 하나씩 생성하는 append-only 시계열의 행입니다.
/// 카운터 값은 누적(단조 증가), `pps`는 직전 틱과의 차이입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSample {
    /// 측정 시작 기준 경과 시간 (초)
    pub offset_secs: f64,
    /// 누적 SYN 관측 수
    pub syn_total: u64,
    /// 누적 SYN 차단 수
    pub syn_dropped: u64,
    /// 직전 틱 이후 CPU 사용률 (%)
    pub cpu_pct: f64,
    /// 직전 틱 이후 SYN/초 추정값
    pub pps: f64,
}

/// 종료 시 요약 리포트
///
/// 평탄한 key-value 집합입니다. 테이블/그래프 렌더링은 외부 관심사이며,
/// `Display`는 한 줄에 하나씩 `key = value` 형식으로 출력합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// 전체 SYN 관측 수
    pub syn_total: u64,
    /// 차단된 SYN 수
    pub syn_blocked: u64,
    /// 허용된 SYN 수 (`syn_total - syn_blocked`)
    pub syn_accepted: u64,
    /// 성공률 (%) — `syn_total == 0`이면 0
    pub success_rate_pct: f64,
    /// 평균 CPU 사용률 (%)
    pub avg_cpu_pct: f64,
    /// 평균 SYN/초
    pub avg_pps: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "syn_total = {}", self.syn_total)?;
        writeln!(f, "syn_blocked = {}", self.syn_blocked)?;
        writeln!(f, "syn_accepted = {}", self.syn_accepted)?;
        writeln!(f, "success_rate_pct = {:.2}", self.success_rate_pct)?;
        writeln!(f, "avg_cpu_pct = {:.2}", self.avg_cpu_pct)?;
        write!(f, "avg_pps = {:.2}", self.avg_pps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_display_is_lowercase() {
        assert_eq!(Verdict::Pass.to_string(), "pass");
        assert_eq!(Verdict::Drop.to_string(), "drop");
        assert!(Verdict::Pass.is_pass());
        assert!(!Verdict::Drop.is_pass());
    }

    #[test]
    fn summary_display_is_flat_key_value() {
        let summary = Summary {
            syn_total: 50,
            syn_blocked: 40,
            syn_accepted: 10,
            success_rate_pct: 20.0,
            avg_cpu_pct: 3.5,
            avg_pps: 25.0,
        };
        let rendered = summary.to_string();
        assert!(rendered.contains("syn_total = 50"));
        assert!(rendered.contains("success_rate_pct = 20.00"));
        assert!(rendered.contains("avg_pps = 25.00"));
    }

    #[test]
    fn summary_serializes_to_flat_json() {
        let summary = Summary {
            syn_total: 5,
            syn_blocked: 0,
            syn_accepted: 5,
            success_rate_pct: 100.0,
            avg_cpu_pct: 1.0,
            avg_pps: 5.0,
        };
        let json = serde_json::to_value(&summary).expect("summary must serialize");
        assert_eq!(json["syn_total"], 5);
        assert_eq!(json["success_rate_pct"], 100.0);
    }
}
