//! 요약 리포트 — 샘플 시계열을 종료 시 요약으로 축약
//!
//! [`summarize`]는 순수 함수입니다. 누적 카운터는 마지막 샘플에서,
//! CPU/PPS는 전체 샘플의 산술 평균에서 얻습니다. 빈 시계열과
//! SYN 0건의 경우 모든 필드가 0으로 떨어집니다 (0 나누기 없음).

use synwall_core::types::{MetricsSample, Summary};

/// 샘플 시계열을 요약 리포트로 축약합니다.
pub fn summarize(samples: &[MetricsSample]) -> Summary {
    let Some(last) = samples.last() else {
        return Summary {
            syn_total: 0,
            syn_blocked: 0,
            syn_accepted: 0,
            success_rate_pct: 0.0,
            avg_cpu_pct: 0.0,
            avg_pps: 0.0,
        };
    };

    let syn_total = last.syn_total;
    let syn_blocked = last.syn_dropped;
    let syn_accepted = syn_total.saturating_sub(syn_blocked);
    let success_rate_pct = if syn_total == 0 {
        0.0
    } else {
        syn_accepted as f64 / syn_total as f64 * 100.0
    };

    let count = samples.len() as f64;
    let avg_cpu_pct = samples.iter().map(|s| s.cpu_pct).sum::<f64>() / count;
    let avg_pps = samples.iter().map(|s| s.pps).sum::<f64>() / count;

    Summary {
        syn_total,
        syn_blocked,
        syn_accepted,
        success_rate_pct,
        avg_cpu_pct,
        avg_pps,
    }
}
