//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `synwall_`
//! - 모듈명: `filter_`, `monitor_`
//! - 접미어: `_total` (counter), 없음 (gauge)

// ─── Filter 메트릭 ──────────────────────────────────────────────────

/// Filter: 관측된 pure SYN 패킷 수 (counter)
pub const FILTER_SYN_TOTAL: &str = "synwall_filter_syn_total";

/// Filter: 차단된 SYN 패킷 수 (counter)
pub const FILTER_SYN_DROPPED_TOTAL: &str = "synwall_filter_syn_dropped_total";

/// Filter: 테이블 포화로 필터링 없이 통과시킨 SYN 수 (counter)
pub const FILTER_TABLE_FULL_PASSES_TOTAL: &str = "synwall_filter_table_full_passes_total";

/// Filter: 차단 상태로 전환된 출발지 수 (counter)
pub const FILTER_SOURCES_BLOCKED_TOTAL: &str = "synwall_filter_sources_blocked_total";

/// Filter: 현재 추적 중인 플로우 수 (gauge)
pub const FILTER_FLOWS_TRACKED: &str = "synwall_filter_flows_tracked";

// ─── Monitor 메트릭 ─────────────────────────────────────────────────

/// Monitor: 수집된 샘플 수 (counter)
pub const MONITOR_SAMPLES_TOTAL: &str = "synwall_monitor_samples_total";

/// Monitor: 직전 틱 기준 SYN/초 (gauge)
pub const MONITOR_SYN_PER_SECOND: &str = "synwall_monitor_syn_per_second";

/// Monitor: 직전 틱 기준 CPU 사용률 (gauge, %)
pub const MONITOR_CPU_PERCENT: &str = "synwall_monitor_cpu_percent";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`, `describe_gauge!()`를 호출하여
/// Prometheus HELP 텍스트를 설정합니다. 전역 레코더 설치 후 한 번만
/// 호출해야 하며, 일반적으로 `synwall-daemon` 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        FILTER_SYN_TOTAL,
        "Total number of pure SYN packets observed by the admission engine"
    );
    describe_counter!(
        FILTER_SYN_DROPPED_TOTAL,
        "Total number of SYN packets dropped by the admission engine"
    );
    describe_counter!(
        FILTER_TABLE_FULL_PASSES_TOTAL,
        "SYN packets passed unfiltered because the flow table was full"
    );
    describe_counter!(
        FILTER_SOURCES_BLOCKED_TOTAL,
        "Number of sources transitioned to the blocked state"
    );
    describe_gauge!(
        FILTER_FLOWS_TRACKED,
        "Number of flows currently tracked in the flow table"
    );

    describe_counter!(
        MONITOR_SAMPLES_TOTAL,
        "Total number of metrics samples collected"
    );
    describe_gauge!(
        MONITOR_SYN_PER_SECOND,
        "Estimated SYN packets per second over the last sampling tick"
    );
    describe_gauge!(
        MONITOR_CPU_PERCENT,
        "Host CPU utilization over the last sampling tick"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        FILTER_SYN_TOTAL,
        FILTER_SYN_DROPPED_TOTAL,
        FILTER_TABLE_FULL_PASSES_TOTAL,
        FILTER_SOURCES_BLOCKED_TOTAL,
        FILTER_FLOWS_TRACKED,
        MONITOR_SAMPLES_TOTAL,
        MONITOR_SYN_PER_SECOND,
        MONITOR_CPU_PERCENT,
    ];

    #[test]
    fn all_metrics_start_with_synwall_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("synwall_"),
                "Metric '{}' does not start with 'synwall_' prefix",
                name
            );
        }
    }

    #[test]
    fn counter_names_end_with_total() {
        let counters = [
            FILTER_SYN_TOTAL,
            FILTER_SYN_DROPPED_TOTAL,
            FILTER_TABLE_FULL_PASSES_TOTAL,
            FILTER_SOURCES_BLOCKED_TOTAL,
            MONITOR_SAMPLES_TOTAL,
        ];
        for name in counters {
            assert!(
                name.ends_with("_total"),
                "Counter '{}' should end with '_total'",
                name
            );
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // 레코더 미설치 상태에서도 패닉 없이 동작해야 한다
        describe_all();
    }
}
