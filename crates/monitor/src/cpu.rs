//! CPU 사용률 프로브
//!
//! 샘플러가 틱마다 호출하는 전역 CPU 사용률 측정을 추상화합니다.
//! 프로덕션은 [`CpuProbe`](sysinfo 기반)를 쓰고, 테스트는 고정값
//! 스텁을 주입합니다.

use sysinfo::System;

/// 틱 간 CPU 사용률 측정기
///
/// `usage_percent()`는 직전 호출 이후의 전역 CPU 사용률(%)을
/// 반환합니다. 측정기가 내부 상태를 갱신하므로 `&mut self`입니다.
pub trait CpuSampler: Send {
    /// 직전 호출 이후의 전역 CPU 사용률 (0.0 ~ 100.0 * 코어 수 아님, 전역 %)
    fn usage_percent(&mut self) -> f64;
}

/// sysinfo 기반 CPU 프로브
///
/// sysinfo의 CPU 사용률은 두 번의 refresh 사이 구간에 대해 계산되므로
/// 생성 시 한 번 refresh하여 기준점을 잡습니다. 샘플링 주기(기본 1초)는
/// sysinfo의 최소 측정 간격보다 충분히 깁니다.
pub struct CpuProbe {
    system: System,
}

impl CpuProbe {
    /// 프로브를 생성하고 기준 측정점을 잡습니다.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self { system }
    }
}

impl Default for CpuProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuSampler for CpuProbe {
    fn usage_percent(&mut self) -> f64 {
        self.system.refresh_cpu_usage();
        f64::from(self.system.global_cpu_info().cpu_usage())
    }
}
