#![no_main]

use std::sync::{Arc, LazyLock};
use std::time::Instant;

use libfuzzer_sys::fuzz_target;

use synwall_core::config::FilterConfig;
use synwall_core::counters::CounterBank;
use synwall_filter::AdmissionEngine;

static ENGINE: LazyLock<AdmissionEngine> = LazyLock::new(|| {
    AdmissionEngine::new(&FilterConfig::default(), Arc::new(CounterBank::new()))
});

fuzz_target!(|data: &[u8]| {
    // 임의 바이트열에 대해 패닉 없이 판정을 내려야 한다
    let _ = ENGINE.classify(data, Instant::now());
});
