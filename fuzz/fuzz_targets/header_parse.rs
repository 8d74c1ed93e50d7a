#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    match synwall_filter::packet::parse(data) {
        Ok(synwall_filter::Parsed::Tcp(view)) => {
            // 파싱이 성공했다면 모든 접근자는 범위 안이어야 한다
            let _ = view.src_addr();
            let _ = view.dst_addr();
            let _ = view.src_port();
            let _ = view.dst_port();
            let _ = view.tcp_flags();
            let _ = view.is_pure_syn();
        }
        Ok(synwall_filter::Parsed::NotApplicable) | Err(_) => {}
    }
});
