//! 테스트/벤치마크용 프레임 생성 헬퍼
//!
//! 단위 테스트, 통합 테스트, criterion 벤치마크, 퍼즈 시드에서 공유하는
//! 최소 Ethernet/IPv4/TCP 프레임 빌더입니다. 프로덕션 경로에서는
//! 사용하지 않습니다.

/// 생성되는 프레임의 목적지 주소 (192.168.0.10)
pub const DST_ADDR: u32 = 0xc0a8_000a;
/// 생성되는 프레임의 출발지 포트
pub const SRC_PORT: u16 = 40000;
/// 생성되는 프레임의 목적지 포트
pub const DST_PORT: u16 = 80;

/// 최소 길이(14+20+20)의 TCP-over-IPv4 프레임을 생성합니다.
pub fn tcp_frame(src_addr: u32, tcp_flags: u8) -> Vec<u8> {
    tcp_frame_with_ihl(src_addr, tcp_flags, 5)
}

/// IPv4 헤더 길이를 지정하여 TCP 프레임을 생성합니다 (`ihl`은 4바이트 단위).
pub fn tcp_frame_with_ihl(src_addr: u32, tcp_flags: u8, ihl: u8) -> Vec<u8> {
    let ip_hlen = usize::from(ihl) * 4;
    let mut frame = vec![0u8; 14 + ip_hlen + 20];

    // Ethernet: ethertype IPv4
    frame[12] = 0x08;
    frame[13] = 0x00;

    // IPv4: version/ihl, protocol, 주소
    frame[14] = 0x40 | (ihl & 0x0f);
    frame[14 + 9] = 6; // TCP
    frame[14 + 12..14 + 16].copy_from_slice(&src_addr.to_be_bytes());
    frame[14 + 16..14 + 20].copy_from_slice(&DST_ADDR.to_be_bytes());

    // TCP: 포트, 플래그
    let tcp = 14 + ip_hlen;
    frame[tcp..tcp + 2].copy_from_slice(&SRC_PORT.to_be_bytes());
    frame[tcp + 2..tcp + 4].copy_from_slice(&DST_PORT.to_be_bytes());
    frame[tcp + 13] = tcp_flags;

    frame
}

/// pure SYN 프레임을 생성합니다.
pub fn syn_frame(src_addr: u32) -> Vec<u8> {
    tcp_frame(src_addr, crate::packet::TCP_SYN)
}

/// ACK 프레임(확립된 연결의 트래픽)을 생성합니다.
pub fn ack_frame(src_addr: u32) -> Vec<u8> {
    tcp_frame(src_addr, crate::packet::TCP_ACK)
}
