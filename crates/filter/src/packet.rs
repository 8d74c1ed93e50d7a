//! 패킷 헤더 해석 — Ethernet/IPv4/TCP zero-copy 뷰
//!
//! [`parse`]는 수신 프레임의 헤더 경계를 한 번에 검증하고, 이후의 필드
//! 접근이 범위를 벗어나지 않는 [`HeaderView`]를 돌려줍니다. 입력은
//! 공격자가 통제하므로 모든 접근은 명시적 경계 검사를 선행합니다.
//! 부수 효과가 없는 순수 함수이며 임의 바이트열에 대해 퍼징 가능합니다.
//!
//! # 분류 결과
//! - `Ok(Parsed::Tcp(view))`: TCP-over-IPv4 — 엔진이 검사할 대상
//! - `Ok(Parsed::NotApplicable)`: 그 외 프로토콜 — 필터링 없이 통과
//! - `Err(ParseError)`: 선언된 헤더보다 짧은 프레임 — 역시 통과 (호출자 정책)

use synwall_core::error::ParseError;

/// IPv4 ethertype
pub const ETHERTYPE_IPV4: u16 = 0x0800;

/// TCP 프로토콜 번호
pub const PROTO_TCP: u8 = 6;

/// FIN 플래그
pub const TCP_FIN: u8 = 0x01;
/// SYN 플래그
pub const TCP_SYN: u8 = 0x02;
/// RST 플래그
pub const TCP_RST: u8 = 0x04;
/// PSH 플래그
pub const TCP_PSH: u8 = 0x08;
/// ACK 플래그
pub const TCP_ACK: u8 = 0x10;

/// Ethernet 헤더 길이
const ETH_HLEN: usize = 14;
/// IPv4 최소 헤더 길이
const IPV4_MIN_HLEN: usize = 20;
/// TCP 최소 헤더 길이
const TCP_MIN_HLEN: usize = 20;

/// 파싱 결과 분류
#[derive(Debug)]
pub enum Parsed<'a> {
    /// TCP-over-IPv4 프레임 — 엔진 검사 대상
    Tcp(HeaderView<'a>),
    /// 비-IPv4 또는 비-TCP 프레임 — 이 필터의 관심사가 아님
    NotApplicable,
}

/// 검증 완료된 프레임의 읽기 전용 헤더 뷰
///
/// [`parse`]가 경계를 확인한 뒤에만 생성되므로 접근자는 실패하지 않습니다.
/// 프레임을 빌려서만 동작하며 분류가 끝나면 버려집니다 (보관 금지).
#[derive(Debug, Clone, Copy)]
pub struct HeaderView<'a> {
    frame: &'a [u8],
    /// TCP 헤더 시작 오프셋 (`ETH_HLEN + ihl*4`)
    tcp_offset: usize,
}

/// 프레임의 헤더 경계를 검증하고 뷰를 생성합니다.
///
/// 검사 순서는 XDP 프로그램과 동일합니다: Ethernet 헤더 → ethertype →
/// IPv4 고정 헤더 → 프로토콜 → 선언된 IPv4 헤더 길이 → 최소 TCP 헤더.
pub fn parse(frame: &[u8]) -> Result<Parsed<'_>, ParseError> {
    if frame.len() < ETH_HLEN {
        return Err(ParseError::Truncated {
            offset: 0,
            needed: ETH_HLEN - frame.len(),
        });
    }

    let ethertype = u16::from_be_bytes([frame[12], frame[13]]);
    if ethertype != ETHERTYPE_IPV4 {
        return Ok(Parsed::NotApplicable);
    }

    if frame.len() < ETH_HLEN + IPV4_MIN_HLEN {
        return Err(ParseError::Truncated {
            offset: ETH_HLEN,
            needed: ETH_HLEN + IPV4_MIN_HLEN - frame.len(),
        });
    }

    let protocol = frame[ETH_HLEN + 9];
    if protocol != PROTO_TCP {
        return Ok(Parsed::NotApplicable);
    }

    let ihl = usize::from(frame[ETH_HLEN] & 0x0f) * 4;
    if ihl < IPV4_MIN_HLEN {
        return Err(ParseError::HeaderLength {
            declared: ihl,
            minimum: IPV4_MIN_HLEN,
        });
    }
    if frame.len() < ETH_HLEN + ihl {
        return Err(ParseError::Truncated {
            offset: ETH_HLEN,
            needed: ETH_HLEN + ihl - frame.len(),
        });
    }

    let tcp_offset = ETH_HLEN + ihl;
    if frame.len() < tcp_offset + TCP_MIN_HLEN {
        return Err(ParseError::Truncated {
            offset: tcp_offset,
            needed: tcp_offset + TCP_MIN_HLEN - frame.len(),
        });
    }

    Ok(Parsed::Tcp(HeaderView { frame, tcp_offset }))
}

impl<'a> HeaderView<'a> {
    /// IP 버전 필드 (상위 4비트)
    pub fn ip_version(&self) -> u8 {
        self.frame[ETH_HLEN] >> 4
    }

    /// IPv4 헤더 길이 (바이트)
    pub fn ip_header_len(&self) -> usize {
        usize::from(self.frame[ETH_HLEN] & 0x0f) * 4
    }

    /// IP 프로토콜 번호 (항상 [`PROTO_TCP`])
    pub fn protocol(&self) -> u8 {
        self.frame[ETH_HLEN + 9]
    }

    /// 출발지 IPv4 주소 (host order u32)
    pub fn src_addr(&self) -> u32 {
        u32::from_be_bytes([
            self.frame[ETH_HLEN + 12],
            self.frame[ETH_HLEN + 13],
            self.frame[ETH_HLEN + 14],
            self.frame[ETH_HLEN + 15],
        ])
    }

    /// 목적지 IPv4 주소 (host order u32)
    pub fn dst_addr(&self) -> u32 {
        u32::from_be_bytes([
            self.frame[ETH_HLEN + 16],
            self.frame[ETH_HLEN + 17],
            self.frame[ETH_HLEN + 18],
            self.frame[ETH_HLEN + 19],
        ])
    }

    /// TCP 출발지 포트
    pub fn src_port(&self) -> u16 {
        u16::from_be_bytes([self.frame[self.tcp_offset], self.frame[self.tcp_offset + 1]])
    }

    /// TCP 목적지 포트
    pub fn dst_port(&self) -> u16 {
        u16::from_be_bytes([
            self.frame[self.tcp_offset + 2],
            self.frame[self.tcp_offset + 3],
        ])
    }

    /// TCP 플래그 바이트 (FIN/SYN/RST/PSH/ACK 비트)
    pub fn tcp_flags(&self) -> u8 {
        self.frame[self.tcp_offset + 13]
    }

    /// SYN 플래그 여부
    pub fn syn(&self) -> bool {
        self.tcp_flags() & TCP_SYN != 0
    }

    /// ACK 플래그 여부
    pub fn ack(&self) -> bool {
        self.tcp_flags() & TCP_ACK != 0
    }

    /// RST 플래그 여부
    pub fn rst(&self) -> bool {
        self.tcp_flags() & TCP_RST != 0
    }

    /// FIN 플래그 여부
    pub fn fin(&self) -> bool {
        self.tcp_flags() & TCP_FIN != 0
    }

    /// pure SYN (SYN=1, ACK=0) 여부 — 레이트 리밋 대상의 판별 기준
    pub fn is_pure_syn(&self) -> bool {
        self.tcp_flags() & (TCP_SYN | TCP_ACK) == TCP_SYN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{tcp_frame, tcp_frame_with_ihl};

    #[test]
    fn empty_frame_is_truncated() {
        let err = parse(&[]).expect_err("empty frame must fail");
        assert!(matches!(err, ParseError::Truncated { offset: 0, .. }));
    }

    #[test]
    fn frames_shorter_than_full_headers_never_parse() {
        // 14+20+20 미만의 모든 길이에서 Malformed 또는 NotApplicable이어야
        // 하며 절대 패닉하지 않는다
        let full = tcp_frame(0x0a00_0001, TCP_SYN);
        for len in 0..full.len() {
            let result = parse(&full[..len]);
            assert!(
                !matches!(result, Ok(Parsed::Tcp(_))),
                "truncated frame of len {} must not parse",
                len
            );
        }
    }

    #[test]
    fn non_ipv4_ethertype_is_not_applicable() {
        let mut frame = tcp_frame(0x0a00_0001, TCP_SYN);
        // ARP ethertype
        frame[12] = 0x08;
        frame[13] = 0x06;
        assert!(matches!(parse(&frame), Ok(Parsed::NotApplicable)));
    }

    #[test]
    fn non_tcp_protocol_is_not_applicable() {
        let mut frame = tcp_frame(0x0a00_0001, TCP_SYN);
        // UDP
        frame[14 + 9] = 17;
        assert!(matches!(parse(&frame), Ok(Parsed::NotApplicable)));
    }

    #[test]
    fn ihl_below_minimum_is_malformed() {
        let mut frame = tcp_frame(0x0a00_0001, TCP_SYN);
        // version 4, ihl 4 (16바이트 — 최소 미달)
        frame[14] = 0x44;
        let err = parse(&frame).expect_err("ihl < 5 must fail");
        assert!(matches!(
            err,
            ParseError::HeaderLength {
                declared: 16,
                minimum: 20
            }
        ));
    }

    #[test]
    fn ipv4_options_shift_tcp_offset() {
        // ihl=6 (24바이트) — TCP 헤더가 4바이트 뒤로 밀린다
        let frame = tcp_frame_with_ihl(0xc0a8_0101, TCP_SYN | TCP_ACK, 6);
        let Ok(Parsed::Tcp(view)) = parse(&frame) else {
            panic!("frame with options must parse");
        };
        assert_eq!(view.ip_header_len(), 24);
        assert_eq!(view.src_addr(), 0xc0a8_0101);
        assert!(view.syn());
        assert!(view.ack());
        assert!(!view.is_pure_syn());
    }

    #[test]
    fn declared_ihl_longer_than_frame_is_truncated() {
        let mut frame = tcp_frame(0x0a00_0001, TCP_SYN);
        // ihl=15 (60바이트) 선언 — 실제 프레임보다 김
        frame[14] = 0x4f;
        assert!(matches!(
            parse(&frame),
            Err(ParseError::Truncated { offset: 14, .. })
        ));
    }

    #[test]
    fn fields_are_extracted_from_minimal_syn_frame() {
        let frame = tcp_frame(0x0a01_0203, TCP_SYN);
        let Ok(Parsed::Tcp(view)) = parse(&frame) else {
            panic!("minimal TCP frame must parse");
        };
        assert_eq!(view.ip_version(), 4);
        assert_eq!(view.ip_header_len(), 20);
        assert_eq!(view.protocol(), PROTO_TCP);
        assert_eq!(view.src_addr(), 0x0a01_0203);
        assert_eq!(view.dst_addr(), crate::testutil::DST_ADDR);
        assert_eq!(view.src_port(), crate::testutil::SRC_PORT);
        assert_eq!(view.dst_port(), crate::testutil::DST_PORT);
        assert!(view.is_pure_syn());
        assert!(!view.rst());
        assert!(!view.fin());
    }

    #[test]
    fn syn_ack_is_not_pure_syn() {
        let frame = tcp_frame(0x0a00_0001, TCP_SYN | TCP_ACK);
        let Ok(Parsed::Tcp(view)) = parse(&frame) else {
            panic!("syn-ack frame must parse");
        };
        assert!(!view.is_pure_syn());
    }
}
