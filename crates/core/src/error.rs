//! 에러 타입 — 도메인별 에러 정의

/// Synwall 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SynwallError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 패킷 헤더 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 플로우 테이블 에러
    #[error("flow table error: {0}")]
    FlowTable(#[from] FlowTableError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 패킷 헤더 파싱 에러
///
/// 공격자가 통제하는 입력에서 발생하므로 절대 패닉으로 이어지면 안 됩니다.
/// 호출자의 정책은 해당 프레임을 필터링 없이 통과시키는 것입니다.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 프레임이 선언된 헤더를 담기에 너무 짧음
    #[error("frame truncated at offset {offset}: need {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    /// IPv4 헤더 길이 필드가 최소 헤더보다 작음
    #[error("ipv4 header length {declared} below minimum {minimum}")]
    HeaderLength { declared: usize, minimum: usize },
}

/// 플로우 테이블 에러
#[derive(Debug, thiserror::Error)]
pub enum FlowTableError {
    /// 테이블이 용량 한계에 도달하여 새 플로우를 추적할 수 없음
    ///
    /// 원본 설계는 이 경우를 조용히 무시했으나, 여기서는 명시적으로
    /// 표면화하여 엔진이 fail-open 정책을 적용하도록 합니다.
    #[error("flow table full: capacity {capacity}")]
    TableFull { capacity: usize },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 이미 실행 중인 파이프라인을 다시 시작하려 함
    #[error("pipeline already running")]
    AlreadyRunning,

    /// 실행 중이 아닌 파이프라인을 정지하려 함
    #[error("pipeline not running")]
    NotRunning,

    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),
}
