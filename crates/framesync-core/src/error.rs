//! framesync 핵심 에러 타입.
//!
//! 모든 라이브러리 crate는 `Result<_, CoreError>`를 반환한다.
//! 바이너리(`framesync-app`)만 `anyhow`로 감싼다.

use thiserror::Error;

use crate::models::view::View;

/// 코어 레이어 에러.
///
/// 타임라인 파싱, 프레임 요청, 편집 세션, 설정 등 도메인 공통 에러를 정의한다.
/// 어떤 변형도 프로세스에 치명적이지 않다. 최악의 경우 미완성 UI로 끝난다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// 네트워크 에러 (연결 실패, 서버 도달 불가)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 2xx 이외의 응답 상태 (본문은 무시)
    #[error("서버 응답 실패: HTTP {status}")]
    HttpStatus {
        /// HTTP 상태 코드
        status: u16,
    },

    /// 타임라인 줄에서 `M:SS` 토큰을 찾지 못함
    #[error("타임스탬프 없음: {line:?}")]
    NoTimestampFound {
        /// 원본 줄 텍스트
        line: String,
    },

    /// 파싱은 됐으나 사용할 수 없는 타임스탬프 (음수, 오버플로)
    #[error("잘못된 타임스탬프: {0}")]
    InvalidTimestamp(String),

    /// 프레임 요청 사전조건 위반 (네트워크 호출 없음)
    #[error("잘못된 프레임 요청 ({field}): {message}")]
    InvalidRequest {
        /// 위반한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 프레임 추출 실패 (`status`가 None이면 전송 계층 실패)
    #[error("프레임 추출 실패: {view} #{index} (status={status:?})")]
    FrameFetch {
        view: View,
        index: usize,
        status: Option<u16>,
    },

    /// 존재하지 않는 타임라인 줄
    #[error("타임라인 줄 범위 초과: index={index}, len={len}")]
    LineOutOfRange { index: usize, len: usize },

    /// 다른 줄을 이미 편집 중
    #[error("이미 편집 중인 줄이 있음: index={active}")]
    EditInProgress { active: usize },

    /// 활성 편집 세션 없음
    #[error("활성 편집 세션 없음")]
    NoActiveEdit,

    /// 저장 대상 인덱스가 편집 중인 인덱스와 다름
    #[error("편집 인덱스 불일치: active={active}, requested={requested}")]
    EditIndexMismatch { active: usize, requested: usize },
}

impl CoreError {
    /// 프레임 요청 단위의 실패인지 (슬롯을 비워두고 계속 진행)
    pub fn is_slot_failure(&self) -> bool {
        matches!(
            self,
            CoreError::FrameFetch { .. }
                | CoreError::InvalidRequest { .. }
                | CoreError::Network(_)
                | CoreError::HttpStatus { .. }
        )
    }

    /// 서버가 돌려준 HTTP 상태 코드 (있을 때만)
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::HttpStatus { status } => Some(*status),
            CoreError::FrameFetch { status, .. } => *status,
            _ => None,
        }
    }
}
