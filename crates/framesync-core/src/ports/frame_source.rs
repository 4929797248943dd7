//! 프레임 추출 서비스 포트.
//!
//! 구현: `framesync-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::{FramePayload, FrameRequest};

/// 외부 프레임 추출 서비스
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// 요청 하나를 보내고 이미지 바이너리를 받는다.
    ///
    /// 재시도하지 않는다. 2xx 이외 응답은 `CoreError::HttpStatus`,
    /// 전송 계층 실패는 `CoreError::Network`로 돌려준다.
    async fn extract_frame(&self, request: &FrameRequest) -> Result<FramePayload, CoreError>;
}
