//! 프레임 요청/페이로드/핸들 모델.
//!
//! 프레임 추출 서비스에 보내는 요청 본문, 응답 이미지 바이트,
//! 그리고 바이트를 가리키는 불투명 이미지 핸들을 정의한다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::view::View;

/// 프레임 추출 요청 본문 `{video_path, timestamp}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRequest {
    /// 정규화된(`/` 구분자) 영상 경로
    pub video_path: String,
    /// 초 단위 타임스탬프
    pub timestamp: u64,
}

/// 서버가 돌려준 이미지 바이너리
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePayload {
    data: Arc<[u8]>,
    /// 응답 Content-Type (예: "image/jpeg")
    pub content_type: Option<String>,
}

impl FramePayload {
    pub fn new(data: impl Into<Arc<[u8]>>, content_type: Option<String>) -> Self {
        Self {
            data: data.into(),
            content_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 이미지 저장소가 발급한 불투명 핸들.
///
/// 소유자는 핸들이 대체되거나 세션이 끝날 때 `ImageStore::release`로 해제해야 한다.
/// 패스가 다시 실행되면 같은 이미지라도 새 핸들이 발급된다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle {
    id: u64,
}

impl ImageHandle {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// 렌더링 계층에서 쓰는 주소 (`blob:framesync/<id>`)
    pub fn uri(&self) -> String {
        format!("blob:framesync/{}", self.id)
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:framesync/{}", self.id)
    }
}

/// 캐시에 들어가는 프레임 항목, `(index, view)` 키
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    pub index: usize,
    pub view: View,
    pub handle: ImageHandle,
}
