//! 이미지 핸들 저장소 포트.
//!
//! 구현: `framesync-sync::image_store::InMemoryImageStore`

use crate::models::frame::{FramePayload, ImageHandle};

/// 프레임 바이너리를 보관하고 불투명 핸들을 발급한다.
///
/// 핸들은 명시적으로 해제할 때까지 살아있다. 자동 회수는 없다.
pub trait ImageStore: Send + Sync {
    /// 페이로드를 보관하고 새 핸들 발급
    fn allocate(&self, payload: FramePayload) -> ImageHandle;

    /// 핸들 해제. 살아있던 핸들이면 true
    fn release(&self, handle: &ImageHandle) -> bool;

    /// 핸들이 가리키는 페이로드
    fn resolve(&self, handle: &ImageHandle) -> Option<FramePayload>;

    /// 해제되지 않은 핸들 수
    fn live_count(&self) -> usize;
}
