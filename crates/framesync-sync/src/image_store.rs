//! 인메모리 이미지 저장소.
//!
//! 브라우저의 object URL처럼 바이너리를 보관하고 `blob:framesync/<id>` 핸들을 발급한다.
//! 핸들은 `release`를 부를 때까지 회수되지 않는다.

use framesync_core::models::frame::{FramePayload, ImageHandle};
use framesync_core::ports::image_store::ImageStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// `ImageStore` 포트 구현
#[derive(Debug)]
pub struct InMemoryImageStore {
    next_id: AtomicU64,
    images: Mutex<HashMap<u64, FramePayload>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            images: Mutex::new(HashMap::new()),
        }
    }

    /// 살아있는 모든 핸들 해제 (세션 종료). 해제한 수 반환
    pub fn release_all(&self) -> usize {
        let mut images = self.images.lock();
        let count = images.len();
        images.clear();
        debug!("이미지 핸들 전체 해제: {count}개");
        count
    }

    /// 보관 중인 바이트 총량
    pub fn total_bytes(&self) -> usize {
        self.images.lock().values().map(FramePayload::len).sum()
    }
}

impl Default for InMemoryImageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageStore for InMemoryImageStore {
    fn allocate(&self, payload: FramePayload) -> ImageHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.images.lock().insert(id, payload);
        ImageHandle::new(id)
    }

    fn release(&self, handle: &ImageHandle) -> bool {
        let released = self.images.lock().remove(&handle.id()).is_some();
        if !released {
            debug!("이미 해제된 핸들: {handle}");
        }
        released
    }

    fn resolve(&self, handle: &ImageHandle) -> Option<FramePayload> {
        self.images.lock().get(&handle.id()).cloned()
    }

    fn live_count(&self) -> usize {
        self.images.lock().len()
    }
}
