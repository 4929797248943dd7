//! 프레임 요청 디스패처.
//!
//! `(path, timestamp, index, view)` 하나를 받아 사전조건을 확인하고,
//! 경로 구분자를 정규화한 뒤 `FrameSource` 포트로 한 번 요청한다.
//! 성공하면 페이로드를 이미지 핸들로 감싸 `FrameEntry`로 돌려준다.
//! 캐시는 건드리지 않는다. 결과 처리는 컨트롤러 몫.

use framesync_core::error::CoreError;
use framesync_core::models::frame::{FrameEntry, FrameRequest};
use framesync_core::models::view::View;
use framesync_core::ports::frame_source::FrameSource;
use framesync_core::ports::image_store::ImageStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// 경로 구분자를 원격 서비스가 기대하는 `/` 형태로 바꾼다
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// 프레임 요청 디스패처
pub struct FrameDispatcher {
    source: Arc<dyn FrameSource>,
    store: Arc<dyn ImageStore>,
}

impl FrameDispatcher {
    pub fn new(source: Arc<dyn FrameSource>, store: Arc<dyn ImageStore>) -> Self {
        Self { source, store }
    }

    /// 프레임 하나 요청.
    ///
    /// 사전조건(`path` 비어있지 않음, `timestamp >= 0`) 위반 시 네트워크 호출 없이
    /// `InvalidRequest`. 포트 실패는 `FrameFetch { view, index, status }`로 바꾼다.
    pub async fn fetch_frame(
        &self,
        path: &str,
        timestamp: i64,
        index: usize,
        view: View,
    ) -> Result<FrameEntry, CoreError> {
        if path.is_empty() {
            return Err(CoreError::InvalidRequest {
                field: "video_path".to_string(),
                message: format!("{view} #{index}: 빈 경로"),
            });
        }
        let timestamp = u64::try_from(timestamp).map_err(|_| CoreError::InvalidRequest {
            field: "timestamp".to_string(),
            message: format!("{view} #{index}: 음수 타임스탬프 {timestamp}"),
        })?;

        let request = FrameRequest {
            video_path: normalize_path(path),
            timestamp,
        };
        debug!(
            "프레임 요청 {view} #{index}: {} @ {}s",
            request.video_path, request.timestamp
        );

        let payload = self.source.extract_frame(&request).await.map_err(|e| {
            warn!("프레임 요청 실패 {view} #{index}: {e}");
            CoreError::FrameFetch {
                view,
                index,
                status: e.status(),
            }
        })?;

        let handle = self.store.allocate(payload);
        debug!("프레임 수신 {view} #{index}: {handle}");
        Ok(FrameEntry {
            index,
            view,
            handle,
        })
    }
}
