//! 동기화 이벤트 버스.
//!
//! `tokio::broadcast` 기반. 렌더링 계층(CLI, UI)이 구독해 슬롯별 진행 상황을 그린다.

use framesync_core::models::frame::ImageHandle;
use framesync_core::models::view::View;
use tokio::sync::broadcast;
use tracing::debug;

use crate::controller::PassReport;

/// 동기화 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// 패스 시작
    PassStarted {
        pass_id: u64,
        generation: u64,
        lines: usize,
    },
    /// 타임스탬프가 없거나 쓸 수 없는 줄 (요청 없음)
    LineSkipped {
        pass_id: u64,
        index: usize,
        reason: String,
    },
    /// 슬롯 채워짐
    FrameReady {
        pass_id: u64,
        index: usize,
        view: View,
        handle: ImageHandle,
    },
    /// 슬롯 요청 실패. 슬롯은 로딩 상태로 남음
    FrameFailed {
        pass_id: u64,
        index: usize,
        view: View,
        status: Option<u16>,
    },
    /// 패스의 모든 요청이 정착됨
    PassCompleted(PassReport),
    /// 분석 결과에 뷰 경로가 하나 이상 빠짐, 패스 보류
    MissingViewPaths { has_top: bool, has_front: bool },
}

/// 동기화 이벤트 버스
pub struct SyncEventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl SyncEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// 이벤트 발행 (구독자가 없으면 버림)
    pub fn publish(&self, event: SyncEvent) {
        debug!("동기화 이벤트: {:?}", std::mem::discriminant(&event));
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }
}

impl Default for SyncEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
