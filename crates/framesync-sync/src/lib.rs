//! # framesync-sync
//!
//! 타임라인-프레임 동기화 엔진.
//! 타임라인 줄마다 타임스탬프를 뽑아 뷰별(top, front) 프레임 요청을 동시에 발행하고,
//! 결과를 `(index, view)` 키의 프레임 캐시에 채운다.
//!
//! - [`dispatcher`] — 요청 하나를 검증/정규화해 포트로 보내고 이미지 핸들로 감싼다
//! - [`image_store`] — 인메모리 이미지 핸들 저장소 (명시적 해제)
//! - [`cache`] — `(index, view)` → 핸들 매핑
//! - [`controller`] — 트리거 처리와 동기화 패스 오케스트레이션
//! - [`event_bus`] — 렌더링 계층용 동기화 이벤트 브로드캐스트

pub mod cache;
pub mod controller;
pub mod dispatcher;
pub mod event_bus;
pub mod image_store;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{FrameCache, FrameSlots};
pub use controller::{PassReport, SyncController, SyncPass};
pub use dispatcher::{normalize_path, FrameDispatcher};
pub use event_bus::{SyncEvent, SyncEventBus};
pub use image_store::InMemoryImageStore;
