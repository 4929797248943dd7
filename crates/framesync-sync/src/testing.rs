//! 테스트용 `FrameSource` 구현.

use async_trait::async_trait;
use framesync_core::error::CoreError;
use framesync_core::models::frame::{FramePayload, FrameRequest};
use framesync_core::ports::frame_source::FrameSource;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

/// 스크립트로 동작을 정하는 프레임 소스.
///
/// - 응답 바이트는 `"<video_path>@<timestamp>"`
/// - `fail_with`로 지정한 요청은 실패 (status None이면 네트워크 에러)
/// - `hold_prefix`로 시작하는 경로는 `open_gate` 전까지 대기
pub(crate) struct ScriptedSource {
    calls: Mutex<Vec<FrameRequest>>,
    failures: Mutex<HashMap<(String, u64), Option<u16>>>,
    hold_prefix: Mutex<Option<String>>,
    gate: watch::Sender<bool>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            hold_prefix: Mutex::new(None),
            gate,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_with(&self, path: &str, timestamp: u64, status: Option<u16>) {
        self.failures
            .lock()
            .insert((path.to_string(), timestamp), status);
    }

    pub(crate) fn hold_paths_starting_with(&self, prefix: &str) {
        *self.hold_prefix.lock() = Some(prefix.to_string());
    }

    pub(crate) fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    pub(crate) fn calls(&self) -> Vec<FrameRequest> {
        self.calls.lock().clone()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn extract_frame(&self, request: &FrameRequest) -> Result<FramePayload, CoreError> {
        self.calls.lock().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let held = self
            .hold_prefix
            .lock()
            .as_deref()
            .is_some_and(|p| request.video_path.starts_with(p));
        if held {
            let mut rx = self.gate.subscribe();
            let _ = rx.wait_for(|open| *open).await;
        }
        tokio::task::yield_now().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self
            .failures
            .lock()
            .get(&(request.video_path.clone(), request.timestamp))
            .copied();
        match failure {
            Some(Some(status)) => Err(CoreError::HttpStatus { status }),
            Some(None) => Err(CoreError::Network("connection refused".to_string())),
            None => Ok(FramePayload::new(
                format!("{}@{}", request.video_path, request.timestamp).into_bytes(),
                Some("image/jpeg".to_string()),
            )),
        }
    }
}
