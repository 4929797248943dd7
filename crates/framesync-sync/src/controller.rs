//! 동기화 컨트롤러.
//!
//! 타임라인 모델과 뷰 경로를 들고 있다가 트리거(새 분석 결과, 경로 확보,
//! 명시적 재실행)가 오면 동기화 패스를 돌린다. 패스는 줄마다 타임스탬프를
//! 파싱하고 뷰별 요청을 각각 독립 태스크로 발행한다. 완료 순서대로 캐시에
//! 기록되며(last-write-wins) 대체된 핸들은 즉시 해제된다.
//!
//! 취소 토큰은 없다. 이전 패스의 요청은 새 패스가 시작돼도 계속 진행되고,
//! 기본 설정에서는 그 완료도 캐시에 기록된다.

use chrono::{DateTime, Utc};
use framesync_core::config::SyncConfig;
use framesync_core::error::CoreError;
use framesync_core::models::analysis::AnalysisResult;
use framesync_core::models::frame::{FrameEntry, ImageHandle};
use framesync_core::models::timeline::TimelineLine;
use framesync_core::models::view::{View, ViewPaths};
use framesync_core::ports::frame_source::FrameSource;
use framesync_core::ports::image_store::ImageStore;
use framesync_timeline::{parse_timestamp, EditSession, LineEditor, TimelineModel};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::FrameCache;
use crate::dispatcher::FrameDispatcher;
use crate::event_bus::{SyncEvent, SyncEventBus};

/// 한 패스의 결과 요약
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub pass_id: u64,
    /// 패스 시작 시점의 타임라인 세대
    pub generation: u64,
    /// 발행한 프레임 요청 수 (정상 줄 × 2)
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 타임스탬프가 없어 건너뛴 줄 수
    pub skipped: usize,
    /// 더 새로운 패스 때문에 버려진 완료 수 (`discard_stale_completions`일 때만)
    pub discarded: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// 실행 중인 패스 핸들. drop해도 요청은 취소되지 않는다
#[derive(Debug)]
pub struct SyncPass {
    pub pass_id: u64,
    pub generation: u64,
    handle: JoinHandle<PassReport>,
}

impl SyncPass {
    /// 패스의 모든 요청이 정착할 때까지 대기
    pub async fn wait(self) -> Result<PassReport, CoreError> {
        self.handle
            .await
            .map_err(|e| CoreError::Internal(format!("동기화 패스 태스크 실패: {e}")))
    }
}

/// 슬롯 요청 하나의 결말
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotOutcome {
    Filled,
    Failed,
    Discarded,
}

/// 요청 태스크들이 공유하는 상태
struct Shared {
    dispatcher: FrameDispatcher,
    store: Arc<dyn ImageStore>,
    cache: Arc<Mutex<FrameCache>>,
    events: SyncEventBus,
    limiter: Option<Semaphore>,
    current_pass: AtomicU64,
    discard_stale: bool,
    /// `shutdown` 이후 true. 캐시 락을 쥔 채로 바꾼다
    closed: AtomicBool,
}

impl Shared {
    async fn fetch_slot(
        &self,
        pass_id: u64,
        path: String,
        timestamp: i64,
        index: usize,
        view: View,
    ) -> SlotOutcome {
        // 세마포어는 닫지 않으므로 acquire 실패는 없다
        let _permit = match &self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        };

        match self
            .dispatcher
            .fetch_frame(&path, timestamp, index, view)
            .await
        {
            Ok(entry) => self.complete(pass_id, entry),
            Err(e) => {
                if e.is_slot_failure() {
                    warn!("슬롯 비워둠 (pass {pass_id}): {e}");
                } else {
                    error!("슬롯 요청 중 예상치 못한 에러 (pass {pass_id}): {e}");
                }
                self.events.publish(SyncEvent::FrameFailed {
                    pass_id,
                    index,
                    view,
                    status: e.status(),
                });
                SlotOutcome::Failed
            }
        }
    }

    fn complete(&self, pass_id: u64, entry: FrameEntry) -> SlotOutcome {
        if self.discard_stale && self.current_pass.load(Ordering::SeqCst) != pass_id {
            debug!(
                "이전 패스 완료 폐기 (pass {pass_id}): {} #{}",
                entry.view, entry.index
            );
            self.store.release(&entry.handle);
            return SlotOutcome::Discarded;
        }

        let (index, view, handle) = (entry.index, entry.view, entry.handle.clone());
        let superseded = {
            let mut cache = self.cache.lock();
            if self.closed.load(Ordering::SeqCst) {
                drop(cache);
                debug!("세션 종료 후 도착한 완료 폐기 (pass {pass_id}): {view} #{index}");
                self.store.release(&handle);
                return SlotOutcome::Discarded;
            }
            cache.insert(entry)
        };
        if let Some(old) = superseded {
            self.store.release(&old);
        }

        self.events.publish(SyncEvent::FrameReady {
            pass_id,
            index,
            view,
            handle,
        });
        SlotOutcome::Filled
    }
}

/// 타임라인-프레임 동기화 컨트롤러
pub struct SyncController {
    shared: Arc<Shared>,
    timeline: Arc<RwLock<TimelineModel>>,
    paths: RwLock<Option<ViewPaths>>,
}

impl SyncController {
    pub fn new(
        source: Arc<dyn FrameSource>,
        store: Arc<dyn ImageStore>,
        config: &SyncConfig,
    ) -> Self {
        let limiter = config
            .max_concurrent_fetches
            .filter(|n| *n > 0)
            .map(Semaphore::new);

        Self {
            shared: Arc::new(Shared {
                dispatcher: FrameDispatcher::new(source, Arc::clone(&store)),
                store,
                cache: Arc::new(Mutex::new(FrameCache::new())),
                events: SyncEventBus::new(config.event_capacity),
                limiter,
                current_pass: AtomicU64::new(0),
                discard_stale: config.discard_stale_completions,
                closed: AtomicBool::new(false),
            }),
            timeline: Arc::new(RwLock::new(TimelineModel::new())),
            paths: RwLock::new(None),
        }
    }

    /// 새 분석 결과 수신.
    ///
    /// 통합 타임라인이 있으면 모델을 통째로 교체하고, 뷰 경로를 다시 읽는다.
    /// 두 경로가 모두 있고 타임라인이 교체됐거나 경로가 바뀌었으면 패스를 시작한다.
    /// Tokio 런타임 안에서 호출해야 한다.
    pub fn apply_analysis(&self, result: &AnalysisResult) -> Option<SyncPass> {
        let replaced = match result.timeline_text() {
            Some(text) => {
                let generation = self.timeline.write().replace_all(text);
                debug!("타임라인 교체: generation={generation}");
                true
            }
            None => false,
        };

        let paths = result.view_paths();
        if paths.is_none() {
            let has_top = result
                .separated_videos
                .top
                .as_deref()
                .is_some_and(|p| !p.is_empty());
            let has_front = result
                .separated_videos
                .front
                .as_deref()
                .is_some_and(|p| !p.is_empty());
            warn!("분리된 뷰 경로 누락 (top={has_top}, front={has_front}); 패스 보류");
            self.shared
                .events
                .publish(SyncEvent::MissingViewPaths { has_top, has_front });
        }
        let paths_changed = {
            let mut current = self.paths.write();
            let changed = *current != paths;
            *current = paths;
            changed
        };

        if !replaced && !paths_changed {
            debug!("타임라인과 뷰 경로 모두 그대로, 패스 생략");
            return None;
        }
        self.start_pass()
    }

    /// 뷰 경로 갱신. 경로가 새로 확보(또는 변경)되고 타임라인이 비어있지 않으면 패스 시작
    pub fn set_view_paths(&self, paths: ViewPaths) -> Option<SyncPass> {
        {
            let mut current = self.paths.write();
            if current.as_ref() == Some(&paths) {
                debug!("뷰 경로 변화 없음, 패스 생략");
                return None;
            }
            *current = Some(paths);
        }

        if self.timeline.read().is_empty() {
            return None;
        }
        self.start_pass()
    }

    /// 현재 입력으로 패스 재실행
    pub fn resync(&self) -> Option<SyncPass> {
        self.start_pass()
    }

    fn start_pass(&self) -> Option<SyncPass> {
        if self.shared.closed.load(Ordering::SeqCst) {
            warn!("종료된 세션, 패스 생략");
            return None;
        }
        let Some(paths) = self.paths.read().clone() else {
            debug!("뷰 경로 없음, 패스 생략");
            return None;
        };
        let (generation, lines): (u64, Vec<TimelineLine>) = {
            let timeline = self.timeline.read();
            (timeline.generation(), timeline.lines().to_vec())
        };

        let shared = &self.shared;
        let pass_id = shared.current_pass.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = Utc::now();
        info!(
            "동기화 패스 시작: pass={pass_id}, generation={generation}, lines={}",
            lines.len()
        );
        shared.events.publish(SyncEvent::PassStarted {
            pass_id,
            generation,
            lines: lines.len(),
        });

        let mut tasks = Vec::with_capacity(lines.len() * View::ALL.len());
        let mut skipped = 0;
        for line in &lines {
            let timestamp = match parse_timestamp(&line.text).and_then(|parsed| {
                i64::try_from(parsed.seconds)
                    .map_err(|_| CoreError::InvalidTimestamp(parsed.raw.clone()))
            }) {
                Ok(ts) => ts,
                Err(e) => {
                    warn!("줄 {} 건너뜀: {e}", line.index);
                    skipped += 1;
                    shared.events.publish(SyncEvent::LineSkipped {
                        pass_id,
                        index: line.index,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for view in View::ALL {
                let task_shared = Arc::clone(shared);
                let path = paths.get(view).to_string();
                let index = line.index;
                tasks.push(tokio::spawn(async move {
                    task_shared
                        .fetch_slot(pass_id, path, timestamp, index, view)
                        .await
                }));
            }
        }

        let supervisor_shared = Arc::clone(shared);
        let handle = tokio::spawn(async move {
            let requested = tasks.len();
            let mut report = PassReport {
                pass_id,
                generation,
                requested,
                succeeded: 0,
                failed: 0,
                skipped,
                discarded: 0,
                started_at,
                finished_at: started_at,
            };

            for outcome in join_all(tasks).await {
                match outcome {
                    Ok(SlotOutcome::Filled) => report.succeeded += 1,
                    Ok(SlotOutcome::Failed) => report.failed += 1,
                    Ok(SlotOutcome::Discarded) => report.discarded += 1,
                    Err(e) => {
                        warn!("프레임 요청 태스크 비정상 종료 (pass {pass_id}): {e}");
                        report.failed += 1;
                    }
                }
            }
            report.finished_at = Utc::now();

            info!(
                "동기화 패스 완료: pass={pass_id}, 요청={}, 성공={}, 실패={}, 건너뜀={}, 폐기={}",
                report.requested, report.succeeded, report.failed, report.skipped, report.discarded
            );
            supervisor_shared
                .events
                .publish(SyncEvent::PassCompleted(report.clone()));
            report
        });

        Some(SyncPass {
            pass_id,
            generation,
            handle,
        })
    }

    // ============================================================
    // 편집
    // ============================================================

    /// 공유 모델 기준으로 편집 시작
    pub fn editor_begin(
        &self,
        editor: &mut LineEditor,
        index: usize,
    ) -> Result<EditSession, CoreError> {
        let timeline = self.timeline.read();
        editor.begin_edit(&timeline, index).cloned()
    }

    /// 편집 저장. 모델의 해당 줄만 바뀌고 캐시와 패스는 건드리지 않는다
    pub fn editor_save(
        &self,
        editor: &mut LineEditor,
        index: usize,
    ) -> Result<TimelineLine, CoreError> {
        let mut timeline = self.timeline.write();
        editor.save(&mut timeline, index)
    }

    // ============================================================
    // 조회
    // ============================================================

    pub fn frame(&self, index: usize, view: View) -> Option<ImageHandle> {
        self.shared.cache.lock().get(index, view).cloned()
    }

    pub fn cache_snapshot(&self) -> FrameCache {
        self.shared.cache.lock().clone()
    }

    pub fn timeline(&self) -> Arc<RwLock<TimelineModel>> {
        Arc::clone(&self.timeline)
    }

    pub fn timeline_snapshot(&self) -> TimelineModel {
        self.timeline.read().clone()
    }

    pub fn view_paths(&self) -> Option<ViewPaths> {
        self.paths.read().clone()
    }

    pub fn image_store(&self) -> Arc<dyn ImageStore> {
        Arc::clone(&self.shared.store)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.shared.events.subscribe()
    }

    /// 세션 종료. 캐시를 비우고 모든 핸들을 해제한다. 해제한 핸들 수 반환.
    ///
    /// 아직 진행 중인 요청은 끝나는 대로 핸들을 해제하고 캐시에 쓰지 않는다.
    pub fn shutdown(&self) -> usize {
        let handles = {
            let mut cache = self.shared.cache.lock();
            self.shared.closed.store(true, Ordering::SeqCst);
            cache.drain_handles()
        };
        let released = handles
            .iter()
            .filter(|handle| self.shared.store.release(handle))
            .count();
        info!("세션 종료: 이미지 핸들 {released}개 해제");
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_store::InMemoryImageStore;
    use crate::testing::ScriptedSource;
    use assert_matches::assert_matches;
    use framesync_core::models::analysis::{CombinedResult, SeparatedVideos};

    fn analysis(top: &str, front: &str, timeline: &str) -> AnalysisResult {
        AnalysisResult {
            filename: "match.mp4".to_string(),
            separated_videos: SeparatedVideos {
                top: Some(top.to_string()),
                front: Some(front.to_string()),
            },
            combined_result: Some(CombinedResult {
                summary: String::new(),
                timeline: timeline.to_string(),
            }),
            ..Default::default()
        }
    }

    fn controller(
        source: &Arc<ScriptedSource>,
        config: SyncConfig,
    ) -> (SyncController, Arc<InMemoryImageStore>) {
        let store = Arc::new(InMemoryImageStore::new());
        let controller = SyncController::new(source.clone(), store.clone(), &config);
        (controller, store)
    }

    fn bytes_at(
        controller: &SyncController,
        store: &InMemoryImageStore,
        index: usize,
        view: View,
    ) -> Option<Vec<u8>> {
        let handle = controller.frame(index, view)?;
        store.resolve(&handle).map(|p| p.bytes().to_vec())
    }

    #[tokio::test]
    async fn end_to_end_two_lines_four_requests() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, store) = controller(&source, SyncConfig::default());

        let pass = controller
            .apply_analysis(&analysis(
                r"C:\v\top.mp4",
                r"C:\v\front.mp4",
                "0:00 start\n1:05 pickup\n",
            ))
            .unwrap();
        let report = pass.wait().await.unwrap();

        assert_eq!(report.requested, 4);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.skipped, 0);

        let mut calls: Vec<(String, u64)> = source
            .calls()
            .into_iter()
            .map(|r| (r.video_path, r.timestamp))
            .collect();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("C:/v/front.mp4".to_string(), 1),
                ("C:/v/front.mp4".to_string(), 65),
                ("C:/v/top.mp4".to_string(), 1),
                ("C:/v/top.mp4".to_string(), 65),
            ]
        );

        assert_eq!(controller.cache_snapshot().filled_slots(), 4);
        assert_eq!(
            bytes_at(&controller, &store, 1, View::Front).unwrap(),
            b"C:/v/front.mp4@65"
        );
        assert_eq!(store.live_count(), 4);
    }

    #[tokio::test]
    async fn lines_without_timestamp_are_skipped() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, _store) = controller(&source, SyncConfig::default());
        let mut rx = controller.subscribe();

        let report = controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", "intro\n0:30 kickoff\nno time here"))
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(report.skipped, 2);
        assert_eq!(report.requested, 2);
        assert!(controller.cache_snapshot().slots(0).is_none());
        assert_eq!(controller.cache_snapshot().slots(1).unwrap().filled(), 2);

        let mut skipped = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SyncEvent::LineSkipped { index, .. } = event {
                skipped.push(index);
            }
        }
        skipped.sort();
        assert_eq!(skipped, vec![0, 2]);
    }

    #[tokio::test]
    async fn one_failed_slot_does_not_block_the_rest() {
        let source = Arc::new(ScriptedSource::new());
        source.fail_with("t.mp4", 180, Some(500));
        let (controller, _store) = controller(&source, SyncConfig::default());

        let timeline = "0:10 a\n0:20 b\n0:30 c\n3:00 d\n3:10 e";
        let report = controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", timeline))
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 9);
        assert!(controller.frame(3, View::Top).is_none());
        assert!(controller.frame(3, View::Front).is_some());
        for index in [0, 1, 2, 4] {
            assert!(controller.frame(index, View::Top).is_some());
            assert!(controller.frame(index, View::Front).is_some());
        }
    }

    #[tokio::test]
    async fn late_completion_of_old_pass_wins_by_default() {
        let source = Arc::new(ScriptedSource::new());
        source.hold_paths_starting_with("held/");
        let (controller, store) = controller(&source, SyncConfig::default());

        let first = controller
            .apply_analysis(&analysis("held/t.mp4", "held/f.mp4", "0:10 a"))
            .unwrap();
        let second = controller
            .apply_analysis(&analysis("fast/t.mp4", "fast/f.mp4", "0:20 b"))
            .unwrap();
        second.wait().await.unwrap();
        assert_eq!(
            bytes_at(&controller, &store, 0, View::Top).unwrap(),
            b"fast/t.mp4@20"
        );

        source.open_gate();
        let report = first.wait().await.unwrap();
        assert_eq!(report.succeeded, 2);

        // 완료 순서 기준 last-write-wins
        assert_eq!(
            bytes_at(&controller, &store, 0, View::Top).unwrap(),
            b"held/t.mp4@10"
        );
        assert_eq!(store.live_count(), 2);
    }

    #[tokio::test]
    async fn stale_guard_keeps_newest_pass() {
        let source = Arc::new(ScriptedSource::new());
        source.hold_paths_starting_with("held/");
        let config = SyncConfig {
            discard_stale_completions: true,
            ..SyncConfig::default()
        };
        let (controller, store) = controller(&source, config);

        let first = controller
            .apply_analysis(&analysis("held/t.mp4", "held/f.mp4", "0:10 a"))
            .unwrap();
        let second = controller
            .apply_analysis(&analysis("fast/t.mp4", "fast/f.mp4", "0:20 b"))
            .unwrap();
        second.wait().await.unwrap();

        source.open_gate();
        let report = first.wait().await.unwrap();
        assert_eq!(report.discarded, 2);
        assert_eq!(report.succeeded, 0);

        assert_eq!(
            bytes_at(&controller, &store, 0, View::Front).unwrap(),
            b"fast/f.mp4@20"
        );
        assert_eq!(store.live_count(), 2);
    }

    #[tokio::test]
    async fn rerun_with_same_inputs_gives_same_images() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, store) = controller(&source, SyncConfig::default());

        controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", "0:10 a\n0:20 b"))
            .unwrap()
            .wait()
            .await
            .unwrap();
        let before_handle = controller.frame(1, View::Top).unwrap();
        let before = bytes_at(&controller, &store, 1, View::Top);

        controller.resync().unwrap().wait().await.unwrap();

        assert_eq!(bytes_at(&controller, &store, 1, View::Top), before);
        assert_ne!(controller.frame(1, View::Top).unwrap(), before_handle);
        // 대체된 핸들은 해제됨
        assert!(store.resolve(&before_handle).is_none());
        assert_eq!(store.live_count(), 4);
    }

    #[tokio::test]
    async fn edit_round_trip_leaves_cache_untouched() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, _store) = controller(&source, SyncConfig::default());
        controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", "0:10 a\n0:20 b"))
            .unwrap()
            .wait()
            .await
            .unwrap();
        let cache_before = controller.cache_snapshot();
        let calls_before = source.calls().len();

        let mut editor = LineEditor::new();
        let session = controller.editor_begin(&mut editor, 1).unwrap();
        assert_eq!(session.draft_text, "0:20 b");
        editor.change_draft("9:59 moved", 4, 4).unwrap();
        let saved = controller.editor_save(&mut editor, 1).unwrap();
        assert_eq!(saved.text, "9:59 moved");

        tokio::task::yield_now().await;
        assert_eq!(controller.cache_snapshot(), cache_before);
        assert_eq!(source.calls().len(), calls_before);

        let timeline = controller.timeline_snapshot();
        assert_eq!(timeline.get(0).unwrap().text, "0:10 a");
        assert_eq!(timeline.get(1).unwrap().text, "9:59 moved");
    }

    #[tokio::test]
    async fn editor_rejects_second_line_while_editing() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, _store) = controller(&source, SyncConfig::default());
        controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", "0:10 a\n0:20 b"))
            .unwrap()
            .wait()
            .await
            .unwrap();

        let mut editor = LineEditor::new();
        controller.editor_begin(&mut editor, 0).unwrap();
        assert_matches!(
            controller.editor_begin(&mut editor, 1),
            Err(CoreError::EditInProgress { active: 0 })
        );
    }

    #[tokio::test]
    async fn missing_path_defers_pass_until_paths_arrive() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, _store) = controller(&source, SyncConfig::default());
        let mut rx = controller.subscribe();

        let mut result = analysis("t.mp4", "", "0:10 a");
        result.separated_videos.front = None;
        assert!(controller.apply_analysis(&result).is_none());
        assert!(source.calls().is_empty());
        assert_eq!(
            rx.try_recv().unwrap(),
            SyncEvent::MissingViewPaths {
                has_top: true,
                has_front: false
            }
        );

        let paths = ViewPaths::new("t.mp4", "f.mp4");
        let report = controller
            .set_view_paths(paths.clone())
            .unwrap()
            .wait()
            .await
            .unwrap();
        assert_eq!(report.requested, 2);

        assert!(controller.set_view_paths(paths).is_none());
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn analysis_without_timeline_keeps_previous_lines() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, _store) = controller(&source, SyncConfig::default());
        controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", "0:10 a"))
            .unwrap()
            .wait()
            .await
            .unwrap();
        let generation = controller.timeline_snapshot().generation();

        let mut result = analysis("t.mp4", "f.mp4", "");
        result.combined_result = None;
        assert!(controller.apply_analysis(&result).is_none());
        assert_eq!(source.calls().len(), 2);
        assert_eq!(controller.timeline_snapshot().generation(), generation);
        assert_eq!(controller.timeline_snapshot().len(), 1);

        // 경로가 바뀌면 기존 타임라인으로 패스
        let mut moved = analysis("t2.mp4", "f2.mp4", "");
        moved.combined_result = None;
        let report = controller.apply_analysis(&moved).unwrap().wait().await.unwrap();
        assert_eq!(report.generation, generation);
        assert_eq!(report.requested, 2);
    }

    #[tokio::test]
    async fn completions_after_shutdown_are_released() {
        let source = Arc::new(ScriptedSource::new());
        source.hold_paths_starting_with("held/");
        let (controller, store) = controller(&source, SyncConfig::default());

        let pass = controller
            .apply_analysis(&analysis("held/t.mp4", "held/f.mp4", "0:10 a"))
            .unwrap();
        tokio::task::yield_now().await;

        assert_eq!(controller.shutdown(), 0);
        source.open_gate();
        let report = pass.wait().await.unwrap();

        assert_eq!(report.discarded, 2);
        assert_eq!(report.succeeded, 0);
        assert_eq!(store.live_count(), 0);
        assert!(controller.cache_snapshot().is_empty());
        assert!(controller.resync().is_none());
    }

    #[tokio::test]
    async fn concurrency_cap_limits_in_flight_requests() {
        let source = Arc::new(ScriptedSource::new());
        let config = SyncConfig {
            max_concurrent_fetches: Some(1),
            ..SyncConfig::default()
        };
        let (controller, _store) = controller(&source, config);

        let report = controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", "0:10 a\n0:20 b\n0:30 c"))
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(report.succeeded, 6);
        assert_eq!(source.peak_in_flight(), 1);
    }

    #[tokio::test]
    async fn pass_completed_event_carries_report() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, _store) = controller(&source, SyncConfig::default());
        let mut rx = controller.subscribe();

        let report = controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", "0:10 a"))
            .unwrap()
            .wait()
            .await
            .unwrap();

        let mut completed = None;
        while let Ok(event) = rx.try_recv() {
            if let SyncEvent::PassCompleted(r) = event {
                completed = Some(r);
            }
        }
        assert_eq!(completed, Some(report));
    }

    #[tokio::test]
    async fn shutdown_releases_every_handle() {
        let source = Arc::new(ScriptedSource::new());
        let (controller, store) = controller(&source, SyncConfig::default());
        controller
            .apply_analysis(&analysis("t.mp4", "f.mp4", "0:10 a\n0:20 b"))
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(controller.shutdown(), 4);
        assert_eq!(store.live_count(), 0);
        assert!(controller.cache_snapshot().is_empty());
    }
}
