//! 한 번의 CLI 실행 = 한 세션.
//!
//! 컨트롤러와 이미지 저장소를 묶어 분석 결과 적용, 줄 편집, 렌더링,
//! 프레임 저장, 종료(핸들 해제)까지 순서대로 진행한다.

use framesync_core::config::SyncConfig;
use framesync_core::error::CoreError;
use framesync_core::models::analysis::AnalysisResult;
use framesync_core::ports::frame_source::FrameSource;
use framesync_sync::{InMemoryImageStore, PassReport, SyncController};
use framesync_timeline::LineEditor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::export::export_frames;
use crate::render::render_session;

/// `--edit INDEX=TEXT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub index: usize,
    pub text: String,
}

impl FromStr for LineEdit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, text) = s
            .split_once('=')
            .ok_or_else(|| format!("INDEX=TEXT 형식이 아님: {s:?}"))?;
        let index = index
            .trim()
            .parse()
            .map_err(|e| format!("잘못된 줄 인덱스 {index:?}: {e}"))?;
        Ok(Self {
            index,
            text: text.to_string(),
        })
    }
}

pub struct Session {
    controller: SyncController,
    store: Arc<InMemoryImageStore>,
}

impl Session {
    pub fn new(source: Arc<dyn FrameSource>, config: &SyncConfig) -> Self {
        let store = Arc::new(InMemoryImageStore::new());
        let controller = SyncController::new(source, store.clone(), config);
        Self { controller, store }
    }

    /// 분석 결과 적용 후 패스 완료까지 대기. 뷰 경로가 없으면 패스 없이 None
    pub async fn sync(
        &self,
        analysis: &AnalysisResult,
    ) -> Result<Option<PassReport>, CoreError> {
        match self.controller.apply_analysis(analysis) {
            Some(pass) => pass.wait().await.map(Some),
            None => Ok(None),
        }
    }

    /// 편집을 차례로 적용. 실패한 편집은 건너뛰고, 적용된 개수 반환
    pub fn apply_edits(&self, edits: &[LineEdit]) -> usize {
        let mut editor = LineEditor::new();
        let mut applied = 0;
        for edit in edits {
            if let Err(e) = self.apply_edit(&mut editor, edit) {
                warn!("줄 {} 편집 실패: {e}", edit.index);
                editor.cancel();
                continue;
            }
            applied += 1;
        }
        applied
    }

    fn apply_edit(&self, editor: &mut LineEditor, edit: &LineEdit) -> Result<(), CoreError> {
        self.controller.editor_begin(editor, edit.index)?;
        let end = edit.text.chars().count();
        editor.change_draft(edit.text.clone(), end, end)?;
        let line = self.controller.editor_save(editor, edit.index)?;
        info!("줄 {} 수정: {:?}", line.index, line.text);
        Ok(())
    }

    pub fn render(&self, analysis: &AnalysisResult) -> String {
        render_session(
            analysis,
            &self.controller.timeline_snapshot(),
            &self.controller.cache_snapshot(),
        )
    }

    pub fn export(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, CoreError> {
        export_frames(
            self.store.as_ref(),
            &self.controller.cache_snapshot(),
            dir,
            extension,
        )
    }

    /// 세션 종료. 모든 이미지 핸들 해제
    pub fn close(self) -> usize {
        self.controller.shutdown()
    }

    #[cfg(test)]
    fn live_images(&self) -> usize {
        use framesync_core::ports::image_store::ImageStore;
        self.store.live_count()
    }
}
