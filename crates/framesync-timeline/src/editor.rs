//! 줄 편집기.
//!
//! 두 상태를 갖는 상태 머신: `Viewing`(세션 없음) / `Editing`(세션 하나).
//! 초안 텍스트와 함께 캐럿 위치를 기억해, 편집 화면이 내용 갱신마다
//! 같은 위치로 커서를 복원할 수 있게 한다.
//!
//! 편집기는 프레임 캐시를 알지 못한다. 저장은 `TimelineModel::replace_line`만
//! 거치므로 세대가 바뀌지 않고 동기화 패스도 다시 돌지 않는다.

use framesync_core::error::CoreError;
use framesync_core::models::timeline::TimelineLine;
use tracing::debug;

use crate::model::TimelineModel;

/// 캐럿(선택 영역) 위치, 문자 단위 오프셋
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub start: usize,
    pub end: usize,
}

/// 활성 편집 세션
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub index: usize,
    pub draft_text: String,
    /// 편집 시작 직후에는 None
    pub caret: Option<Caret>,
}

/// 편집기 상태
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Viewing,
    Editing(EditSession),
}

/// 단일 편집 세션 관리자
#[derive(Debug, Default)]
pub struct LineEditor {
    state: EditorState,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.state {
            EditorState::Editing(session) => Some(session),
            EditorState::Viewing => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing(_))
    }

    /// Viewing → Editing(index). 초안은 현재 줄 텍스트, 캐럿은 미설정
    pub fn begin_edit(
        &mut self,
        model: &TimelineModel,
        index: usize,
    ) -> Result<&EditSession, CoreError> {
        if let EditorState::Editing(active) = &self.state {
            return Err(CoreError::EditInProgress {
                active: active.index,
            });
        }

        let line = model.get(index).ok_or(CoreError::LineOutOfRange {
            index,
            len: model.len(),
        })?;

        debug!("편집 시작: 줄 {index}");
        self.state = EditorState::Editing(EditSession {
            index,
            draft_text: line.text.clone(),
            caret: None,
        });

        self.session()
            .ok_or_else(|| CoreError::Internal("편집 세션 생성 직후 누락".to_string()))
    }

    /// 초안 갱신 + 캐럿 기억. 뒤집힌 선택 영역은 정렬해서 저장
    pub fn change_draft(
        &mut self,
        text: impl Into<String>,
        caret_start: usize,
        caret_end: usize,
    ) -> Result<(), CoreError> {
        let EditorState::Editing(session) = &mut self.state else {
            return Err(CoreError::NoActiveEdit);
        };

        session.draft_text = text.into();
        session.caret = Some(Caret {
            start: caret_start.min(caret_end),
            end: caret_start.max(caret_end),
        });
        Ok(())
    }

    /// 재렌더링 후 적용할 캐럿. 초안 길이(문자 수)를 넘지 않도록 잘라 반환
    pub fn caret(&self) -> Option<Caret> {
        let session = self.session()?;
        let caret = session.caret?;
        let len = session.draft_text.chars().count();
        Some(Caret {
            start: caret.start.min(len),
            end: caret.end.min(len),
        })
    }

    /// Editing(index) → Viewing. 초안을 모델의 `index` 줄에 기록
    pub fn save(
        &mut self,
        model: &mut TimelineModel,
        index: usize,
    ) -> Result<TimelineLine, CoreError> {
        let active = match &self.state {
            EditorState::Editing(session) => session.index,
            EditorState::Viewing => return Err(CoreError::NoActiveEdit),
        };
        if active != index {
            return Err(CoreError::EditIndexMismatch {
                active,
                requested: index,
            });
        }

        let EditorState::Editing(session) = std::mem::take(&mut self.state) else {
            return Err(CoreError::NoActiveEdit);
        };

        if let Err(e) = model.replace_line(index, session.draft_text.clone()) {
            // 모델 쪽 실패면 세션을 되돌려 초안을 잃지 않는다
            self.state = EditorState::Editing(session);
            return Err(e);
        }

        debug!("편집 저장: 줄 {index}");
        Ok(TimelineLine::new(index, session.draft_text))
    }

    /// Editing → Viewing. 초안 폐기, 모델 변경 없음. 버려진 세션 반환
    pub fn cancel(&mut self) -> Option<EditSession> {
        match std::mem::take(&mut self.state) {
            EditorState::Editing(session) => {
                debug!("편집 취소: 줄 {}", session.index);
                Some(session)
            }
            EditorState::Viewing => None,
        }
    }
}
