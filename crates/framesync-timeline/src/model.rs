//! 타임라인 모델.
//!
//! 분석 결과의 타임라인 텍스트를 줄 단위로 나눈 순서 있는 시퀀스.
//! 전체 교체(`replace_all`)만 세대(generation)를 올리며,
//! 동기화 컨트롤러는 세대 변화를 새 패스 트리거로 본다.

use framesync_core::error::CoreError;
use framesync_core::models::timeline::TimelineLine;
use tracing::debug;

/// 텍스트를 `\n`으로 나누고 공백뿐인 줄을 버린다. 남은 줄은 그대로 유지.
pub fn split_into_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// 타임라인 줄 시퀀스
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineModel {
    generation: u64,
    lines: Vec<TimelineLine>,
}

impl TimelineModel {
    /// 빈 모델 (세대 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// 텍스트에서 모델 생성 (세대 1)
    pub fn from_text(text: &str) -> Self {
        let mut model = Self::new();
        model.replace_all(text);
        model
    }

    /// 새 분석 결과로 전체 교체. 새 세대 번호 반환
    pub fn replace_all(&mut self, text: &str) -> u64 {
        self.lines = split_into_lines(text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| TimelineLine::new(index, text))
            .collect();
        self.generation += 1;
        debug!(
            "타임라인 교체: 세대 {}, {}줄",
            self.generation,
            self.lines.len()
        );
        self.generation
    }

    /// 한 줄 텍스트 교체 (세대 유지)
    pub fn replace_line(&mut self, index: usize, text: impl Into<String>) -> Result<(), CoreError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineOutOfRange { index, len })?;
        line.text = text.into();
        debug!("타임라인 줄 {index} 교체");
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&TimelineLine> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[TimelineLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 시퀀스 정체성. 전체 교체마다 증가
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 현재 줄들을 `\n`으로 다시 합친 텍스트 (편집 결과 내보내기용)
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
