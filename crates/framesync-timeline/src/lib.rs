//! # framesync-timeline
//!
//! 분석 결과의 자유 형식 타임라인 텍스트를 다루는 동기(sync) 로직.
//!
//! - [`parser`] — 줄에서 `M:SS` 타임스탬프 추출
//! - [`model`] — 줄 단위 타임라인 모델 (전체 교체 / 한 줄 교체)
//! - [`editor`] — 한 번에 한 줄만 편집하는 편집 세션 상태 머신

pub mod editor;
pub mod model;
pub mod parser;

pub use editor::{Caret, EditSession, EditorState, LineEditor};
pub use model::{split_into_lines, TimelineModel};
pub use parser::{parse_timestamp, ParsedTimestamp};
