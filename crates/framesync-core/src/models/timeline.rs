//! 타임라인 줄 모델.

use serde::{Deserialize, Serialize};

/// 타임라인 한 줄.
///
/// `index`는 생성 시 고정되며 이후 변하지 않는다. `text`는 편집 저장으로만 바뀐다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineLine {
    pub index: usize,
    pub text: String,
}

impl TimelineLine {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}
