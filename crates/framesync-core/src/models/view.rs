//! 카메라 뷰 모델.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 동기화되는 두 카메라 앵글
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Top,
    Front,
}

impl View {
    /// 동기화 패스에서 요청을 발행하는 순서
    pub const ALL: [View; 2] = [View::Top, View::Front];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Top => "top",
            View::Front => "front",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(View::Top),
            "front" => Ok(View::Front),
            other => Err(CoreError::Config(format!("알 수 없는 뷰: {other}"))),
        }
    }
}

/// 뷰별 분리 영상 경로 (분석 결과마다 한 번 주어지며 읽기 전용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPaths {
    pub top: String,
    pub front: String,
}

impl ViewPaths {
    pub fn new(top: impl Into<String>, front: impl Into<String>) -> Self {
        Self {
            top: top.into(),
            front: front.into(),
        }
    }

    /// 뷰에 해당하는 경로
    pub fn get(&self, view: View) -> &str {
        match view {
            View::Top => &self.top,
            View::Front => &self.front,
        }
    }
}
