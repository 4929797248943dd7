//! 분석 서비스 응답 모델.
//!
//! 업로드(파일/URL) 후 분석 서비스가 돌려주는 결과.
//! 동기화 엔진은 `separated_videos.{top,front}`와 `combined_result.timeline`만 사용하고
//! 나머지 필드는 검증하지 않는다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::view::ViewPaths;

/// 분석 결과 전체
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 서버 처리 상태 메시지
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 원본 파일 이름
    #[serde(default)]
    pub filename: String,
    /// 뷰별 분리 영상 경로
    #[serde(default)]
    pub separated_videos: SeparatedVideos,
    /// 뷰별 동작 분석 텍스트
    #[serde(default)]
    pub analysis_results: BTreeMap<String, String>,
    /// 요약 + 통합 타임라인
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_result: Option<CombinedResult>,
}

/// 분리 영상 경로 (누락 가능)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeparatedVideos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
}

/// 통합 결과
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinedResult {
    /// 영상 요약 (2~3 문장)
    #[serde(default)]
    pub summary: String,
    /// 줄 단위 타임라인 텍스트
    #[serde(default)]
    pub timeline: String,
}

impl AnalysisResult {
    /// 두 뷰 경로가 모두 비어있지 않을 때만 반환
    pub fn view_paths(&self) -> Option<ViewPaths> {
        let top = self.separated_videos.top.as_deref().filter(|p| !p.is_empty())?;
        let front = self
            .separated_videos
            .front
            .as_deref()
            .filter(|p| !p.is_empty())?;
        Some(ViewPaths::new(top, front))
    }

    /// 통합 타임라인 텍스트
    pub fn timeline_text(&self) -> Option<&str> {
        self.combined_result.as_ref().map(|c| c.timeline.as_str())
    }
}
