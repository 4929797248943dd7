//! 동기화 결과 텍스트 렌더링.
//!
//! 분석 결과 패널(요약, 뷰별 분석)과 타임라인 줄별 프레임 슬롯 상태를 그린다.
//! 빈 슬롯은 로딩 중으로 표시한다. 실패한 슬롯도 세션 내내 로딩 상태로 남는다.

use framesync_core::models::analysis::AnalysisResult;
use framesync_core::models::view::View;
use framesync_sync::FrameCache;
use framesync_timeline::TimelineModel;

/// 줄에 캐시 레코드가 아예 없을 때
pub const PREPARING: &str = "Preparing to load...";

/// 슬롯이 비어있을 때 표시 문구
pub fn loading_placeholder(view: View) -> String {
    format!("Loading {view} view...")
}

/// 전체 결과 렌더링
pub fn render_session(
    analysis: &AnalysisResult,
    timeline: &TimelineModel,
    cache: &FrameCache,
) -> String {
    let mut lines = vec![format!("== {} ==", display_name(analysis))];
    if let Some(message) = analysis.message.as_deref() {
        lines.push(message.to_string());
    }

    if let Some(combined) = &analysis.combined_result {
        if !combined.summary.trim().is_empty() {
            section(&mut lines, "summary", &combined.summary);
        }
    }
    for view in View::ALL {
        if let Some(text) = analysis.analysis_results.get(view.as_str()) {
            section(&mut lines, view.as_str(), text);
        }
    }

    lines.push(String::new());
    lines.push("[timeline]".to_string());
    lines.extend(timeline_lines(timeline, cache));
    terminate(lines)
}

/// 타임라인 줄과 슬롯 상태
pub fn render_timeline(timeline: &TimelineModel, cache: &FrameCache) -> String {
    terminate(timeline_lines(timeline, cache))
}

fn timeline_lines(timeline: &TimelineModel, cache: &FrameCache) -> Vec<String> {
    let mut lines = Vec::new();
    for line in timeline.lines() {
        lines.push(format!("#{} {}", line.index, line.text));
        match cache.slots(line.index) {
            None => lines.push(format!("    {PREPARING}")),
            Some(slots) => {
                for view in View::ALL {
                    let status = slots
                        .get(view)
                        .map(|handle| handle.uri())
                        .unwrap_or_else(|| loading_placeholder(view));
                    lines.push(format!("    {view}: {status}"));
                }
            }
        }
    }
    lines
}

fn section(lines: &mut Vec<String>, title: &str, body: &str) {
    lines.push(String::new());
    lines.push(format!("[{title}]"));
    lines.push(body.trim_end().to_string());
}

/// 줄마다 개행을 붙여 합친다 (빈 목록은 빈 문자열)
fn terminate(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

fn display_name(analysis: &AnalysisResult) -> &str {
    if analysis.filename.is_empty() {
        "(unnamed)"
    } else {
        &analysis.filename
    }
}
