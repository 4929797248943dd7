//! 타임스탬프 파서.
//!
//! 줄 안의 첫 `분:초` 토큰을 찾아 초 단위로 변환한다.
//! `분:초-분:초` 범위 표기는 시작 시각만 사용한다.

use framesync_core::error::CoreError;
use once_cell::sync::Lazy;
use regex::Regex;

/// `M:SS` 또는 `M:SS-M:SS` (ASCII 숫자만)
static TIMESTAMP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+):([0-9]+)(?:-[0-9]+:[0-9]+)?").expect("타임스탬프 패턴 컴파일 실패")
});

/// 0초 요청은 1초로 바꾼다 (첫 프레임은 디코더에 따라 검은 화면)
const ZERO_SECOND_SUBSTITUTE: u64 = 1;

/// 파싱된 타임스탬프 (저장하지 않고 매번 다시 계산)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// 요청에 사용할 초
    pub seconds: u64,
    /// 매칭된 `M:SS` 토큰 (범위 접미사 제외)
    pub raw: String,
    /// 0초 치환이 적용됐는지
    pub adjusted: bool,
}

/// 줄에서 타임스탬프 추출.
///
/// 첫 매치만 사용한다. 매치가 없으면 `NoTimestampFound`,
/// 숫자가 정수 범위를 넘거나 결과가 음수면 `InvalidTimestamp`.
pub fn parse_timestamp(line: &str) -> Result<ParsedTimestamp, CoreError> {
    let caps = TIMESTAMP_PATTERN
        .captures(line)
        .ok_or_else(|| CoreError::NoTimestampFound {
            line: line.to_string(),
        })?;

    let minutes = parse_component(&caps[1], "분")?;
    let seconds = parse_component(&caps[2], "초")?;
    let raw = format!("{}:{}", &caps[1], &caps[2]);

    let total = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| CoreError::InvalidTimestamp(format!("범위 초과: {raw}")))?;

    if total < 0 {
        return Err(CoreError::InvalidTimestamp(format!("음수 타임스탬프: {raw}")));
    }

    let (seconds, adjusted) = if total == 0 {
        (ZERO_SECOND_SUBSTITUTE, true)
    } else {
        (total as u64, false)
    };

    Ok(ParsedTimestamp {
        seconds,
        raw,
        adjusted,
    })
}

fn parse_component(digits: &str, unit: &str) -> Result<i64, CoreError> {
    digits
        .parse::<i64>()
        .map_err(|e| CoreError::InvalidTimestamp(format!("{unit} 파싱 실패 ({digits}): {e}")))
}
