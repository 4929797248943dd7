//! 애플리케이션 설정 구조체.
//!
//! 분석/프레임 서비스 URL, 동기화 패스 동작, 프레임 출력 경로 등
//! 런타임 설정을 정의한다. `ConfigManager`를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정
    pub server: ServerConfig,
    /// 동기화 패스 설정
    #[serde(default)]
    pub sync: SyncConfig,
    /// 프레임 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
}

/// 서버 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 분석/프레임 추출 서버 기본 URL
    pub base_url: String,
    /// 프레임 추출 엔드포인트
    #[serde(default = "default_frame_endpoint")]
    pub frame_endpoint: String,
    /// 인사 메시지 엔드포인트 (서버 도달 확인용)
    #[serde(default = "default_greeting_endpoint")]
    pub greeting_endpoint: String,
    /// 요청 타임아웃 (밀리초). None이면 타임아웃 없음
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

// ============================================================
// 동기화 설정
// ============================================================

/// 동기화 패스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 동시 프레임 요청 상한. None이면 무제한 (줄 수 × 2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_fetches: Option<usize>,
    /// 새 패스가 시작된 뒤 도착한 이전 패스의 완료를 버릴지 여부.
    /// 기본값 false: 이전 패스 완료도 캐시에 기록된다 (알려진 경합).
    #[serde(default)]
    pub discard_stale_completions: bool,
    /// 동기화 이벤트 버스 용량
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: None,
            discard_stale_completions: false,
            event_capacity: default_event_capacity(),
        }
    }
}

// ============================================================
// 출력 설정
// ============================================================

/// 프레임 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 받은 프레임을 저장할 디렉토리 (None이면 저장 안 함)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_dir: Option<PathBuf>,
    /// 저장 파일 확장자
    #[serde(default = "default_image_extension")]
    pub image_extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frames_dir: None,
            image_extension: default_image_extension(),
        }
    }
}

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:5000".to_string(),
                frame_endpoint: default_frame_endpoint(),
                greeting_endpoint: default_greeting_endpoint(),
                request_timeout_ms: None,
            },
            sync: SyncConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// 요청 타임아웃을 Duration으로 반환 (설정된 경우만)
    pub fn request_timeout(&self) -> Option<Duration> {
        self.server.request_timeout_ms.map(Duration::from_millis)
    }

    /// 로드 직후와 CLI 덮어쓰기 후에 확인하는 값 범위
    pub fn validate(&self) -> Result<(), CoreError> {
        let server = &self.server;
        if !(server.base_url.starts_with("http://") || server.base_url.starts_with("https://")) {
            return Err(CoreError::Config(format!(
                "server.base_url은 http(s) URL이어야 함: {}",
                server.base_url
            )));
        }
        for (name, endpoint) in [
            ("frame_endpoint", &server.frame_endpoint),
            ("greeting_endpoint", &server.greeting_endpoint),
        ] {
            if !endpoint.starts_with('/') {
                return Err(CoreError::Config(format!(
                    "server.{name}은 '/'로 시작해야 함: {endpoint}"
                )));
            }
        }
        if self.sync.max_concurrent_fetches == Some(0) {
            return Err(CoreError::Config(
                "sync.max_concurrent_fetches는 1 이상 (제한 없음은 생략)".to_string(),
            ));
        }
        if self.sync.event_capacity == 0 {
            return Err(CoreError::Config("sync.event_capacity는 1 이상".to_string()));
        }
        if self.output.image_extension.trim_start_matches('.').is_empty() {
            return Err(CoreError::Config("output.image_extension 비어있음".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_frame_endpoint() -> String {
    "/api/get_frame".to_string()
}
fn default_greeting_endpoint() -> String {
    "/api/hello".to_string()
}
fn default_event_capacity() -> usize {
    256
}
fn default_image_extension() -> String {
    "jpg".to_string()
}
