//! 프레임 추출 HTTP 클라이언트.
//!
//! `FrameSource` 포트 구현. 요청 하나당 POST 한 번, 재시도 없음.
//! 타임아웃은 설정에 있을 때만 적용한다 (기본값 없음).

use async_trait::async_trait;
use framesync_core::config::ServerConfig;
use framesync_core::error::CoreError;
use framesync_core::models::frame::{FramePayload, FrameRequest};
use framesync_core::ports::frame_source::FrameSource;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// 기본 프레임 추출 경로
const DEFAULT_FRAME_ENDPOINT: &str = "/api/get_frame";

/// 기본 인사 경로
const DEFAULT_GREETING_ENDPOINT: &str = "/api/hello";

/// 인사 응답 `{"message": "..."}`
#[derive(Debug, Deserialize)]
struct GreetingResponse {
    message: String,
}

/// 프레임 추출 클라이언트 (`FrameSource` 포트 구현)
pub struct HttpFrameClient {
    client: reqwest::Client,
    base_url: String,
    frame_endpoint: String,
    greeting_endpoint: String,
}

impl HttpFrameClient {
    /// 새 클라이언트 생성. `timeout`이 None이면 요청이 끝날 때까지 기다린다
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, CoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            frame_endpoint: DEFAULT_FRAME_ENDPOINT.to_string(),
            greeting_endpoint: DEFAULT_GREETING_ENDPOINT.to_string(),
        })
    }

    /// 서버 설정에서 생성
    pub fn from_config(config: &ServerConfig) -> Result<Self, CoreError> {
        let timeout = config.request_timeout_ms.map(Duration::from_millis);
        Ok(Self::new(&config.base_url, timeout)?
            .with_endpoints(&config.frame_endpoint, &config.greeting_endpoint))
    }

    /// 엔드포인트 경로 변경
    pub fn with_endpoints(mut self, frame_endpoint: &str, greeting_endpoint: &str) -> Self {
        self.frame_endpoint = frame_endpoint.to_string();
        self.greeting_endpoint = greeting_endpoint.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 응답 상태 코드 확인. 실패 응답의 본문은 읽지 않는다
    fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(CoreError::HttpStatus {
                status: status.as_u16(),
            })
        }
    }

    /// 서버 인사 메시지 조회 (도달 확인)
    pub async fn greeting(&self) -> Result<String, CoreError> {
        let url = self.url(&self.greeting_endpoint);
        debug!("인사 요청: {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("인사 요청 실패: {e}")))?;

        let resp = Self::check_response(resp)?;
        let greeting: GreetingResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("인사 응답 파싱 실패: {e}")))?;

        Ok(greeting.message)
    }
}

#[async_trait]
impl FrameSource for HttpFrameClient {
    async fn extract_frame(&self, request: &FrameRequest) -> Result<FramePayload, CoreError> {
        debug!(
            "프레임 요청: {} @ {}s",
            request.video_path, request.timestamp
        );

        let resp = self
            .client
            .post(self.url(&self.frame_endpoint))
            .json(request)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("프레임 요청 실패: {e}")))?;

        let resp = Self::check_response(resp)?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CoreError::Network(format!("프레임 본문 수신 실패: {e}")))?;

        debug!("프레임 수신: {} bytes", bytes.len());
        Ok(FramePayload::new(bytes.to_vec(), content_type))
    }
}
