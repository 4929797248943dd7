//! # framesync-network
//!
//! 프레임 추출 서비스 HTTP 어댑터.
//! `FrameSource` 포트를 reqwest로 구현하고, 서버 도달 확인용 인사 엔드포인트를 호출한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use framesync_network::http_client::HttpFrameClient;
//!
//! let client = HttpFrameClient::new("http://localhost:5000", None)?;
//! let message = client.greeting().await?;
//! ```

pub mod http_client;
