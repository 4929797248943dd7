//! framesync 도메인 모델.
//!
//! 분석 서비스 응답, 타임라인 줄, 카메라 뷰, 프레임 요청/핸들을 정의한다.

pub mod analysis;
pub mod frame;
pub mod timeline;
pub mod view;
