//! # framesync-app
//!
//! framesync CLI 진입점.
//! 설정 로드, 컴포넌트 조립(DI), 동기화 패스 실행, 결과 렌더링과 프레임 저장.

mod export;
mod render;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use framesync_core::config::AppConfig;
use framesync_core::config_manager::ConfigManager;
use framesync_core::models::analysis::AnalysisResult;
use framesync_network::http_client::HttpFrameClient;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::session::{LineEdit, Session};

/// 영상 분석 타임라인의 각 줄을 top/front 프레임과 동기화
#[derive(Parser, Debug)]
#[command(name = "framesync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 분석 결과 JSON 파일
    #[arg(long, short = 'a')]
    analysis: PathBuf,

    /// 서버 URL 지정 (기본: http://localhost:5000)
    #[arg(long, short = 's')]
    server: Option<String>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 받은 프레임을 저장할 디렉토리
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// 동기화 후 줄 편집 (INDEX=TEXT, 반복 가능)
    #[arg(long = "edit", short = 'e')]
    edits: Vec<LineEdit>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

fn log_filter(level: &str) -> String {
    [
        "framesync",
        "framesync_app",
        "framesync_core",
        "framesync_timeline",
        "framesync_network",
        "framesync_sync",
    ]
    .iter()
    .map(|target| format!("{target}={level}"))
    .collect::<Vec<_>>()
    .join(",")
}

/// 설정 로드. 명시한 파일은 실패 시 에러, 기본 경로는 실패 시 기본값으로 진행
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            let manager = ConfigManager::with_path(path.to_path_buf())
                .with_context(|| format!("설정 파일 로드 실패: {}", path.display()))?;
            info!("설정 파일: {}", manager.config_path().display());
            Ok(manager.get())
        }
        None => match ConfigManager::new() {
            Ok(manager) => {
                info!("설정 파일: {}", manager.config_path().display());
                Ok(manager.get())
            }
            Err(e) => {
                warn!("설정 관리자 초기화 실패, 기본 설정 사용: {e}");
                Ok(AppConfig::default_config())
            }
        },
    }
}

/// CLI 인자가 설정 파일 값을 덮어쓴다
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(out) = &args.out {
        config.output.frames_dir = Some(out.clone());
    }
}

fn load_analysis(path: &Path) -> Result<AnalysisResult> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("분석 결과 읽기 실패: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("분석 결과 파싱 실패: {}", path.display()))
}

// 완료 콜백은 단일 스레드 이벤트 루프에서 처리
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(&args.log_level))),
        )
        .init();

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;
    info!("서버: {}", config.server.base_url);

    let analysis = load_analysis(&args.analysis)?;
    if let Some(message) = analysis.message.as_deref() {
        info!("분석 결과: {message}");
    }

    let client = HttpFrameClient::from_config(&config.server)?;
    match client.greeting().await {
        Ok(message) => info!("서버 응답: {message}"),
        Err(e) => warn!("서버 인사 요청 실패 (계속 진행): {e}"),
    }

    let session = Session::new(Arc::new(client), &config.sync);
    match session.sync(&analysis).await {
        Ok(Some(report)) => info!(
            "동기화 완료: {}/{} 성공, {} 줄 건너뜀",
            report.succeeded, report.requested, report.skipped
        ),
        Ok(None) => warn!("뷰 경로가 없어 프레임을 요청하지 않음"),
        Err(e) => error!("동기화 패스 실패: {e}"),
    }

    if !args.edits.is_empty() {
        let applied = session.apply_edits(&args.edits);
        info!("편집 {applied}/{}건 적용", args.edits.len());
    }

    print!("{}", session.render(&analysis));

    if let Some(dir) = &config.output.frames_dir {
        if let Err(e) = session.export(dir, &config.output.image_extension) {
            error!("프레임 저장 실패: {e}");
        }
    }

    let released = session.close();
    info!("종료: 이미지 {released}개 해제");
    Ok(())
}
