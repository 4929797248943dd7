//! 설정 파일 관리.
//!
//! `config.json` 하나를 읽어 검증한 뒤 메모리에 들고 있는다.
//! 파일이 없으면 기본 설정을 써 두고 그 값으로 시작한다.

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.json";

/// 설정 관리자. 복제본은 같은 설정을 공유한다
#[derive(Debug, Clone)]
pub struct ConfigManager {
    current: Arc<RwLock<AppConfig>>,
    path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 설정 디렉토리의 `config.json`
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// 지정 경로의 설정 파일. 없으면 기본 설정으로 만든다
    pub fn with_path(path: PathBuf) -> Result<Self, CoreError> {
        let config = if path.is_file() {
            read_config(&path)?
        } else {
            let config = AppConfig::default_config();
            write_config(&path, &config)?;
            info!("기본 설정 파일 생성: {}", path.display());
            config
        };

        Ok(Self {
            current: Arc::new(RwLock::new(config)),
            path,
        })
    }

    pub fn get(&self) -> AppConfig {
        self.current.read().clone()
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// 설정 수정 후 저장. 검증에 실패하면 메모리와 파일 모두 그대로
    pub fn update_with<F>(&self, edit: F) -> Result<AppConfig, CoreError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut next = self.get();
        edit(&mut next);
        next.validate()?;

        write_config(&self.path, &next)?;
        *self.current.write() = next.clone();
        debug!("설정 저장: {}", self.path.display());
        Ok(next)
    }

    /// 파일을 다시 읽는다 (외부 편집 반영)
    pub fn reload(&self) -> Result<AppConfig, CoreError> {
        let config = read_config(&self.path)?;
        *self.current.write() = config.clone();
        info!("설정 다시 로드: {}", self.path.display());
        Ok(config)
    }

    /// 플랫폼별 설정 디렉토리 (Linux: `~/.config/framesync/`)
    pub fn config_dir() -> Result<PathBuf, CoreError> {
        ProjectDirs::from("dev", "framesync", "framesync")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없음".to_string()))
    }
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{} 읽기 실패: {e}", path.display())))?;
    let config: AppConfig = serde_json::from_str(&raw)
        .map_err(|e| CoreError::Config(format!("{} 파싱 실패: {e}", path.display())))?;
    config.validate()?;
    debug!("설정 로드: {}", path.display());
    Ok(config)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| CoreError::Config(format!("{} 생성 실패: {e}", dir.display())))?;
    }
    let body = serde_json::to_string_pretty(config)?;
    fs::write(path, body)
        .map_err(|e| CoreError::Config(format!("{} 저장 실패: {e}", path.display())))
}
