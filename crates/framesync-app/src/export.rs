//! 받은 프레임을 디스크에 저장.

use framesync_core::error::CoreError;
use framesync_core::ports::image_store::ImageStore;
use framesync_sync::FrameCache;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 채워진 슬롯마다 `<index>_<view>.<ext>` 파일을 쓴다. 쓴 파일 경로 반환
pub fn export_frames(
    store: &dyn ImageStore,
    cache: &FrameCache,
    dir: &Path,
    extension: &str,
) -> Result<Vec<PathBuf>, CoreError> {
    fs::create_dir_all(dir)?;

    let extension = extension.trim_start_matches('.');
    let mut written = Vec::new();
    for (index, slots) in cache.iter() {
        for (view, handle) in slots.iter() {
            let Some(payload) = store.resolve(handle) else {
                warn!("해제된 핸들 건너뜀: {handle}");
                continue;
            };
            let path = dir.join(format!("{index}_{view}.{extension}"));
            fs::write(&path, payload.bytes())?;
            debug!("프레임 저장: {} ({} bytes)", path.display(), payload.len());
            written.push(path);
        }
    }

    info!("프레임 {}개 저장: {}", written.len(), dir.display());
    Ok(written)
}
