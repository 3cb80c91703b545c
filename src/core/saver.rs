use crate::core::model::Subtitle;
use crate::core::planner::subtitle_path;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
#[error("write {path}: {source}")]
pub struct SaveError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Writes the payload next to the video, replacing any existing file.
pub async fn save_subtitle(video: &Path, language: &str, subtitle: &Subtitle) -> Result<PathBuf, SaveError> {
    let dst = subtitle_path(video, language, &subtitle.extension);
    tokio::fs::write(&dst, &subtitle.content)
        .await
        .map_err(|source| SaveError { path: dst.clone(), source })?;
    Ok(dst)
}
