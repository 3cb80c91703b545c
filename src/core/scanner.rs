use anyhow::Context;
use std::path::{Path, PathBuf};

pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".3g2", ".3gp", ".3gp2", ".3gpp", ".60d", ".xvid", ".ajp", ".asf", ".asx", ".avchd", ".avi",
    ".bik", ".bix", ".box", ".cam", ".dat", ".divx", ".dmf", ".dv", ".dvr-ms", ".evo", ".flc",
    ".fli", ".flic", ".flv", ".flx", ".gvi", ".gvp", ".h264", ".m1v", ".m2p", ".m2ts", ".m2v",
    ".m4e", ".m4v", ".mjp", ".mjpeg", ".mjpg", ".mkv", ".moov", ".mov", ".movhd", ".movie",
    ".movx", ".mp4", ".mpe", ".mpeg", ".mpg", ".mpv", ".mpv2", ".mxf", ".nsv", ".nut", ".ogg",
    ".ogm", ".omf", ".ps", ".qt", ".ram", ".rm", ".rmvb", ".swf", ".ts", ".vfw", ".vid", ".video",
    ".viv", ".vivo", ".vob", ".vro", ".wm", ".wmv", ".wmx", ".wrap", ".wvx", ".wx", ".x264",
];

pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.iter().any(|v| v[1..] == *e))
        .unwrap_or(false)
}

/// Recursively collects video files under `root`, sorted.
pub async fn scan_videos(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let meta = tokio::fs::metadata(root)
        .await
        .with_context(|| format!("stat {}", root.display()))?;

    if meta.is_file() {
        return Ok(if is_video(root) { vec![root.to_path_buf()] } else { vec![] });
    }

    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let ft = entry.file_type().await?;
            if ft.is_dir() {
                pending.push(path);
            } else if is_video(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    tracing::debug!(root = %root.display(), count = found.len(), "scan finished");
    Ok(found)
}
