use crate::core::model::{LanguageCode, TaskSpec, VideoPath};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One task per (video, language) pair, video-major.
pub fn plan_tasks(videos: &[VideoPath], languages: &[LanguageCode]) -> Vec<TaskSpec> {
    let mut tasks = Vec::with_capacity(videos.len() * languages.len());
    for video in videos {
        for language in languages {
            tasks.push(TaskSpec {
                video: video.clone(),
                language: language.clone(),
            });
        }
    }
    tasks
}

/// `dir/movie.avi` + `en` + `.srt` => `dir/movie.en.srt`
pub fn subtitle_path(video: &Path, language: &str, extension: &str) -> PathBuf {
    let mut name: OsString = video
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(language);
    name.push(extension);
    video.with_file_name(name)
}
