use crate::core::model::{DownloadOutcome, LanguageCode, VideoPath};

#[derive(Debug, Clone)]
pub enum EngineEvent {
    AcquireStarted { total_tasks: usize },
    TaskStarted { video: VideoPath, language: LanguageCode },
    TaskFinished { outcome: DownloadOutcome, completed: usize, total: usize },
    AcquireFinished { succeeded: usize, failed: usize },
}
