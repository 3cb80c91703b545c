use crate::core::events::EngineEvent;
use crate::core::fingerprint::{fingerprint, FingerprintError};
use crate::core::model::*;
use crate::core::planner::plan_tasks;
use crate::core::saver::{save_subtitle, SaveError};
use crate::plugins::registry::{LookupClient, LookupError};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Semaphore};

#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("language {wanted} not offered (available: [{available}])")]
    NoSubtitleFound { wanted: LanguageCode, available: String },

    #[error(transparent)]
    Save(#[from] SaveError),
}

impl TaskError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TaskError::Fingerprint(_) | TaskError::Save(_) => FailureKind::Io,
            TaskError::Lookup(LookupError::Transport(_)) => FailureKind::Transport,
            TaskError::Lookup(LookupError::Status(_) | LookupError::Protocol(_)) => FailureKind::Protocol,
            TaskError::Lookup(LookupError::NotFound) => FailureKind::NotFound,
            TaskError::NoSubtitleFound { .. } => FailureKind::NoSubtitleFound,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Used when a call passes no languages.
    pub default_languages: Vec<LanguageCode>,
    /// Max simultaneously active tasks; `None` runs every task at once.
    pub concurrency: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_languages: vec!["en".to_string()],
            concurrency: None,
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    client: Arc<dyn LookupClient>,
    config: EngineConfig,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl Engine {
    pub fn new(client: Arc<dyn LookupClient>, config: EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self { client, config, event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Runs one task per (video, language) pair and returns once every task
    /// has reported. Outcomes are in completion order.
    pub async fn acquire(&self, videos: &[VideoPath], languages: &[LanguageCode]) -> ResultSet {
        let languages = if languages.is_empty() {
            self.config.default_languages.as_slice()
        } else {
            languages
        };

        let tasks = plan_tasks(videos, languages);
        if tasks.is_empty() {
            return vec![];
        }

        let total = tasks.len();
        tracing::debug!(
            videos = videos.len(),
            languages = languages.len(),
            total,
            limit = ?self.config.concurrency,
            "starting acquisition"
        );
        let _ = self.event_tx.send(EngineEvent::AcquireStarted { total_tasks: total });

        let limiter = self.config.concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));
        let mut running = FuturesUnordered::new();

        for task in tasks {
            let engine = self.clone();
            let limiter = limiter.clone();
            let pair = task.clone();

            let handle = tokio::spawn(async move {
                let _permit = match limiter {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                engine.run_task(task).await
            });

            running.push(async move { (pair, handle.await) });
        }

        let mut results: ResultSet = Vec::with_capacity(total);
        while let Some((pair, joined)) = running.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => DownloadOutcome::failed(pair, FailureKind::Internal, format!("task aborted: {e}")),
            };

            if let OutcomeStatus::Failed { kind, message } = &outcome.status {
                tracing::warn!(
                    video = %outcome.video.display(),
                    language = %outcome.language,
                    %kind,
                    "{message}"
                );
            }

            results.push(outcome.clone());
            let _ = self.event_tx.send(EngineEvent::TaskFinished {
                outcome,
                completed: results.len(),
                total,
            });
        }

        let succeeded = results.iter().filter(|o| o.is_success()).count();
        let _ = self.event_tx.send(EngineEvent::AcquireFinished {
            succeeded,
            failed: results.len() - succeeded,
        });

        results
    }

    async fn run_task(&self, task: TaskSpec) -> DownloadOutcome {
        let _ = self.event_tx.send(EngineEvent::TaskStarted {
            video: task.video.clone(),
            language: task.language.clone(),
        });

        match self.fetch_subtitle(&task).await {
            Ok(saved) => DownloadOutcome::saved(task, saved),
            Err(e) => {
                let kind = e.kind();
                DownloadOutcome::failed(task, kind, e.to_string())
            }
        }
    }

    async fn fetch_subtitle(&self, task: &TaskSpec) -> Result<PathBuf, TaskError> {
        let fp = fingerprint(&task.video).await?;
        tracing::debug!(video = %task.video.display(), fingerprint = %fp, "fingerprinted");

        let available = self.client.search(&fp).await?;
        if !available.iter().any(|l| *l == task.language) {
            return Err(TaskError::NoSubtitleFound {
                wanted: task.language.clone(),
                available: available.join(","),
            });
        }

        let subtitle = self.client.download(&fp, &task.language).await?;
        let saved = save_subtitle(&task.video, &task.language, &subtitle).await?;
        tracing::debug!(video = %task.video.display(), subtitle = %saved.display(), "saved");
        Ok(saved)
    }
}
