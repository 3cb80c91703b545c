use bytes::Bytes;
use std::fmt;
use std::path::PathBuf;

pub type VideoPath = PathBuf;
pub type LanguageCode = String;

/// Lowercase hex MD5 over the first and last 64KiB of a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subtitle payload as delivered by the lookup service.
#[derive(Debug, Clone)]
pub struct Subtitle {
    pub content: Bytes,
    /// Includes the leading dot, e.g. `.srt`.
    pub extension: String,
}

/// One (video, language) unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub video: VideoPath,
    pub language: LanguageCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    Transport,
    Protocol,
    NotFound,
    NoSubtitleFound,
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Io => "io error",
            FailureKind::Transport => "transport error",
            FailureKind::Protocol => "protocol error",
            FailureKind::NotFound => "not found",
            FailureKind::NoSubtitleFound => "no subtitle found",
            FailureKind::Internal => "internal error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Saved { subtitle: PathBuf },
    Failed { kind: FailureKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub video: VideoPath,
    pub language: LanguageCode,
    pub status: OutcomeStatus,
}

impl DownloadOutcome {
    pub fn saved(task: TaskSpec, subtitle: PathBuf) -> Self {
        Self {
            video: task.video,
            language: task.language,
            status: OutcomeStatus::Saved { subtitle },
        }
    }

    pub fn failed(task: TaskSpec, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            video: task.video,
            language: task.language,
            status: OutcomeStatus::Failed { kind, message: message.into() },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Saved { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.status {
            OutcomeStatus::Failed { kind, .. } => Some(*kind),
            OutcomeStatus::Saved { .. } => None,
        }
    }
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            OutcomeStatus::Saved { subtitle } => write!(
                f,
                "{} [{}] -> {}",
                self.video.display(),
                self.language,
                subtitle.display()
            ),
            OutcomeStatus::Failed { kind, message } => write!(
                f,
                "{} [{}] failed: {} ({})",
                self.video.display(),
                self.language,
                kind,
                message
            ),
        }
    }
}

/// Outcomes in arrival order.
pub type ResultSet = Vec<DownloadOutcome>;
