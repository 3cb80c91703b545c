use async_trait::async_trait;
use crate::core::model::{Fingerprint, LanguageCode, Subtitle};
use clap::{ArgMatches, Command};
use std::sync::Arc;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected http status: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Protocol(String),

    #[error("no subtitle delivered")]
    NotFound,
}

#[derive(Debug, Clone)]
pub struct ClientContext {
    pub endpoint: Url,
    pub user_agent: String,
    /// 0 leaves requests to the transport's own limits.
    pub timeout_secs: u64,
}

impl ClientContext {
    pub fn subdb_defaults() -> Result<Self, url::ParseError> {
        Ok(Self {
            endpoint: Url::parse(crate::plugins::subdb::client::DEFAULT_ENDPOINT)?,
            user_agent: crate::plugins::subdb::client::DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 0,
        })
    }
}

/// Remote subtitle lookup keyed by content fingerprint.
#[async_trait]
pub trait LookupClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Languages the service holds for this fingerprint. Empty is a valid answer.
    async fn search(&self, fingerprint: &Fingerprint) -> Result<Vec<LanguageCode>, LookupError>;

    async fn download(&self, fingerprint: &Fingerprint, language: &str) -> Result<Subtitle, LookupError>;
}

pub trait CliPlugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn augment_command(&self, cmd: Command) -> Command;
    fn apply_matches(&self, matches: &ArgMatches, ctx: &mut ClientContext) -> anyhow::Result<()>;
}

pub struct PluginRegistry {
    cli_plugins: Vec<Box<dyn CliPlugin>>,
}

impl PluginRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self { cli_plugins: vec![] };
        reg.cli_plugins.push(Box::new(crate::plugins::subdb::cli::SubDbCliPlugin::new()));
        reg
    }

    pub fn augment_command(&self, cmd: Command) -> Command {
        self.cli_plugins
            .iter()
            .fold(cmd, |c, p| p.augment_command(c))
    }

    pub fn apply_matches(&self, matches: &ArgMatches, ctx: &mut ClientContext) -> anyhow::Result<()> {
        for p in &self.cli_plugins {
            p.apply_matches(matches, ctx)?;
        }
        Ok(())
    }

    pub fn client(&self, ctx: ClientContext) -> anyhow::Result<Arc<dyn LookupClient>> {
        Ok(Arc::new(crate::plugins::subdb::client::SubDbClient::new(ctx)?))
    }
}
