use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::PathBuf;
use subs_downloader::core::engine::{Engine, EngineConfig};
use subs_downloader::core::events::EngineEvent;
use subs_downloader::core::model::{DownloadOutcome, LanguageCode, OutcomeStatus};
use subs_downloader::core::scanner::scan_videos;
use subs_downloader::plugins::registry::{ClientContext, LookupClient, PluginRegistry};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

const DEFAULT_LANGUAGE: &str = "en";

fn build_cli(registry: &PluginRegistry) -> Command {
    let cmd = Command::new("SubsDownloader")
        .about("Find subtitles for every video under a directory")
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Directory to search for videos (default: current directory)")
                .num_args(1),
        )
        .arg(
            Arg::new("languages")
                .short('l')
                .long("languages")
                .help("Comma-separated language codes, e.g. en,pt")
                .default_value(DEFAULT_LANGUAGE)
                .num_args(1),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .help("Max lookups in flight (0 = unlimited)")
                .default_value("0")
                .num_args(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Debug logging")
                .action(ArgAction::SetTrue),
        );

    registry.augment_command(cmd)
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Order-preserving; repeated codes are dropped.
fn split_languages(raw: &str) -> Vec<LanguageCode> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .map(str::to_string)
        .collect()
}

fn outcome_lines(results: &[DownloadOutcome]) -> Vec<String> {
    results
        .iter()
        .map(|outcome| match &outcome.status {
            OutcomeStatus::Saved { .. } => format!("[OK]  {}", outcome),
            OutcomeStatus::Failed { .. } => format!("[ERR] {}", outcome),
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let registry = PluginRegistry::with_defaults();
    let matches = build_cli(&registry).get_matches();
    init_tracing(matches.get_flag("verbose"));

    let root: PathBuf = match matches.get_one::<String>("path") {
        Some(p) => p.into(),
        None => std::env::current_dir().context("current_dir")?,
    };
    let languages = matches
        .get_one::<String>("languages")
        .map(|s| split_languages(s))
        .unwrap_or_default();
    let concurrency: usize = matches
        .get_one::<String>("concurrency")
        .map(|s| s.parse::<usize>())
        .transpose()
        .context("invalid --concurrency")?
        .unwrap_or(0);

    let mut ctx = ClientContext::subdb_defaults()?;
    registry.apply_matches(&matches, &mut ctx)?;
    let client = registry.client(ctx.clone())?;
    tracing::debug!(client = client.name(), endpoint = %ctx.endpoint, "lookup client ready");

    let videos = scan_videos(&root).await?;
    println!("Found {} video(s) under {}", videos.len(), root.display());

    let engine = Engine::new(
        client,
        EngineConfig {
            default_languages: vec![DEFAULT_LANGUAGE.to_string()],
            concurrency: (concurrency > 0).then_some(concurrency),
        },
    );

    let mut rx = engine.subscribe();
    let ui_task = tokio::spawn(async move {
        let mp = MultiProgress::new();
        let sty_bar = ProgressStyle::with_template("{prefix} {bar:40.cyan/blue} {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let mut bar: Option<ProgressBar> = None;

        loop {
            let evt = match rx.recv().await {
                Ok(e) => e,
                // progress only; outcomes are printed from the returned result set
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };

            match evt {
                EngineEvent::AcquireStarted { total_tasks } => {
                    let pb = mp.add(ProgressBar::new(total_tasks as u64));
                    pb.set_style(sty_bar.clone());
                    pb.set_prefix("[subs]");
                    bar = Some(pb);
                }
                EngineEvent::TaskStarted { video, language } => {
                    if let Some(pb) = &bar {
                        pb.set_message(format!("{} [{}]", video.display(), language));
                    }
                }
                EngineEvent::TaskFinished { completed, total, .. } => {
                    let pb = bar.get_or_insert_with(|| {
                        let pb = mp.add(ProgressBar::new(total as u64));
                        pb.set_style(sty_bar.clone());
                        pb.set_prefix("[subs]");
                        pb
                    });
                    pb.set_position(completed as u64);
                }
                EngineEvent::AcquireFinished { .. } => {
                    if let Some(pb) = &bar {
                        pb.finish_and_clear();
                    }
                    break;
                }
            }
        }
    });

    let results = engine.acquire(&videos, &languages).await;
    drop(engine);
    let _ = ui_task.await;

    for line in outcome_lines(&results) {
        println!("{line}");
    }
    let saved = results.iter().filter(|o| o.is_success()).count();
    println!(
        "Summary: {} saved, {} failed, {} total",
        saved,
        results.len() - saved,
        results.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_languages() {
        assert_eq!(split_languages("en,pt"), vec!["en", "pt"]);
        assert_eq!(split_languages(" en , ,fr "), vec!["en", "fr"]);
        assert!(split_languages("").is_empty());
    }

    #[test]
    fn test_split_languages_dedups_in_order() {
        assert_eq!(split_languages("en,pt,en, pt ,fr"), vec!["en", "pt", "fr"]);
    }

    #[test]
    fn test_every_outcome_is_reported() {
        use subs_downloader::core::model::{FailureKind, TaskSpec};

        let results: Vec<DownloadOutcome> = (0..400)
            .map(|i| {
                let task = TaskSpec { video: PathBuf::from(format!("v{i}.avi")), language: "en".into() };
                if i % 2 == 0 {
                    DownloadOutcome::saved(task, PathBuf::from(format!("v{i}.en.srt")))
                } else {
                    DownloadOutcome::failed(task, FailureKind::Io, "missing")
                }
            })
            .collect();

        let lines = outcome_lines(&results);
        assert_eq!(lines.len(), 400);
        assert_eq!(lines.iter().filter(|l| l.starts_with("[OK]")).count(), 200);
        assert!(lines[1].starts_with("[ERR] v1.avi [en] failed: io error"));
    }

    #[test]
    fn test_cli_parses() {
        let registry = PluginRegistry::with_defaults();
        let m = build_cli(&registry)
            .try_get_matches_from(["SubsDownloader", "-p", "/videos", "-l", "en,fr", "--concurrency", "4"])
            .unwrap();
        assert_eq!(m.get_one::<String>("path").unwrap(), "/videos");
        assert_eq!(m.get_one::<String>("languages").unwrap(), "en,fr");
        assert_eq!(m.get_one::<String>("subdb_timeout_secs").unwrap(), "0");
    }
}
