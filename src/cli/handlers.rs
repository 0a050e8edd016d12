use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::{
    cli::commands::{
        EvalsCommand, ListCommand, ListCommandParams, PerfCommand, QueryCommand, ShowCommand,
        TaskGroupCommand,
    },
    config::Config,
    dashboard,
    perf::PerfOptions,
    registry::{self, TrainingRun},
    storage,
    taskcluster::{self, Queue},
};

use super::types::{OutputFormat, PerfArgs};

fn fetch_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.fetch_timeout_secs)
}

fn load_runs(config: &Config) -> Result<Vec<TrainingRun>> {
    let source = storage::open(&config.source, fetch_timeout(config))
        .with_context(|| format!("failed to open registry source {}", config.source))?;
    let runs = registry::load_training_runs(source.as_ref(), config.fetch_threads)
        .with_context(|| format!("failed to load training runs from {}", source.location()))?;
    Ok(runs)
}

/// Dashboard links are only meaningful for a published registry.
fn link_base(config: &Config) -> Option<Url> {
    Url::parse(&config.source)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

pub fn handle_list(params: ListCommandParams, config: &Config) -> Result<()> {
    let list_command = ListCommand::new(params)?;
    let runs = load_runs(config)?;
    let base = link_base(config);

    let mut out = std::io::stdout().lock();
    list_command
        .execute(&runs, base.as_ref(), &mut out)
        .map_err(|e| anyhow::anyhow!(e))
}

pub fn handle_show(name: String, langpair: String, model: String, config: &Config) -> Result<()> {
    let show_command = ShowCommand::new(name, langpair, &model)?;
    let runs = load_runs(config)?;

    let mut out = std::io::stdout().lock();
    show_command
        .execute(&runs, &config.taskcluster_root_url, &mut out)
        .map_err(|e| anyhow::anyhow!(e))
}

pub fn handle_query(query: String) -> Result<()> {
    let mut out = std::io::stdout().lock();
    QueryCommand { query }
        .execute(&mut out)
        .map_err(|e| anyhow::anyhow!(e))
}

pub fn handle_tree(config: &Config) -> Result<()> {
    let runs = load_runs(config)?;
    let root_url = config.taskcluster_root_url.clone();

    let mut out = std::io::stdout().lock();
    dashboard::write_tree(&mut out, &runs, |id| taskcluster::task_group_url(&root_url, id))
}

pub fn handle_evals(evals: std::path::PathBuf, summary: std::path::PathBuf) -> Result<()> {
    let mut out = std::io::stdout().lock();
    EvalsCommand { evals, summary }
        .execute(&mut out)
        .map_err(|e| anyhow::anyhow!(e))
}

pub fn handle_perf(args: PerfArgs, config: &Config) -> Result<()> {
    let options = PerfOptions {
        source_lang: args.src,
        target_lang: args.trg,
        workdir: args.workdir.unwrap_or_else(|| config.perf.workdir.clone()),
        show_progress: !args.no_progress,
    };
    let engine_url = args
        .engine_url
        .unwrap_or_else(|| config.perf.engine_url.clone());
    let timeout = Duration::from_secs(config.perf.timeout_secs);

    let perf_command = PerfCommand::new(options, engine_url, timeout)?;
    let mut out = std::io::stdout().lock();
    perf_command.execute(&mut out).map_err(|e| anyhow::anyhow!(e))
}

pub fn handle_task_group(task_group_id: String, format: OutputFormat, config: &Config) -> Result<()> {
    let queue = Queue::new(&config.taskcluster_root_url, fetch_timeout(config))?;
    let mut out = std::io::stdout().lock();
    TaskGroupCommand {
        task_group_id,
        format,
    }
    .execute(&queue, &mut out)
    .map_err(|e| anyhow::anyhow!(e))
}
