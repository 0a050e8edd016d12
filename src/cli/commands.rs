use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::{
    cli::{errors::CliError, errors::CliResult, types::OutputFormat, validation::*},
    dashboard, details, evals,
    perf::{self, HttpTranslator, PerfOptions},
    registry::{self, ModelName, TrainingRun},
    search_query,
    state::UiState,
    taskcluster::{self, Queue},
};

/// Parameters for creating a list command
#[derive(Debug, Clone, Default)]
pub struct ListCommandParams {
    pub search: Option<String>,
    pub link: Option<String>,
    pub sort: Option<String>,
    pub reverse: bool,
    pub show_models: bool,
    pub show_corpora: bool,
    pub format: OutputFormat,
    pub print_link: bool,
}

/// Command for listing training runs
#[derive(Debug, Clone)]
pub struct ListCommand {
    pub state: UiState,
    pub sort: Option<String>,
    pub reverse: bool,
    pub format: OutputFormat,
    pub print_link: bool,
}

impl ListCommand {
    pub fn new(params: ListCommandParams) -> CliResult<Self> {
        let mut state = params
            .link
            .as_deref()
            .map(UiState::from_query)
            .unwrap_or_default();

        // Explicit flags win over the link.
        if let Some(search) = params.search {
            state.search_string = search;
        }
        state.show_models |= params.show_models;
        state.show_corpora |= params.show_corpora;

        if let Some(key) = &params.sort {
            validate_sort_key(key)?;
        }
        if params.reverse && params.sort.is_none() {
            return Err(CliError::validation("reverse", "--reverse needs --sort"));
        }

        Ok(Self {
            state,
            sort: params.sort,
            reverse: params.reverse,
            format: params.format,
            print_link: params.print_link,
        })
    }

    pub fn execute(self, runs: &[TrainingRun], link_base: Option<&Url>, out: &mut impl Write) -> CliResult<()> {
        let mut table = dashboard::build_table(runs, &self.state);

        if let Some(key) = &self.sort {
            table.sort_by_key(key);
            if self.reverse {
                // Sorting the same column again flips the direction.
                table.sort_by_key(key);
            }
            log::debug!("sorted by {key} {:?}", table.sort_state().direction);
        }

        let shown = dashboard::shown_columns(&self.state);
        match self.format {
            OutputFormat::Text => dashboard::write_text(out, &table, &shown)?,
            OutputFormat::Json => dashboard::write_json(&mut *out, &table, &shown)?,
            OutputFormat::Csv => dashboard::write_csv(&mut *out, &table, &shown)?,
        }

        log::debug!(
            "{} of {} training runs match {:?}",
            table.visible_rows().count(),
            table.rows.len(),
            self.state.search_string
        );

        if self.print_link {
            match link_base {
                Some(base) => writeln!(out, "{}", self.state.to_link(base))?,
                None => writeln!(out, "?{}", self.state.to_query())?,
            }
        }
        Ok(())
    }
}

/// Command for showing one model of a training run
#[derive(Debug, Clone)]
pub struct ShowCommand {
    pub name: String,
    pub langpair: String,
    pub model: ModelName,
}

impl ShowCommand {
    pub fn new(name: String, langpair: String, model: &str) -> CliResult<Self> {
        if name.trim().is_empty() {
            return Err(CliError::validation("name", "name cannot be empty"));
        }
        validate_langpair(&langpair)?;
        let model = model
            .parse::<ModelName>()
            .map_err(|e| CliError::validation("model", e.to_string()))?;
        Ok(Self {
            name,
            langpair,
            model,
        })
    }

    pub fn execute(self, runs: &[TrainingRun], taskcluster_root_url: &str, out: &mut impl Write) -> CliResult<()> {
        let (run, model_run) = registry::find_model(runs, &self.name, &self.langpair, self.model)?;
        let text = details::render(run, self.model, model_run, |id| {
            taskcluster::task_group_url(taskcluster_root_url, id)
        })?;
        write!(out, "{text}")?;
        Ok(())
    }
}

/// Command for printing a parsed search query
#[derive(Debug, Clone)]
pub struct QueryCommand {
    pub query: String,
}

impl QueryCommand {
    pub fn execute(self, out: &mut impl Write) -> CliResult<()> {
        let parsed = search_query::parse_search_query(&self.query);
        if parsed.is_empty() {
            log::info!("empty query, every row matches");
        }
        writeln!(out, "{}", serde_json::to_string_pretty(&parsed)?)?;
        Ok(())
    }
}

/// Command for summarizing LLM evaluations
#[derive(Debug, Clone)]
pub struct EvalsCommand {
    pub evals: PathBuf,
    pub summary: PathBuf,
}

impl EvalsCommand {
    fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> CliResult<T> {
        let bytes = std::fs::read(path)
            .map_err(|e| CliError::validation("path", format!("{}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CliError::validation("path", format!("{}: {e}", path.display())))
    }

    pub fn execute(self, out: &mut impl Write) -> CliResult<()> {
        let evaluations: Vec<evals::Evaluation> = Self::read_json(&self.evals)?;
        let summary: evals::Summary = Self::read_json(&self.summary)?;

        let analysis = evals::analyze_evals(&evaluations);
        evals::write_analysis(out, &analysis, &summary)?;
        Ok(())
    }
}

/// Command for timing translations
#[derive(Debug, Clone)]
pub struct PerfCommand {
    pub options: PerfOptions,
    pub engine_url: String,
    pub timeout: Duration,
}

impl PerfCommand {
    pub fn new(options: PerfOptions, engine_url: String, timeout: Duration) -> CliResult<Self> {
        validate_lang("src", &options.source_lang)?;
        validate_lang("trg", &options.target_lang)?;
        validate_url("engine-url", &engine_url)?;
        Ok(Self {
            options,
            engine_url,
            timeout,
        })
    }

    pub fn execute(self, out: &mut impl Write) -> CliResult<()> {
        let translator = HttpTranslator::new(
            &self.engine_url,
            &self.options.source_lang,
            &self.options.target_lang,
            self.timeout,
        )?;
        let report = perf::run_perf(&self.options, &translator)?;
        writeln!(
            out,
            "Translation completed in {}ms ({} lines, written to {})",
            report.elapsed_ms,
            report.lines,
            report.output.display()
        )?;
        Ok(())
    }
}

/// Command for listing the tasks in a task group
#[derive(Debug, Clone)]
pub struct TaskGroupCommand {
    pub task_group_id: String,
    pub format: OutputFormat,
}

impl TaskGroupCommand {
    pub fn execute(self, queue: &Queue, out: &mut impl Write) -> CliResult<()> {
        let task_group = queue.fetch_task_group(&self.task_group_id)?;
        match self.format {
            OutputFormat::Json => {
                writeln!(out, "{}", serde_json::to_string_pretty(&task_group)?)?;
            }
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut *out);
                writer
                    .write_record(["task_id", "state", "name"])
                    .map_err(|e| CliError::output(e.to_string()))?;
                for entry in &task_group.tasks {
                    writer
                        .write_record([
                            &entry.status.task_id,
                            &entry.status.state,
                            &entry.task.metadata.name,
                        ])
                        .map_err(|e| CliError::output(e.to_string()))?;
                }
                writer.flush()?;
            }
            OutputFormat::Text => {
                writeln!(out, "{}", queue.task_group_url(&self.task_group_id))?;
                for entry in &task_group.tasks {
                    writeln!(
                        out,
                        "{:<22} {:<10} {}",
                        entry.status.task_id, entry.status.state, entry.task.metadata.name
                    )?;
                }
                writeln!(out, "{} tasks", task_group.tasks.len())?;
            }
        }
        Ok(())
    }
}
