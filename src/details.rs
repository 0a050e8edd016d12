use std::fmt::Write as _;

use anyhow::Result;

use crate::registry::{google_flores_comet_score, ModelName, ModelRun, TrainingRun};
use crate::search_query::filter_expression;

const CONTINUATION_DOCS: &str =
    "https://mozilla.github.io/translations/docs/training/using-pretrained-models/";

/// One way of re-using a model in another training run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Continuation {
    pub heading: &'static str,
    pub config: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Use,
    Continue,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::Use => "use",
            Mode::Continue => "continue",
        }
    }
}

fn continuation_config(comment: &str, stage: &str, artifact_folder: &str, mode: Mode) -> String {
    [
        "experiment:".to_string(),
        "  pretrained-models:".to_string(),
        format!("    # {comment}"),
        format!("    # See: {CONTINUATION_DOCS}"),
        format!("    {stage}:"),
        "      urls:".to_string(),
        format!("        - {artifact_folder}"),
        format!("      mode: {}", mode.as_str()),
        "      type: default".to_string(),
        String::new(),
    ]
    .join("\n")
}

/// Training continuation snippets offered for a model kind.
pub fn continuations(run: &TrainingRun, model: ModelName, model_run: &ModelRun) -> Vec<Continuation> {
    let folder = model_run.artifact_folder.as_deref().unwrap_or_default();
    let (name, langpair) = (&run.name, &run.langpair);

    let back_translations = || Continuation {
        heading: "Back translation inference",
        config: continuation_config(
            &format!("Use the {langpair} model from the \"{name}\" training run for back translations."),
            "train-backwards",
            folder,
            Mode::Use,
        ),
    };

    match model {
        ModelName::Backwards => vec![back_translations()],
        ModelName::Teacher1 | ModelName::Teacher2 => vec![
            Continuation {
                heading: "Teacher distillation inference",
                config: continuation_config(
                    &format!("Use the existing {langpair} model from the \"{name}\" training run."),
                    "train-teacher",
                    folder,
                    Mode::Use,
                ),
            },
            Continuation {
                heading: "Fine-tune the teacher",
                config: continuation_config(
                    &format!("Fine tune the {langpair} model from the \"{name}\" training run."),
                    "train-teacher",
                    folder,
                    Mode::Continue,
                ),
            },
        ],
        ModelName::Student => vec![
            back_translations(),
            Continuation {
                heading: "Fine-tune the student",
                config: continuation_config(
                    &format!("Fine tune the {langpair} model from the \"{name}\" training run."),
                    "train-student",
                    folder,
                    Mode::Continue,
                ),
            },
            Continuation {
                heading: "Run evaluations and export",
                config: continuation_config(
                    &format!("Use the existing {langpair} model from the \"{name}\" training run."),
                    "train-student",
                    folder,
                    Mode::Use,
                ),
            },
        ],
        // No continuation support.
        ModelName::StudentFinetuned | ModelName::StudentQuantized | ModelName::StudentExported => vec![],
    }
}

/// Last path segment of an artifact URL.
pub fn artifact_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Render the details panel for one model as plain text.
pub fn render(
    run: &TrainingRun,
    model: ModelName,
    model_run: &ModelRun,
    task_group_url: impl Fn(&str) -> String,
) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "# {} ({})", run.name, run.langpair)?;
    writeln!(out, "## {}", model.label())?;
    writeln!(out)?;

    writeln!(out, "Flores Evaluation")?;
    let mut metric_row = |metric: &str, value: &str| {
        let value = if value.is_empty() { "-" } else { value };
        writeln!(out, "  {metric:<18} {value}")
    };
    for metric in ["chrf", "bleu", "comet"] {
        let value = match &model_run.flores {
            Some(flores) => flores
                .metric(metric)
                .map(|v| v.to_string())
                .unwrap_or_default(),
            None => "Not available".to_string(),
        };
        metric_row(metric, &value)?;
    }
    match google_flores_comet_score(run, Some(model_run)) {
        Some(comparison) => {
            metric_row("comet (vs Google)", &comparison.difference)?;
            metric_row("comet (Google)", &comparison.score)?;
        }
        None => metric_row("Google Flores", "Not Available")?,
    }
    writeln!(out)?;

    let date: String = model_run
        .date
        .as_deref()
        .map(|d| d.chars().take("2025-01-01".len()).collect())
        .unwrap_or_else(|| "–".to_string());
    writeln!(out, "Date – {date}")?;
    if let Some(task_group_id) = &model_run.task_group_id {
        writeln!(out, "TaskGroup – {}", task_group_url(task_group_id))?;
    }
    writeln!(
        out,
        "Search – {} {}",
        filter_expression("name", &run.name),
        filter_expression("langpair", &run.langpair)
    )?;
    writeln!(out, "Artifacts")?;
    for url in &model_run.artifact_urls {
        writeln!(out, "  Artifact – {} <{url}>", artifact_file_name(url))?;
    }

    let continuations = continuations(run, model, model_run);
    if !continuations.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Training Continuation")?;
        writeln!(
            out,
            "Re-use this model in another training run. See {CONTINUATION_DOCS} for more information."
        )?;
        for continuation in continuations {
            writeln!(out)?;
            writeln!(out, "#### {}", continuation.heading)?;
            write!(out, "{}", continuation.config)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "## Training Config")?;
    match &model_run.config {
        Some(config) => write!(out, "{}", serde_yml::to_string(config)?)?,
        None => writeln!(out, "Not available")?,
    }

    Ok(out)
}
