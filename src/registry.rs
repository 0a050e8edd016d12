use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::RegistryError;
use crate::storage::DataSource;

pub const LISTING_FILE: &str = "training-runs-listing.json";
pub const RUNS_DIR: &str = "training-runs";

/// Below this many percent of Google's comet score a model is not releasable.
pub const RELEASE_THRESHOLD_PERCENT: f64 = -5.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub chrf: Option<f64>,
    pub bleu: Option<f64>,
    pub comet: Option<f64>,
}

impl Evaluation {
    pub fn metric(&self, metric: &str) -> Option<f64> {
        match metric {
            "chrf" => self.chrf,
            "bleu" => self.bleu,
            "comet" => self.comet,
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub source_url: String,
    pub source_bytes: u64,
    pub target_url: String,
    pub target_bytes: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRun {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    #[serde(default)]
    pub task_group_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub flores: Option<Evaluation>,
    #[serde(default)]
    pub artifact_folder: Option<String>,
    #[serde(default)]
    pub artifact_urls: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingRun {
    /// e.g. "spring-2024"
    pub name: String,
    pub langpair: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub task_group_ids: Vec<String>,
    #[serde(default)]
    pub date_started: Option<String>,

    /// e.g. { "google": 0.8708, ... }
    #[serde(default)]
    pub comet_flores_comparison: BTreeMap<String, f64>,
    #[serde(default)]
    pub bleu_flores_comparison: BTreeMap<String, f64>,

    #[serde(default)]
    pub parallel_corpus_aligned: Option<Corpus>,
    #[serde(default)]
    pub backtranslations_corpus_aligned: Option<Corpus>,
    #[serde(default)]
    pub distillation_corpus_aligned: Option<Corpus>,
    #[serde(default)]
    pub parallel_corpus: Option<Corpus>,
    #[serde(default)]
    pub backtranslations_corpus: Option<Corpus>,
    #[serde(default)]
    pub distillation_corpus: Option<Corpus>,

    #[serde(default)]
    pub backwards: Option<ModelRun>,
    #[serde(default)]
    pub teacher_1: Option<ModelRun>,
    #[serde(default)]
    pub teacher_2: Option<ModelRun>,
    #[serde(default)]
    pub student: Option<ModelRun>,
    #[serde(default)]
    pub student_finetuned: Option<ModelRun>,
    #[serde(default)]
    pub student_quantized: Option<ModelRun>,
    #[serde(default)]
    pub student_exported: Option<ModelRun>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelName {
    Backwards,
    Teacher1,
    Teacher2,
    Student,
    StudentFinetuned,
    StudentQuantized,
    StudentExported,
}

impl ModelName {
    pub const ALL: [ModelName; 7] = [
        ModelName::Backwards,
        ModelName::Teacher1,
        ModelName::Teacher2,
        ModelName::Student,
        ModelName::StudentFinetuned,
        ModelName::StudentQuantized,
        ModelName::StudentExported,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Backwards => "backwards",
            ModelName::Teacher1 => "teacher_1",
            ModelName::Teacher2 => "teacher_2",
            ModelName::Student => "student",
            ModelName::StudentFinetuned => "student_finetuned",
            ModelName::StudentQuantized => "student_quantized",
            ModelName::StudentExported => "student_exported",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelName::Backwards => "Backwards",
            ModelName::Teacher1 => "Teacher 1",
            ModelName::Teacher2 => "Teacher 2",
            ModelName::Student => "Student",
            ModelName::StudentFinetuned => "Student Finetuned",
            ModelName::StudentQuantized => "Student Quantized",
            ModelName::StudentExported => "Student Exported",
        }
    }
}

impl Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelName::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownModelName(s.to_string()))
    }
}

impl TrainingRun {
    pub fn model(&self, model: ModelName) -> Option<&ModelRun> {
        match model {
            ModelName::Backwards => self.backwards.as_ref(),
            ModelName::Teacher1 => self.teacher_1.as_ref(),
            ModelName::Teacher2 => self.teacher_2.as_ref(),
            ModelName::Student => self.student.as_ref(),
            ModelName::StudentFinetuned => self.student_finetuned.as_ref(),
            ModelName::StudentQuantized => self.student_quantized.as_ref(),
            ModelName::StudentExported => self.student_exported.as_ref(),
        }
    }

    /// Corpora in the order the dashboard shows them.
    pub fn corpora(&self) -> [(&'static str, Option<&Corpus>); 6] {
        [
            ("Parallel Aligned", self.parallel_corpus_aligned.as_ref()),
            ("Backtranslations Aligned", self.backtranslations_corpus_aligned.as_ref()),
            ("Distillation Aligned", self.distillation_corpus_aligned.as_ref()),
            ("Parallel", self.parallel_corpus.as_ref()),
            ("Backtranslations", self.backtranslations_corpus.as_ref()),
            ("Distillation", self.distillation_corpus.as_ref()),
        ]
    }

    /// The non-English side of the pair.
    pub fn language_tag(&self) -> &str {
        if self.source_lang == "en" {
            &self.target_lang
        } else {
            &self.source_lang
        }
    }
}

/// How a model's flores comet score compares with Google's.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CometComparison {
    pub percentage: f64,
    /// Signed percentage, e.g. "+1.25" or "-6.10".
    pub difference: String,
    /// Google's score scaled to 0-100.
    pub score: String,
}

impl CometComparison {
    pub fn meets_release_criteria(&self) -> bool {
        self.percentage >= RELEASE_THRESHOLD_PERCENT
    }
}

pub fn google_flores_comet_score(run: &TrainingRun, model: Option<&ModelRun>) -> Option<CometComparison> {
    let google = *run.comet_flores_comparison.get("google")?;
    let comet = model?.flores.as_ref()?.comet?;
    if google == 0.0 || comet == 0.0 {
        return None;
    }

    let percentage = 100.0 * (1.0 - google / (comet / 100.0));
    let sign = if percentage >= 0.0 { "+" } else { "" };
    Some(CometComparison {
        percentage,
        difference: format!("{sign}{percentage:.2}"),
        score: format!("{:.2}", google * 100.0),
    })
}

pub fn find_run<'a>(runs: &'a [TrainingRun], name: &str, langpair: &str) -> Result<&'a TrainingRun, RegistryError> {
    runs.iter()
        .find(|run| run.name == name && run.langpair == langpair)
        .ok_or_else(|| RegistryError::RunNotFound {
            name: name.to_string(),
            langpair: langpair.to_string(),
        })
}

pub fn find_model<'a>(
    runs: &'a [TrainingRun],
    name: &str,
    langpair: &str,
    model: ModelName,
) -> Result<(&'a TrainingRun, &'a ModelRun), RegistryError> {
    let run = find_run(runs, name, langpair)?;
    let model_run = run.model(model).ok_or_else(|| RegistryError::ModelNotFound {
        name: name.to_string(),
        langpair: langpair.to_string(),
    })?;
    Ok((run, model_run))
}

fn read_json<T: serde::de::DeserializeOwned>(source: &dyn DataSource, ident: &str) -> Result<T, RegistryError> {
    let bytes = source.read(ident)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Load every training run named in the listing.
///
/// The listing itself must load. Individual runs that fail are logged and
/// skipped so one broken file doesn't blank the dashboard. Results keep the
/// listing order.
pub fn load_training_runs(source: &dyn DataSource, threads: usize) -> Result<Vec<TrainingRun>, RegistryError> {
    let _span = tracing::info_span!("load_training_runs", source = %source.location()).entered();

    let listing: Vec<String> = read_json(source, LISTING_FILE)?;
    log::info!("{} training runs listed at {}", listing.len(), source.location());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| RegistryError::Other(e.into()))?;

    let results: Vec<(String, Result<TrainingRun, RegistryError>)> = pool.install(|| {
        listing
            .par_iter()
            .map(|filename| {
                let ident = format!("{RUNS_DIR}/{filename}");
                (ident.clone(), read_json(source, &ident))
            })
            .collect()
    });

    let mut runs = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (ident, result) in results {
        match result {
            Ok(run) => runs.push(run),
            Err(e) => {
                failed += 1;
                log::warn!("failed to load {ident}: {e}");
            }
        }
    }
    if failed > 0 {
        log::error!("some fetches failed: {failed} of {}", failed + runs.len());
    }

    Ok(runs)
}

/// Runs grouped by language pair, pairs and runs in first-seen order.
pub fn group_by_langpair(runs: &[TrainingRun]) -> Vec<(&str, Vec<&TrainingRun>)> {
    let mut groups: Vec<(&str, Vec<&TrainingRun>)> = Vec::new();
    for run in runs {
        match groups.iter_mut().find(|(langpair, _)| *langpair == run.langpair) {
            Some((_, group)) => group.push(run),
            None => groups.push((run.langpair.as_str(), vec![run])),
        }
    }
    groups
}
