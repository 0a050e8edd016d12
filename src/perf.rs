use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::storage::BackendLocal;

/// Something that can translate a line of text.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str) -> Result<String>;
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    from: &'a str,
    to: &'a str,
    html: bool,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// Talks to a locally running inference engine over HTTP.
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    engine_url: String,
    from: String,
    to: String,
}

impl HttpTranslator {
    pub fn new(engine_url: &str, from: &str, to: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            engine_url: engine_url.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.engine_url)
            .json(&TranslateRequest {
                text,
                from: &self.from,
                to: &self.to,
                html: false,
            })
            .send()
            .with_context(|| format!("engine at {} is unreachable", self.engine_url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            bail!("engine returned {status}: {body}");
        }

        Ok(resp.json::<TranslateResponse>()?.translation)
    }
}

#[derive(Clone, Debug)]
pub struct PerfOptions {
    pub source_lang: String,
    pub target_lang: String,
    /// Holds `source/<lang>.txt`; `translations/<lang>.txt` is written here.
    pub workdir: PathBuf,
    pub show_progress: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PerfReport {
    pub lines: usize,
    pub elapsed_ms: u128,
    pub output: PathBuf,
}

/// Non-empty lines of the source file.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        bail!(
            "Please provide a source translation file for that language: {}",
            path.display()
        );
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{elapsed_precise} [{bar:40}] {pos}/{len} lines") {
        bar.set_style(style);
    }
    bar
}

/// Translate every source line at once and time the whole batch.
pub fn run_perf(opts: &PerfOptions, translator: &dyn Translator) -> Result<PerfReport> {
    if !(opts.source_lang == "en" || opts.target_lang == "en") {
        bail!("Pivot languages are not supported.");
    }

    let source_path = opts
        .workdir
        .join("source")
        .join(format!("{}.txt", opts.source_lang));
    let lines = read_lines(&source_path)?;
    log::info!(
        "translating {} lines {} -> {}",
        lines.len(),
        opts.source_lang,
        opts.target_lang
    );

    let bar = progress_bar(lines.len(), opts.show_progress);
    let start = Instant::now();
    let translations: Vec<String> = lines
        .par_iter()
        .map(|line| {
            let translated = translator.translate(line);
            bar.inc(1);
            translated
        })
        .collect::<Result<_>>()?;
    let elapsed_ms = start.elapsed().as_millis();
    bar.finish_and_clear();

    let store = BackendLocal::new(&opts.workdir);
    let output = store
        .write(
            &format!("translations/{}.txt", opts.source_lang),
            translations.join("\n").as_bytes(),
        )
        .context("failed to write translations")?;

    log::info!("Translation completed in {elapsed_ms}ms");

    Ok(PerfReport {
        lines: translations.len(),
        elapsed_ms,
        output,
    })
}
