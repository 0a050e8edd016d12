use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::storage::BackendLocal;

const CONFIG_FILE: &str = "config.yaml";

/// Published model registry data.
const DEFAULT_SOURCE: &str = "https://mozilla.github.io/translations/model-registry/";
const DEFAULT_TASKCLUSTER_ROOT_URL: &str = "https://firefox-ci-tc.services.mozilla.com";
const FETCH_THREADS: usize = 8;
const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8080/translate";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for the translation timing harness
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerfConfig {
    /// Endpoint of the local inference engine
    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    /// Directory holding `source/` and receiving `translations/`
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,

    /// Per request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            engine_url: default_engine_url(),
            workdir: default_workdir(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_engine_url() -> String {
    DEFAULT_ENGINE_URL.to_string()
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory or http(s) URL holding `training-runs-listing.json`
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_taskcluster_root_url")]
    pub taskcluster_root_url: String,
    #[serde(default = "fetch_threads")]
    pub fetch_threads: usize,
    #[serde(default = "default_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub perf: PerfConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: default_source(),
            taskcluster_root_url: default_taskcluster_root_url(),
            fetch_threads: FETCH_THREADS,
            fetch_timeout_secs: DEFAULT_TIMEOUT_SECS,
            perf: PerfConfig::default(),
        }
    }
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_taskcluster_root_url() -> String {
    DEFAULT_TASKCLUSTER_ROOT_URL.to_string()
}

fn fetch_threads() -> usize {
    FETCH_THREADS
}

/// `$REGDASH_BASE_PATH`, or `~/.config/regdash`.
pub fn base_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("REGDASH_BASE_PATH") {
        return Ok(PathBuf::from(path));
    }
    let home = my_home()
        .context("couldn't look up home dir")?
        .context("couldn't find home dir")?;
    Ok(home.join(".config").join("regdash"))
}

impl Config {
    fn validate(&mut self) -> Result<()> {
        if self.fetch_threads == 0 {
            self.fetch_threads = 1
        }
        if self.source.trim().is_empty() {
            bail!("source must not be empty");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be greater than 0");
        }
        if self.perf.timeout_secs == 0 {
            bail!("perf.timeout_secs must be greater than 0");
        }
        if let Err(e) = url::Url::parse(&self.perf.engine_url) {
            bail!("perf.engine_url {:?} is not a valid url: {e}", self.perf.engine_url);
        }
        if let Err(e) = url::Url::parse(&self.taskcluster_root_url) {
            bail!(
                "taskcluster_root_url {:?} is not a valid url: {e}",
                self.taskcluster_root_url
            );
        }
        Ok(())
    }

    /// Load `config.yaml` from `base_path`, writing the defaults first when it
    /// doesn't exist yet.
    pub fn load_with(base_path: &Path) -> Result<Self> {
        let store = BackendLocal::new(base_path);
        let path = base_path.join(CONFIG_FILE);

        if !store.exists(CONFIG_FILE) {
            log::info!("Creating default config at {}", path.display());
            Self::default().save(base_path)?;
        }

        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str)
            .with_context(|| format!("config at {} is malformed", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn load() -> Result<Self> {
        Self::load_with(&base_path()?)
    }

    pub fn save(&self, base_path: &Path) -> Result<()> {
        let store = BackendLocal::new(base_path);
        let config_str = serde_yml::to_string(&self)?;
        store
            .write(CONFIG_FILE, config_str.as_bytes())
            .with_context(|| format!("failed to write config to {}", base_path.display()))?;
        Ok(())
    }
}
