use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::errors::RegistryError;

/// Somewhere the registry's JSON files can be read from.
pub trait DataSource: Send + Sync {
    fn read(&self, ident: &str) -> Result<Vec<u8>, RegistryError>;

    /// Human readable location, for logs.
    fn location(&self) -> String;
}

#[derive(Clone, Debug)]
pub struct BackendLocal {
    pub base_dir: PathBuf,
}

impl BackendLocal {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        BackendLocal {
            base_dir: base_dir.into(),
        }
    }

    fn path_of(&self, ident: &str) -> std::io::Result<PathBuf> {
        let relative = Path::new(ident);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("refusing to access {ident:?} outside {}", self.base_dir.display()),
            ));
        }
        Ok(self.base_dir.join(relative))
    }

    pub fn exists(&self, ident: &str) -> bool {
        self.path_of(ident)
            .map(|path| std::fs::metadata(path).is_ok())
            .unwrap_or(false)
    }

    /// Write through a temporary file so readers never see a partial file.
    pub fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.path_of(ident)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
        temp_name.push(format!(".{}.tmp", std::process::id()));
        let temp_path = path.with_file_name(temp_name);

        std::fs::write(&temp_path, data)?;
        std::fs::rename(&temp_path, &path)?;
        Ok(path)
    }
}

impl DataSource for BackendLocal {
    fn read(&self, ident: &str) -> Result<Vec<u8>, RegistryError> {
        let path = self.path_of(ident)?;
        Ok(std::fs::read(path)?)
    }

    fn location(&self) -> String {
        self.base_dir.display().to_string()
    }
}

pub struct BackendHttp {
    base_url: Url,
    client: reqwest::blocking::Client,
}

impl BackendHttp {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        // Without the trailing slash `join` replaces the last path segment.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn url_of(&self, ident: &str) -> Result<Url, RegistryError> {
        Ok(self.base_url.join(ident)?)
    }
}

impl DataSource for BackendHttp {
    fn read(&self, ident: &str) -> Result<Vec<u8>, RegistryError> {
        let url = self.url_of(ident)?;
        log::debug!("fetching {url}");

        let resp = self.client.get(url.clone()).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(resp.bytes()?.to_vec())
    }

    fn location(&self) -> String {
        self.base_url.to_string()
    }
}

/// Pick a backend from a source string: `http(s)://` URLs are fetched, anything
/// else is a local directory.
pub fn open(source: &str, timeout: Duration) -> Result<Box<dyn DataSource>, RegistryError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Box::new(BackendHttp::new(source, timeout)?))
    } else {
        Ok(Box::new(BackendLocal::new(source)))
    }
}
