#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("Could not find the model \"{name}\" ({langpair})")]
    RunNotFound { name: String, langpair: String },

    #[error("That model couldn't be found for \"{name}\" ({langpair})")]
    ModelNotFound { name: String, langpair: String },

    #[error("unknown model name: {0}")]
    UnknownModelName(String),

    #[error("failed to fetch {url}: {status}")]
    Status { url: String, status: reqwest::StatusCode },

    #[error("reqwest error: {0:?}")]
    Reqwest(#[from] reqwest::Error),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}
