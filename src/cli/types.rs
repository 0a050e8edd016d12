use std::path::PathBuf;

use clap::{Args as ClapArgs, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PerfArgs {
    /// Source language
    #[clap(long)]
    pub src: String,

    /// Target language
    #[clap(long)]
    pub trg: String,

    /// Directory holding source/<src>.txt (overrides config)
    #[clap(short, long)]
    pub workdir: Option<PathBuf>,

    /// Inference engine endpoint (overrides config)
    #[clap(short, long)]
    pub engine_url: Option<String>,

    /// Don't draw a progress bar
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}
