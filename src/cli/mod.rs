use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod errors;
mod handlers;
mod types;
mod validation;


pub use commands::ListCommandParams;
pub use handlers::*;
pub use types::*;

#[derive(Parser, Debug)]
#[command(version, about = "Browse the translation model registry", long_about = None)]
pub struct Args {
    /// Registry directory or http(s) URL (overrides config)
    #[arg(short, long, global = true)]
    pub source: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate api docs in markdown format
    #[cfg(feature = "markdown-docs")]
    #[clap(hide = true)]
    MarkdownDocs {},

    /// List training runs, filtered by a search query
    List {
        /// Search query, e.g. `spring -langpair:en-de name:"big run"`
        #[clap(short = 'q', long, allow_hyphen_values = true)]
        search: Option<String>,

        /// Restore the view from a dashboard link
        #[clap(long)]
        link: Option<String>,

        /// Sort by column key (name, language, langpair, date, ...)
        #[clap(long)]
        sort: Option<String>,

        /// Sort descending
        #[clap(short, long, default_value = "false")]
        reverse: bool,

        /// Show the model columns
        #[clap(short = 'm', long, default_value = "false")]
        show_models: bool,

        /// Show the corpus columns
        #[clap(short = 'c', long, default_value = "false")]
        show_corpora: bool,

        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Print a dashboard link for this view
        #[clap(long, default_value = "false")]
        print_link: bool,
    },
    /// Show details for one model of a training run
    Show {
        /// Training run name, e.g. spring-2024
        name: String,
        /// Language pair, e.g. en-fr
        langpair: String,
        /// backwards, teacher_1, teacher_2, student, student_finetuned,
        /// student_quantized or student_exported
        model: String,
    },
    /// Print how a search query is parsed
    Query {
        #[clap(allow_hyphen_values = true)]
        query: String,
    },
    /// Print training runs grouped by language pair
    Tree {},
    /// Summarize LLM evaluation scores
    Evals {
        /// llm-eval.json
        evals: PathBuf,
        /// summary.json
        summary: PathBuf,
    },
    /// Time translations against a local inference engine
    Perf {
        #[clap(flatten)]
        perf_args: PerfArgs,
    },
    /// List the tasks of a task group
    TaskGroup {
        task_group_id: String,

        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}
