use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod dashboard;
mod details;
mod errors;
mod evals;
mod perf;
mod registry;
mod search_query;
mod state;
mod storage;
mod table;
mod taskcluster;
#[cfg(test)]
mod tests;

use cli::{Args, Command};
use config::Config;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so table output can be piped.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Only commands touching the registry or the engine read the config.
    let source = args.source;
    let load_config = || -> anyhow::Result<Config> {
        let mut config = Config::load().context("failed to load config")?;
        if let Some(source) = &source {
            config.source = source.clone();
        }
        Ok(config)
    };

    match args.command {
        #[cfg(feature = "markdown-docs")]
        Command::MarkdownDocs {} => {
            clap_markdown::print_help_markdown::<Args>();
            Ok(())
        }

        Command::List {
            search,
            link,
            sort,
            reverse,
            show_models,
            show_corpora,
            format,
            print_link,
        } => cli::handle_list(
            cli::ListCommandParams {
                search,
                link,
                sort,
                reverse,
                show_models,
                show_corpora,
                format,
                print_link,
            },
            &load_config()?,
        ),

        Command::Show {
            name,
            langpair,
            model,
        } => cli::handle_show(name, langpair, model, &load_config()?),

        Command::Query { query } => cli::handle_query(query),

        Command::Tree {} => cli::handle_tree(&load_config()?),

        Command::Evals { evals, summary } => cli::handle_evals(evals, summary),

        Command::Perf { perf_args } => cli::handle_perf(perf_args, &load_config()?),

        Command::TaskGroup {
            task_group_id,
            format,
        } => cli::handle_task_group(task_group_id, format, &load_config()?),
    }
}
