//! rigspec CLI - rig test specification calculator.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::RigspecConfig;

/// Used when `RUST_LOG` is unset. Target prefixes cover both crates.
const DEFAULT_LOG_DIRECTIVE: &str = "rigspec=info";

#[derive(Parser)]
#[command(name = "rigspec", version, about = "Rig test specification calculator")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History log path (overrides config)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available tests
    List {
        /// Print the full schemas as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the input and output fields of a test
    Show {
        /// Test name, e.g. "Panic Brake Fatigue" or panic-brake-fatigue
        test: String,

        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a test
    Eval {
        /// Test name
        test: String,

        /// Input value as label=value (repeatable)
        #[arg(long = "set", value_name = "LABEL=VALUE")]
        set: Vec<String>,

        /// JSON file of label-keyed inputs
        #[arg(long)]
        inputs: Option<PathBuf>,

        /// Start from the form defaults
        #[arg(long)]
        defaults: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Append the calculation to the history log
        #[arg(long)]
        save: bool,

        /// Project code for saved calculations
        #[arg(long)]
        project: Option<String>,

        /// Write a PDF report
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Prompt for values and calculate interactively
    Interactive,

    /// Browse saved calculations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Export a saved calculation
    Export {
        /// Record id or unique id prefix
        id: String,

        /// Write a PDF report
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Write a JSON report
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved calculations
    List {
        /// Only records for this project code
        #[arg(long)]
        project: Option<String>,
    },

    /// Show one saved calculation
    Show {
        /// Record id or unique id prefix
        id: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config, cli.history).and_then(|config| match cli.command {
        Commands::List { json } => commands::list::execute(json),
        Commands::Show { test, json } => commands::show::execute(&test, json),
        Commands::Eval {
            test,
            set,
            inputs,
            defaults,
            json,
            save,
            project,
            pdf,
        } => commands::eval::execute(
            &config,
            commands::eval::EvalArgs {
                test,
                set,
                inputs,
                defaults,
                json,
                save,
                project,
                pdf,
            },
        ),
        Commands::Interactive => commands::interactive::execute(&config),
        Commands::History { action } => match action {
            HistoryAction::List { project } => commands::history::list(&config, project.as_deref()),
            HistoryAction::Show { id, json } => commands::history::show(&config, &id, json),
        },
        Commands::Export { id, pdf, json } => commands::export::execute(&config, &id, pdf, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>, history: Option<PathBuf>) -> anyhow::Result<RigspecConfig> {
    let mut config = config::load_config_from(path.as_deref())?;
    if let Some(history) = history {
        config.history_path = history;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::Directive;

    #[test]
    fn default_log_directive() {
        let directive: Directive = DEFAULT_LOG_DIRECTIVE.parse().unwrap();
        assert_eq!(directive.to_string(), "rigspec=info");
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
