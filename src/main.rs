mod allow;
mod batch;
mod commands;
mod config;
mod diagnostics;
mod error;
mod frontmatter;
mod grammar;
mod info;
mod parser;
mod references;
mod report;
mod resolver;
mod scanner;
mod schema;
mod symbols;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Overrides;
use crate::diagnostics::OutputFormat;

#[derive(Parser)]
#[command(name = "llmtxt", version, about = "Conformance checker for llm.txt documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate llm.txt documents (exit 0 ok, 1 denied warnings, 2 errors)
    Check {
        /// Files or directories to check. Defaults to the current directory.
        paths: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Check, then re-check whenever a document or the config changes
    Watch {
        /// Files or directories to watch. Defaults to the current directory.
        paths: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Print the Index and Module Section symbol tables of a document
    Symbols {
        /// The document to read.
        file: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Manage the reference allowlist in .llmtxt.toml
    Allow {
        #[command(subcommand)]
        action: AllowAction,
    },
    /// Show codes, exit codes, configuration, and current state
    Info {
        /// Output as JSON instead of markdown.
        #[arg(long)]
        json: bool,
    },
}

/// Rendering options shared by `check` and `watch`.
#[derive(Args)]
struct OutputArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Exit 1 when warnings are present and there are no errors.
    #[arg(long)]
    deny_warnings: bool,
}

/// Config overrides shared by `check` and `watch`.
#[derive(Args)]
struct OverrideArgs {
    /// Treat out-of-order sections as info instead of warnings.
    #[arg(long)]
    no_strict_order: bool,

    /// Accepted frontmatter language (repeatable). Replaces the configured list.
    #[arg(long = "language", value_name = "LANG")]
    languages: Vec<String>,

    /// Extra allowlist entry for example references (repeatable).
    #[arg(long = "allow", value_name = "NAME")]
    allow: Vec<String>,

    /// Number of worker threads (0 = available parallelism).
    #[arg(long)]
    workers: Option<usize>,
}

impl OverrideArgs {
    /// Convert to config overrides.
    fn into_overrides(self) -> Overrides {
        return Overrides {
            allow: self.allow,
            languages: self.languages,
            relaxed_order: self.no_strict_order,
            workers: self.workers,
        };
    }
}

#[derive(Subcommand)]
enum AllowAction {
    /// List configured and built-in allowlist entries
    List,
    /// Add a leading identifier to the allowlist
    Add {
        /// Identifier such as `httpx`.
        name: String,
    },
    /// Remove a leading identifier from the allowlist
    Remove {
        /// Identifier to remove.
        name: String,
    },
}

/// Install the stderr log subscriber.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        return EnvFilter::new(level);
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check { paths, output, overrides } => commands::check(
            &paths,
            &overrides.into_overrides(),
            output.format,
            output.deny_warnings,
        ),
        Commands::Watch { paths, output, overrides } => {
            let overrides = overrides.into_overrides();
            watch::run(&watch::WatchOptions {
                deny_warnings: output.deny_warnings,
                format: output.format,
                overrides: &overrides,
                paths: &paths,
            })
        },
        Commands::Symbols { file, json } => commands::symbols(&file, json),
        Commands::Allow { action } => match action {
            AllowAction::List => allow::cmd_list(),
            AllowAction::Add { name } => allow::cmd_add(&name),
            AllowAction::Remove { name } => allow::cmd_remove(&name),
        }
        .map(|()| return ExitCode::SUCCESS),
        Commands::Info { json } => {
            info::run(json);
            Ok(ExitCode::SUCCESS)
        },
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            diagnostics::print_error(&e);
            ExitCode::from(3)
        },
    };
}
