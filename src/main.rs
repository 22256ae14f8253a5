use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

use gitsweep::config::Config;
use gitsweep::gitlab::GitLabClient;
use gitsweep::run::{run_sweep, FatalError, RunSummary, SweepPlan};
use gitsweep::search::build_backend;
use gitsweep::sink::FileSink;
use gitsweep::workspace::WorkspaceFetcher;
use gitsweep::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(&cli) {
        Ok(summary) => {
            print_summary(&summary);
            if summary.errors > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("GITSWEEP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // A second init only happens in tests; ignore it.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn execute(cli: &Cli) -> Result<RunSummary, FatalError> {
    let mut config = Config::from_file(&cli.config)?;
    if cli.list_branches {
        config.list_branches_only = true;
    }
    if let Some(ref log_dir) = cli.log_dir {
        config.log_dir = log_dir.clone();
    }

    let plan = SweepPlan::from_config(&config)?;

    let api = GitLabClient::new(&config.gitlab.api_url, config.gitlab.effective_token());
    let fetcher = WorkspaceFetcher::new(&config.workspace_dir);
    let mut backend = build_backend(config.search.backend, &config.search.external_command)?;
    let mut sink = FileSink::create(&config.log_dir)?;

    run_sweep(
        &plan,
        &api,
        &config.gitlab.api_url,
        &fetcher,
        backend.as_mut(),
        &mut sink,
    )
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Sweep complete".bold());
    println!("  projects: {}", summary.projects);
    println!("  branches: {}", summary.branches);
    println!(
        "  matches:  {}",
        if summary.matches > 0 {
            summary.matches.to_string().yellow().to_string()
        } else {
            summary.matches.to_string()
        }
    );
    println!(
        "  errors:   {}",
        if summary.errors > 0 {
            summary.errors.to_string().red().to_string()
        } else {
            summary.errors.to_string().green().to_string()
        }
    );
}
