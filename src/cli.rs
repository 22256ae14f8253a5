use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gitsweep",
    version,
    about = "Sweep GitLab project branches for occurrences of a target string",
    long_about = "gitsweep resolves projects from a GitLab instance, selects branches per \
policy, shallow-clones each one, and records every line containing the configured target string."
)]
pub struct Cli {
    /// Path to the run configuration file
    #[arg(short, long, default_value = "gitsweep.yaml")]
    pub config: PathBuf,

    /// Only print the selected branch names; do not clone or scan
    #[arg(long)]
    pub list_branches: bool,

    /// Directory for result logs (overrides the configured log_dir)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
