use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Optimize every eligible image under the root directory
    Optimize {
        #[arg(long, help = "Directory to scan; defaults to the current directory")]
        root: Option<PathBuf>,

        #[arg(
            long,
            env = "OPTIPRESS_API_KEY",
            help = "API key for the optimization service"
        )]
        api_key: String,

        #[arg(
            long,
            default_value_t = 25,
            help = "Maximum concurrent uploads per iteration"
        )]
        batch_size: usize,

        #[arg(
            long,
            default_value_t = 500,
            help = "Milliseconds between settlement checks"
        )]
        check_interval_ms: u64,

        #[arg(
            long,
            default_value_t = 30_000,
            help = "Milliseconds an iteration may run before stragglers are quarantined"
        )]
        deadline_ms: u64,
    },
    /// Move optimized files recorded in the ledger into an output directory
    Relocate {
        #[arg(
            long,
            help = "Directory the optimize run scanned; defaults to the current directory"
        )]
        root: Option<PathBuf>,

        #[arg(long, help = "Directory that receives the optimized files")]
        output: PathBuf,

        #[arg(long, default_value_t = 50, help = "Files moved per batch")]
        batch_size: usize,

        #[arg(
            long,
            default_value_t = 100,
            help = "Milliseconds between settlement checks"
        )]
        poll_interval_ms: u64,
    },
    /// Show the month-to-date compression count for the account
    Usage {
        #[arg(
            long,
            env = "OPTIPRESS_API_KEY",
            help = "API key for the optimization service"
        )]
        api_key: String,
    },
}
