use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;

pub const DEFAULT_DATA_PATH: &str = "datasets/healthcare_stroke_dataset_clean.csv";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8050";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Stroke patients dashboard", long_about = None)]
pub struct DashboardArgs {
    #[arg(short, long, env = "STROKE_DATA", default_value = DEFAULT_DATA_PATH,
    help = "CSV file with one patient per row")]
    pub data: PathBuf,
    #[arg(short, long, env = "STROKE_ADDR", default_value = DEFAULT_ADDR,
    help = "Address the HTTP server listens on")]
    pub addr: String,
    #[arg(short, long, action = clap::ArgAction::Count,
    help = "Verbose level")]
    pub verbose: u8,
    #[arg(long, help = "Exit instead of serving an error page when the data cannot be loaded")]
    pub strict: bool,
}

impl DashboardArgs {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Installs the global logger. `STROKE_LOG` overrides the level picked from `-v`.
pub fn init_logging(args: &DashboardArgs) {
    let env = Env::new().filter("STROKE_LOG");
    let _ = Builder::new()
        .filter(Some("stroke_dashboard"), args.log_level())
        .parse_env(env)
        .try_init();
}
