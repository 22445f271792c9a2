use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use crate::csv_reader::{ProductCatalog, Source};
use crate::error::{DashError, Result};

const DEFAULT_SOURCE: &'static str = "https://raw.githubusercontent.com/Ginnya-v2/customer_analysis/refs/heads/master/01_CustomerSubscriptionDataset/02_make_simple_dashboard/00_dataset/data.csv";

#[derive(Debug, Parser)]
#[command(name = "support_dash")]
#[command(about = "Terminal dashboard over customer-support interaction data", long_about = None)]
pub struct Config {
    /// CSV path or http(s) URL
    #[arg(default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Allowed product name; repeat to build a strict catalog
    #[arg(long = "product", value_name = "NAME")]
    pub products: Vec<String>,

    /// Print the unfiltered dashboard as JSON and exit
    #[arg(long)]
    pub snapshot: bool,

    /// Where log lines go while the terminal UI owns the screen
    #[arg(long, default_value = "support_dash.log")]
    pub log_file: PathBuf,

    /// HTTP timeout for remote sources
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn source(&self) -> Source {
        Source::parse(&self.source)
    }

    pub fn catalog(&self) -> ProductCatalog {
        ProductCatalog::from_names(&self.products)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Sends `log` output to `path`. `RUST_LOG` overrides the default `info` level.
pub fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| DashError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_default_env();
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    // A logger may already be installed when running under a test harness.
    let _ = builder.try_init();
    Ok(())
}
