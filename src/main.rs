use std::process;

use clap::Parser;
use log::error;

use support_dash::config::{self, Config};
use support_dash::csv_reader;
use support_dash::error::Result;
use support_dash::filter::Selection;
use support_dash::report::Dashboard;
use support_dash::terminal;

fn main() {
    let config = Config::parse();
    if let Err(e) = config::init_logging(&config.log_file) {
        eprintln!("warning: logging disabled: {}", e);
    }

    if let Err(e) = run(&config) {
        error!("{}", e);
        eprintln!("support_dash: {}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    let dataset = csv_reader::read_data(&config.source(), &config.catalog(), config.timeout())?;
    if config.snapshot {
        let dashboard = Dashboard::compute(&dataset, &Selection::all(&dataset));
        println!("{}", dashboard.to_json()?);
        return Ok(());
    }
    terminal::run(dataset)
}
