#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod logging;
mod run;

use clap::Parser;

fn main() {
    let _ = color_eyre::install();
    let cli = cli::Cli::parse();

    let loaded = bridge_config::load_file(&run::config_path());
    logging::init(&loaded.config.logging);
    run::report_config_source(&loaded.source);

    if let Err(e) = run::run(&cli, &loaded.config) {
        tracing::error!(error = %e, "startup failed");
        eprintln!("{}", error_fmt::humanize(&e));
        std::process::exit(1);
    }
}
