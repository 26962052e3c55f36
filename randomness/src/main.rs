mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use hashtraits::{BitAnalyzer, HexSource, ProgressOptions, ProgressReporter, Report, SystemClock, TerminalLine};
use std::io::{self, IsTerminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // NOTE: the progress line is already finalized by the time we get here
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.to_config();
    tracing::info!(?config, "run configuration");

    let stderr = io::stderr();
    let opts = ProgressOptions {
        enabled: config.progress.enabled(stderr.is_terminal()),
        interval: config.progress_interval,
        pct_dec: config.pct_dec,
    };

    let mut progress = ProgressReporter::new(TerminalLine::new(stderr), SystemClock, opts);
    let mut source = HexSource::new(&config);

    let tally = hashtraits::driver::run(&config, &mut source, &BitAnalyzer, &mut progress)
        .context("sampling failed")?;

    Report::new(&config, &tally)
        .write_to(&mut io::stdout().lock())
        .context("failed to write report")?;

    Ok(())
}
