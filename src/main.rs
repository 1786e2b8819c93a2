use anyhow::{Context, Error};
use clap::Parser;
use log::LevelFilter;
use std::{io, path::PathBuf};
use symcalc::{logging, Options, Session};

/// A calculator with exact arithmetic which can also solve equations in x.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Where to write the log file.
    #[arg(long, env = "SYMCALC_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,
    /// The most detailed level written to the log file.
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
    /// Show decimal approximations next to exact results.
    #[arg(long)]
    numeric: bool,
    /// Evaluate this expression (or solve this equation) and exit.
    expression: Vec<String>,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let log_file = logging::init(&args.log_dir, args.log_level)
        .context("Unable to initialize logging")?;

    if !args.expression.is_empty() {
        return one_shot(&args.expression.join(" "), args.numeric);
    }

    let options = Options {
        log_file,
        numeric: args.numeric,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(stdin.lock(), stdout.lock(), options);
    session.run().context("The session failed")?;

    Ok(())
}

fn one_shot(line: &str, numeric: bool) -> Result<(), Error> {
    let line = line.trim().to_lowercase();
    log::info!("Input received: {}", line);

    let result = symcalc::process(&line, numeric)?;
    println!("Result: {}", result);

    Ok(())
}
