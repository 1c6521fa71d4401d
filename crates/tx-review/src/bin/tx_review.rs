//! `tx-review`: validate a canonical JSON transaction and print its pages.
//!
//! Usage:
//!   tx-review [OPTIONS] [FILE]
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::io::{self, Read, Write};

use tracing_subscriber::EnvFilter;
use tx_review::cli::{parse_args, resolve_config, review, strip_line_ending, USAGE};
use tx_review::ReviewError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => {}
        Err(ReviewError::Usage(msg)) => {
            eprintln!("{msg}\n\n{USAGE}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<(), ReviewError> {
    let options = parse_args(std::env::args().skip(1))?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }
    let config = resolve_config(&options)?;

    let bytes = match &options.input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let out = review(strip_line_ending(bytes), &config, options.json)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
