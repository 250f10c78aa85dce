//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::error::Error;

fn main() {
    if let Err(err) = geosense_cli::run() {
        eprintln!("geosense: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
