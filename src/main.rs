//! camlpad CLI entry point

use std::process::ExitCode;

fn main() -> ExitCode {
    match camlpad::cli::run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}
