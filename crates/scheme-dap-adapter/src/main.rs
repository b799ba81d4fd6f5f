//! Debug adapter binary: speaks DAP on stdio and drives the Scheme compiler
//! in `--debug-json` mode.

use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use scheme_dap_adapter::{SystemConfigLoader, serve};

fn main() -> ExitCode {
    let input = BufReader::new(io::stdin());
    match serve(&SystemConfigLoader, input, io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut stderr = io::stderr().lock();
            if writeln!(stderr, "scheme-dap: {error}").is_err() {
                return ExitCode::from(2);
            }
            ExitCode::FAILURE
        }
    }
}
