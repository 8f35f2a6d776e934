//! dupsort command-line entry point.

use clap::Parser;
use dupsort::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    let code = match dupsort::run_app(cli) {
        Ok(code) => code,
        Err(err) => {
            let code = ExitCode::for_error(&err);
            let structured = json_errors
                .then(|| serde_json::to_string_pretty(&StructuredError::new(&err, code)).ok())
                .flatten();
            match structured {
                Some(json) => eprintln!("{}", json),
                None => eprintln!("[{}] Error: {:#}", code.code_prefix(), err),
            }
            code
        }
    };

    std::process::exit(code.as_i32());
}
