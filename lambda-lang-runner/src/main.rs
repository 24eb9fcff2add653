mod repl;
mod runner;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Script to execute; starts a REPL when omitted
    path: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match cli.path {
        None => repl::start().unwrap(),
        Some(path) => {
            let source = std::fs::read_to_string(&path).unwrap_or_else(|err| {
                eprintln!("Failed to read {}: {}", path.display(), err);
                std::process::exit(1);
            });
            if let Err(err) = runner::execute(&source) {
                eprintln!("{}", err);
                std::process::exit(1);
            }
        }
    }
}
