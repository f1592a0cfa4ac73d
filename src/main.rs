//! Trenza CLI — braided polyglot scripts with typed shell output.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "trenza",
    version,
    about = "Polyglot script runner — typed command output, braided shell blocks, cluster fan-out"
)]
struct Cli {
    #[command(subcommand)]
    command: trenza::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = trenza::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
