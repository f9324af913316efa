use std::process;

use clap::Parser;

use depviz::cli::{run, Cli};
use depviz::util::output;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        output::error(&format!("error: {err}"));
        process::exit(1);
    }
}
