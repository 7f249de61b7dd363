mod analysis;
mod cli;
mod config;
mod error;
mod grid;
mod logging;
mod parquet;
mod reading;
mod render;

use std::process;

use clap::Parser;
use cli::{command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match command::run(&cli.command).await {
        Ok(message) => println!("{}", message),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
