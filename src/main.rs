mod cli;
mod config;
mod directory;
mod export;
mod model;
mod notify;
mod operator;
mod persist;
mod presenter;
mod store;
mod tui;

use std::process;

use config::Config;

fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config) {
        eprintln!("{e}");
        process::exit(1);
    }
}
