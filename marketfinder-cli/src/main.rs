//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = marketfinder_cli::run() {
        eprintln!("marketfinder: {err}");
        std::process::exit(1);
    }
}
