//! `loose-parse` — read text the way the inline state editor does.
//!
//! Usage:
//!   loose-parse '<text>'
//!
//! Prints the parsed value as JSON, or `undefined`.

use state_inspect::cli::parse_text;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let text = match args.get(1) {
        Some(t) => t.clone(),
        None => {
            eprintln!("First argument must be the text to parse.");
            std::process::exit(1);
        }
    };

    match parse_text(&text) {
        Ok(result) => println!("{result}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
