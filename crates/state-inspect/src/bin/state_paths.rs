//! `state-paths` — list the canonical path of every node in a document.
//!
//! Usage:
//!   state-paths < state.json
//!
//! The document is read from stdin.

use state_inspect::cli::list_paths;
use std::io::{self, Read, Write};

fn main() {
    env_logger::init();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match list_paths(buf.trim()) {
        Ok(result) => {
            let mut out = io::stdout();
            if let Err(e) = writeln!(out, "{result}") {
                log::debug!("stdout closed: {e}");
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
