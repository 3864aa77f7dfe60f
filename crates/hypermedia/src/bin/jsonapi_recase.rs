//! `jsonapi-recase` — rewrite attribute and relationship names of a JSON:API
//! document (stdin) to another naming strategy (stdout).
//!
//! Usage:
//!   jsonapi-recase <none|camel|dash|snake>
//!
//! Set `RUST_LOG=hypermedia=debug` to trace dropped members.

use hypermedia::cli::recase;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(naming) = args.get(1) else {
        eprintln!("Usage: jsonapi-recase <none|camel|dash|snake>");
        std::process::exit(1);
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match recase(buf.trim(), naming) {
        Ok(out) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{out}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
