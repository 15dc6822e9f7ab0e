use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Run one diagnostic step: print its label, then ✓ or ✗ with the outcome.
/// The error is handed back so the command exits non-zero on the first hard
/// failure.
pub fn step<T>(label: &str, action: impl FnOnce() -> Result<T>) -> Result<T> {
    print!("{label} ");
    let _ = io::stdout().flush();
    match action() {
        Ok(value) => {
            println!("{}", "✓".green());
            Ok(value)
        }
        Err(error) => {
            println!("{}", "✗".red());
            Err(error)
        }
    }
}
