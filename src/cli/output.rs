//! Terminal output helpers.

use owo_colors::OwoColorize;

/// Print a success line.
pub fn success(message: &str) {
    println!("{} {message}", "✓".green());
}

/// Print a failure line to stderr.
pub fn failure(message: &str) {
    eprintln!("{} {message}", "✗".red());
}

/// Print an informational line.
pub fn note(message: &str) {
    println!("{} {message}", "·".dimmed());
}
