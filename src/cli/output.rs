//! Terminal output for rendered containers and diagnostics
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically. Rendered data
//! goes to stdout uncoloured so it can be piped.

use std::fmt::Display;

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print labelled value (green label)
pub fn action(label: &str, msg: &(impl Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print one iteration item; multi-line items are indented under the counter.
pub fn item(position: usize, msg: &(impl Display + ?Sized)) {
    let text = msg.to_string();
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    println!("{} {}", format!("{position:>3}:").dimmed(), first);
    for line in lines {
        println!("     {line}");
    }
}

/// Print rendered data (no color)
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}
