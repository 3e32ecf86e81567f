//! Shared CLI helpers — path expansion, reply printing, banner.

use std::path::PathBuf;

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a relayed reply.
pub fn print_reply(reply: &str) {
    println!();
    println!("{}", "AI".cyan().bold());
    if reply.is_empty() {
        println!("{}", "(empty reply)".dimmed());
    } else {
        println!("{reply}");
    }
    println!();
}

pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "kinrelay".cyan().bold(), version.dimmed());
    println!();
}

/// Placeholder shown while a remote call is in flight.
pub fn print_waiting() {
    eprint!("{}", "... waiting for reply".dimmed());
}

pub fn clear_waiting() {
    eprint!("\r{}\r", " ".repeat(40));
}
