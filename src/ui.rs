use std::time::Duration;

use colored::Colorize;
use rollkit::{Reporter, Service};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

// ============================================================================
// Remote Output
// ============================================================================

/// Banner printed above the output of a remote command
pub fn output_banner(title: &str, host: &str) -> String {
    format!("================= {title} at {host} =================")
}

/// Host-tagged line relayed while a remote command is still running
pub fn progress_line(host: &str, line: &str) -> String {
    format!("{host}: {line}")
}

pub fn pacing_line(delay: Duration, next: &str) -> String {
    format!("Sleeping {} seconds before going to {next}...", delay.as_secs())
}

/// Console rendering of orchestration events
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn on_output(&self, title: &str, host: &str, lines: &[String]) {
        println!("{}", output_banner(title, host).bold());
        for line in lines {
            println!("{line}");
        }
    }

    fn on_stopped(&self, service: Service, host: &str) {
        success(&format!("Stopped {service} at: {host}"));
    }

    fn on_progress(&self, host: &str, line: &str) {
        println!("{}", progress_line(host, line));
    }

    fn on_step(&self, message: &str) {
        info(message);
    }

    fn on_undone(&self, description: &str) {
        warn(&format!("Undone: {description}"));
    }

    fn on_task(&self, description: &str) {
        section(description);
    }

    fn on_pacing(&self, delay: Duration, next: &str) {
        dim(&pacing_line(delay, next));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_banner() {
        assert_eq!(
            output_banner("Perform master start", "10.0.0.1"),
            "================= Perform master start at 10.0.0.1 ================="
        );
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line("10.0.0.2", "+ post_install.sh"),
            "10.0.0.2: + post_install.sh"
        );
    }

    #[test]
    fn test_pacing_line() {
        assert_eq!(
            pacing_line(Duration::from_secs(45), "Restart tserver at 10.0.0.3"),
            "Sleeping 45 seconds before going to Restart tserver at 10.0.0.3..."
        );
    }
}
