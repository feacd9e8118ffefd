//! CLI output formatting utilities.

use crate::pipeline::RunSummary;
use console::style;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one model per line under a label.
    pub fn models(label: &str, models: &[String]) {
        println!("  {}:", style(label).dim());
        for model in models {
            println!("    {} {}", style("*").cyan(), model);
        }
    }

    /// Print the end-of-run counts.
    pub fn run_summary(summary: &RunSummary) {
        Self::header("Done");
        if summary.failed > 0 {
            Self::warning(&summary_line(summary));
        } else {
            Self::success(&summary_line(summary));
        }
        if summary.translated > 0 {
            Self::kv("Translated columns", &summary.translated.to_string());
        }
        if summary.captions_corrected > 0 {
            Self::kv("Caption suggestions", &summary.captions_corrected.to_string());
        }
        Self::kv("Rows in table", &summary.rows.to_string());
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// One-line account of what happened to the requested videos.
fn summary_line(summary: &RunSummary) -> String {
    let mut parts = vec![format!(
        "{} of {} processed",
        summary.processed,
        plural(summary.requested, "video")
    )];
    if summary.skipped > 0 {
        parts.push(format!("{} already complete", summary.skipped));
    }
    if summary.failed > 0 {
        parts.push(format!("{} failed (re-run to retry)", summary.failed));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line() {
        let summary = RunSummary {
            requested: 3,
            processed: 1,
            skipped: 1,
            failed: 1,
            ..RunSummary::default()
        };
        assert_eq!(
            summary_line(&summary),
            "1 of 3 videos processed, 1 already complete, 1 failed (re-run to retry)"
        );

        let single = RunSummary {
            requested: 1,
            processed: 1,
            ..RunSummary::default()
        };
        assert_eq!(summary_line(&single), "1 of 1 video processed");
    }
}
