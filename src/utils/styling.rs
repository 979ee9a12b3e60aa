//! Terminal styling utilities for command output

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SEED: Emoji<'_, '_> = Emoji("🌱 ", "");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("casaml").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Pricing, churn and user segmentation models").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print the training configuration card
pub fn print_train_config(model_dir: &Path, samples: usize, seed: u64, models: &[String]) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Models:  {:<38}│",
        CHART,
        truncate_string(&models.join(", "), 37)
    );
    println!(
        "    │  {} Output:  {:<38}│",
        FOLDER,
        truncate_path(model_dir, 37)
    );
    println!(
        "    │  {} Samples: {:<38}│",
        SEED,
        style(format!("{} (seed {})", samples, seed)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{}", warning_line(message));
}

/// Styled warning line, for callers that write to stderr
pub fn warning_line(message: &str) -> String {
    format!("    {} {}", WARN, style(message).yellow())
}

/// Print a named metric value
pub fn print_metric(name: &str, value: f64) {
    println!("{}", metric_line(name, value));
}

/// Styled `name: value` metric line
pub fn metric_line(name: &str, value: f64) -> String {
    format!(
        "      {} {}",
        style(format!("{}:", name)).dim(),
        style(format!("{:.4}", value)).yellow().bold()
    )
}

/// Print elapsed time for a step
pub fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "      {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Training complete!").green().bold()
    );
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - max_len + 3).collect();
        format!("...{}", tail)
    }
}
