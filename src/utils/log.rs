// src/utils/log.rs

//! Run banners on top of the `log` facade.
//!
//! Keeps the pipeline's console output consistent: a header per run, a
//! numbered step per search task, and an aligned summary block.

/// Width of separator lines.
const RULE_WIDTH: usize = 60;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    log::info!("{border}");
    log::info!("  {title}");
    log::info!("{border}");
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("{}", format_step(step_num, total, message));
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {message}");
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {title}");
    for line in format_summary(items) {
        log::info!("{line}");
    }
}

fn format_step(step_num: usize, total: usize, message: &str) -> String {
    let width = total.to_string().len();
    format!("[{step_num:>width$}/{total}] {message}")
}

fn format_summary(items: &[(&str, String)]) -> Vec<String> {
    let key_width = items.iter().map(|(k, _)| k.len() + 1).max().unwrap_or(0);
    items
        .iter()
        .map(|(key, value)| format!("    {:<key_width$}  {value}", format!("{key}:")))
        .collect()
}
