//! Terminal output.
//!
//! Every line `ph` prints carries the `:ph:` prefix. While chains run, a
//! progress bar counts finished steps and each launched command is echoed
//! above it. After the final drain a table summarizes every chain.

use crate::project::ProjectMeta;
use crate::scheduler::{ChainReport, Observer, StepOutcome, Summary};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::cmp;

fn prefix() -> ColoredString {
    ":ph:".cyan().bold()
}

pub fn log(msg: &str) {
    if msg.is_empty() {
        println!("{}", prefix());
    } else {
        println!("{} {}", prefix(), msg);
    }
}

pub fn error(msg: &str) {
    eprintln!("{} {} {}", prefix(), "x".red(), msg);
}

pub fn banner() {
    log("Project Helper, a Cython project build system");
    log(&format!("Version {}", env!("CARGO_PKG_VERSION")));
    log("");
}

pub fn usage(program: &str) {
    log(&format!(
        "Usage: {} [{}] [--option:value]",
        program,
        crate::project::DEFAULT_FILENAME
    ));
}

pub fn project_info(meta: &ProjectMeta) {
    if let Some(name) = &meta.name {
        match &meta.version {
            Some(version) => log(&format!("{} version {}", name.bold(), version)),
            None => log(&name.bold().to_string()),
        }
    }
    if let Some(link) = &meta.link {
        log(link);
    }
    if let Some(description) = &meta.description {
        for line in description.lines() {
            log(line);
        }
        log("");
    }
}

pub fn list_options(meta: &ProjectMeta) {
    if meta.options.is_empty() {
        log("This project declares no options.");
    }
    for (option, description) in &meta.options {
        log(&format!(
            "{} {}",
            format!("[--{}:value]", option).green(),
            description
        ));
    }
    log("");
}

/// Console observer: echoes commands and tracks progress.
#[derive(Default)]
pub struct ConsoleObserver {
    bar: Option<ProgressBar>,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl Observer for ConsoleObserver {
    fn started(&mut self, pending_steps: usize) {
        if pending_steps == 0 {
            return;
        }
        let bar = ProgressBar::new(pending_steps as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} steps")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        self.bar = Some(bar);
    }

    fn launched(&mut self, _chain: usize, _step: usize, command: &str) {
        self.print(format!("{} {}", prefix(), command));
    }

    fn finished(&mut self, chain: usize, step: usize, outcome: &StepOutcome) {
        if outcome.is_failure() {
            self.print(format!(
                "{} {} chain {} step {}: {}",
                prefix(),
                "!".yellow(),
                chain + 1,
                step + 1,
                outcome
            ));
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn completed(&mut self, summary: &Summary) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        if summary.steps_run > 0 {
            log(&format!(
                "Ran {} step(s) across {} chain(s) in {:.2?}",
                summary.steps_run, summary.chains, summary.elapsed
            ));
        }
    }
}

/// Table with box-drawing borders, columns shrunk to the terminal width.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    fn widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = cmp::max(widths[i], console::measure_text_width(cell));
            }
        }

        // Shrink the widest column until everything fits
        let overhead = 3 + 3 * self.headers.len();
        while overhead + widths.iter().sum::<usize>() > max_width {
            let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= 8 {
                break;
            }
            widths[idx] -= 1;
        }
        widths
    }

    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.widths(max_width);

        let border = |left: &str, mid: &str, right: &str| -> String {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, cells.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| -> String {
            let mut s = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let text = console::truncate_str(cell, *width, "...");
                let pad = width.saturating_sub(console::measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text.to_string() };
                s.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            s
        };

        let mut out = vec![border("┌", "┬", "┐"), line(&self.headers, true)];
        out.push(border("├", "┼", "┤"));
        out.extend(self.rows.iter().map(|row| line(row, false)));
        out.push(border("└", "┴", "┘"));
        out
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        for line in self.render(term_width as usize) {
            println!("{}", line);
        }
    }
}

fn chain_status(report: &ChainReport) -> String {
    let failed = report.failed_steps();
    let skipped = report
        .outcomes
        .iter()
        .filter(|o| matches!(o, StepOutcome::Skipped))
        .count();

    if failed == 0 {
        "ok".green().to_string()
    } else if skipped > 0 {
        format!("{} failed, {} skipped", failed, skipped)
            .red()
            .to_string()
    } else {
        format!("{} failed", failed).red().to_string()
    }
}

/// Print one row per chain: progress, status and its first command.
pub fn print_summary(reports: &[ChainReport]) {
    if reports.is_empty() {
        return;
    }
    let mut table = Table::new(&["#", "Steps", "Status", "First command"]);
    for (i, report) in reports.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format!("{}/{}", report.completed_steps(), report.commands.len()),
            chain_status(report),
            report.commands.first().cloned().unwrap_or_default(),
        ]);
    }
    table.print();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_render_fits_content() {
        colored::control::set_override(false);
        let mut table = Table::new(&["#", "Status"]);
        table.add_row(vec!["1".into(), "ok".into()]);
        table.add_row(vec!["too".into(), "many".into(), "cells".into()]);

        let lines = table.render(80);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "  ┌───┬────────┐");
        assert_eq!(lines[3], "  │ 1 │ ok     │");
    }

    #[test]
    fn test_table_shrinks_to_width() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Command"]);
        table.add_row(vec!["x".repeat(100)]);

        let lines = table.render(40);
        assert!(lines.iter().all(|l| console::measure_text_width(l) <= 40));
        assert!(lines[3].contains("..."));
    }

    #[test]
    fn test_chain_status() {
        colored::control::set_override(false);
        let report = ChainReport {
            commands: vec!["false".into(), "true".into()],
            outcomes: vec![StepOutcome::Exited { code: 1 }, StepOutcome::Skipped],
        };
        assert_eq!(chain_status(&report), "1 failed, 1 skipped");
    }
}
