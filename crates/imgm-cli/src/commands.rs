use std::io::Write;

use anyhow::Context;
use colored::Colorize;

use imgm_merge::{MergeConfig, MergeDriver, MergeReport, NoProgress, ProgressObserver};

use crate::cli::*;
use crate::prepare::{prepare, PreparedRun};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => MergeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MergeConfig::default(),
    };
    config.validate().context("invalid merge configuration")?;

    let PreparedRun {
        session,
        output_path,
        log_path,
    } = prepare(&cli.output, &cli.inputs, cli.log.as_deref()).context("cannot start merge")?;

    let mut driver = MergeDriver::new(session, config)?;
    let result = if cli.quiet {
        driver.run(&mut NoProgress)
    } else {
        driver.run(&mut ConsoleProgress::default())
    };
    let report =
        result.with_context(|| format!("merge into {} aborted", output_path.display()))?;

    match cli.format {
        OutputFormat::Text => print_summary(&report, &output_path, &log_path),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Single refreshed status line on stderr.
#[derive(Default)]
struct ConsoleProgress {
    drawn: bool,
}

impl ConsoleProgress {
    fn draw(&mut self, done: u64, total: u64) {
        let pct = if total == 0 {
            100.0
        } else {
            done as f64 * 100.0 / total as f64
        };
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{done:>8} / {total}  {pct:.1}%");
        let _ = err.flush();
        self.drawn = true;
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&mut self, done: u64, total: u64) {
        self.draw(done, total);
    }

    fn on_finish(&mut self, total: u64) {
        if self.drawn {
            self.draw(total, total);
            eprintln!();
        }
    }
}

fn print_summary(report: &MergeReport, output: &std::path::Path, log: &std::path::Path) {
    println!("{} Succeeded!", "✓".green().bold());
    println!("  Output: {}", output.display().to_string().bold());
    println!("  Log: {}", log.display());
    println!(
        "  Sectors: {} ({} selected, {} unresolved)",
        report.total_sectors.to_string().bold(),
        report.selected.to_string().green(),
        if report.unresolved == 0 {
            report.unresolved.to_string().normal()
        } else {
            report.unresolved.to_string().red()
        },
    );
    for (code, count) in &report.anomalies {
        let label = if code.is_unresolved() {
            code.to_string().red()
        } else {
            code.to_string().yellow()
        };
        println!("  {label}: {count}");
    }
    if report.unresolved > 0 {
        println!(
            "{} {} sectors filled with 0xDE 0xAD; review the log",
            "!".yellow().bold(),
            report.unresolved
        );
    }
}
