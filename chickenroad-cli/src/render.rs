//! Console rendering for predictions, history and tier summaries.
use chickenroad_core::numbers::percent;
use chickenroad_core::{
    DifficultyTier, HistoryEntry, HistoryLog, Prediction, bands_for, step_rule_for, table_for,
};
use chrono::{Local, TimeZone};
use colored::Colorize;
use std::io::{self, Write};

/// Opaque caller labels shown above a result.
#[derive(Debug, Clone, Default)]
pub struct SessionLabels {
    pub app_name: Option<String>,
    pub game_id: Option<String>,
}

impl SessionLabels {
    fn is_empty(&self) -> bool {
        self.app_name.is_none() && self.game_id.is_none()
    }
}

pub fn format_timestamp(timestamp: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp)
        .single()
        .map_or_else(|| timestamp.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

pub fn write_banner(out: &mut impl Write, labels: &SessionLabels) -> io::Result<()> {
    writeln!(out, "{}", "🐔 Chicken Road Predictor".bright_cyan().bold())?;
    writeln!(out, "{}", "=========================".cyan())?;
    if labels.is_empty() {
        return Ok(());
    }
    if let Some(app_name) = &labels.app_name {
        writeln!(out, "{}", app_name.bold())?;
    }
    if let Some(game_id) = &labels.game_id {
        writeln!(out, "Game ID: {game_id}")?;
    }
    Ok(())
}

pub fn write_prediction(out: &mut impl Write, prediction: &Prediction) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        "Cross at step:".bold(),
        prediction.step_count.to_string().bright_green()
    )?;
    writeln!(
        out,
        "{} {}",
        "Multiplier:".bold(),
        format!("{:.2}x", prediction.multiplier).bright_yellow()
    )?;
    writeln!(out, "Difficulty: {}", prediction.tier.label())
}

fn write_entry(out: &mut impl Write, entry: &HistoryEntry) -> io::Result<()> {
    writeln!(
        out,
        "  {:<9} {:>7}  {}",
        entry.difficulty.label(),
        format!("{:.2}x", entry.multiplier),
        format_timestamp(entry.timestamp).dimmed()
    )
}

pub fn write_history(out: &mut impl Write, log: &HistoryLog) -> io::Result<()> {
    writeln!(out, "{}", "📜 Prediction History".bright_blue().bold())?;
    if log.is_empty() {
        return writeln!(out, "No prediction history yet");
    }
    for entry in log {
        write_entry(out, entry)?;
    }
    Ok(())
}

pub fn write_tier_summary(out: &mut impl Write, tier: DifficultyTier) -> io::Result<()> {
    let table = table_for(tier);
    let rule = step_rule_for(tier);
    writeln!(
        out,
        "{} ({})",
        tier.label().bold(),
        tier.as_str().dimmed()
    )?;
    writeln!(
        out,
        "  multipliers {:.2}x-{:.2}x over {} weighted entries",
        table.min_value(),
        table.max_value(),
        table.total_weight()
    )?;
    for band in bands_for(tier) {
        writeln!(
            out,
            "    {:>3}%  {:.2}x-{:.2}x",
            percent(band.share),
            band.low,
            band.high
        )?;
    }
    let steps: Vec<String> = (1..=rule.max_steps())
        .map(|steps| format!("{steps}:{}%", percent(rule.probability_of(steps))))
        .collect();
    writeln!(out, "  steps {}", steps.join(" "))?;
    writeln!(out, "  {}", tier.profit_tip().italic())
}
