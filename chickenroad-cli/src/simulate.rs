//! Offline sampling reports comparing observed and exact distributions.
use anyhow::Result;
use chickenroad_core::numbers::{count_to_f64, ratio};
use chickenroad_core::{
    DifficultyTier, PredictionRng, bands_for, draw_prediction, step_rule_for, table_for,
};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct BandRow {
    pub low: f64,
    pub high: f64,
    pub advertised: f64,
    pub exact: f64,
    pub observed: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRow {
    pub steps: u8,
    pub exact: f64,
    pub observed: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierReport {
    pub tier: DifficultyTier,
    pub samples: usize,
    pub seed: u64,
    pub mean_multiplier: f64,
    pub bands: Vec<BandRow>,
    pub steps: Vec<StepRow>,
}

/// Draw `samples` predictions for `tier` and tabulate them.
pub fn run_tier(tier: DifficultyTier, samples: usize, seed: u64) -> TierReport {
    let mut rng = PredictionRng::from_user_seed(seed);
    let table = table_for(tier);
    let rule = step_rule_for(tier);
    let bands = bands_for(tier);

    let mut band_hits = vec![0usize; bands.len()];
    let mut step_hits = vec![0usize; usize::from(rule.max_steps()) + 1];
    let mut multiplier_sum = 0.0;
    for _ in 0..samples {
        let prediction = draw_prediction(tier, &mut rng, 0);
        multiplier_sum += prediction.multiplier;
        if let Some(idx) = bands
            .iter()
            .position(|band| prediction.multiplier >= band.low && prediction.multiplier <= band.high)
        {
            band_hits[idx] += 1;
        }
        if let Some(slot) = step_hits.get_mut(usize::from(prediction.step_count.get())) {
            *slot += 1;
        }
    }

    let bands = bands
        .iter()
        .zip(&band_hits)
        .map(|(band, hits)| BandRow {
            low: band.low,
            high: band.high,
            advertised: band.share,
            exact: table.share_in(band.low, band.high),
            observed: ratio(*hits, samples),
        })
        .collect();
    let steps = (1..=rule.max_steps())
        .map(|steps| StepRow {
            steps,
            exact: rule.probability_of(steps),
            observed: ratio(step_hits[usize::from(steps)], samples),
        })
        .collect();

    TierReport {
        tier,
        samples,
        seed,
        mean_multiplier: if samples == 0 {
            0.0
        } else {
            multiplier_sum / count_to_f64(samples)
        },
        bands,
        steps,
    }
}

pub fn write_console(out: &mut impl Write, reports: &[TierReport]) -> Result<()> {
    writeln!(out, "{}", "📊 Distribution Report".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;
    for report in reports {
        writeln!(
            out,
            "{} - {} samples (seed {}) mean {:.3}x",
            report.tier.label().bold(),
            report.samples,
            report.seed,
            report.mean_multiplier
        )?;
        writeln!(out, "  band              advertised   exact  observed")?;
        for band in &report.bands {
            writeln!(
                out,
                "  {:>6.2}x-{:<6.2}x   {:>8.3}  {:>6.3}  {:>8.3}",
                band.low, band.high, band.advertised, band.exact, band.observed
            )?;
        }
        writeln!(out, "  steps   exact  observed")?;
        for row in &report.steps {
            writeln!(
                out,
                "  {:>5}  {:>6.3}  {:>8.3}",
                row.steps, row.exact, row.observed
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, reports: &[TierReport]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, reports)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_rows_cover_every_band_and_step() {
        let report = run_tier(DifficultyTier::Easy, 2_000, 8);
        assert_eq!(report.bands.len(), 4);
        assert_eq!(report.steps.len(), 6);
        let band_total: f64 = report.bands.iter().map(|band| band.observed).sum();
        let step_total: f64 = report.steps.iter().map(|row| row.observed).sum();
        assert!((band_total - 1.0).abs() < 1e-9);
        assert!((step_total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_report() {
        let a = run_tier(DifficultyTier::Hard, 500, 3);
        let b = run_tier(DifficultyTier::Hard, 500, 3);
        assert!((a.mean_multiplier - b.mean_multiplier).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_samples_is_empty_not_nan() {
        let report = run_tier(DifficultyTier::Medium, 0, 1);
        assert!(report.mean_multiplier.abs() < f64::EPSILON);
        assert!(report.bands.iter().all(|band| band.observed.abs() < f64::EPSILON));
    }

    #[test]
    fn json_report_names_tier() {
        let mut buf = Vec::new();
        write_json(&mut buf, &[run_tier(DifficultyTier::Hardcore, 10, 2)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["tier"], "hardcore");
        assert_eq!(value[0]["samples"], 10);
    }
}
