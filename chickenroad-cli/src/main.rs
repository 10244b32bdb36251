mod file_storage;
mod render;
mod simulate;

use anyhow::{Context, Result, bail};
use chickenroad_core::{DifficultyTier, GENERIC_PROFIT_TIP, HistoryStore, Predictor, PredictorConfig};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use file_storage::FileStorage;
use render::SessionLabels;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Console,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "chickenroad", version)]
#[command(about = "Simulated crossing predictions for Chicken Road with a persisted history")]
struct Args {
    /// Directory holding the persisted history record
    #[arg(long, global = true, default_value = ".chickenroad")]
    data_dir: PathBuf,

    /// JSON predictor config (delay_ms, storage_key, seed)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed RNG seed, overriding the config
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Calculation delay in milliseconds, overriding the config
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Request one prediction and record it in history
    Predict {
        /// Difficulty tier: easy, medium, hard or hardcore
        #[arg(long, default_value = "medium")]
        tier: DifficultyTier,
        /// Display label for the host app
        #[arg(long)]
        app_name: Option<String>,
        /// Display label for the game session
        #[arg(long)]
        game_id: Option<String>,
        /// Print the history after the result
        #[arg(long)]
        show_history: bool,
    },
    /// Show the persisted prediction history
    History,
    /// Sample a tier offline and compare against the exact distribution
    Simulate {
        /// Tier to sample; all tiers when omitted
        #[arg(long)]
        tier: Option<DifficultyTier>,
        #[arg(long, default_value_t = 10_000)]
        samples: usize,
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        report: ReportFormat,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Describe every tier's tables and step rules
    Tiers,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = resolve_config(&args)?;
    let storage = FileStorage::new(&args.data_dir);
    log::debug!("using data dir {}", storage.root().display());

    match args.command {
        Command::Predict {
            tier,
            app_name,
            game_id,
            show_history,
        } => {
            let labels = SessionLabels { app_name, game_id };
            run_predict(storage, &config, tier, &labels, show_history).await
        }
        Command::History => run_history(storage, &config),
        Command::Simulate {
            tier,
            samples,
            report,
            output,
        } => run_simulate(tier, samples, report, output.as_deref(), config.seed),
        Command::Tiers => run_tiers(),
    }
}

fn resolve_config(args: &Args) -> Result<PredictorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            PredictorConfig::from_json(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PredictorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(delay_ms) = args.delay_ms {
        config = config.with_delay_ms(delay_ms);
    }
    Ok(config)
}

async fn run_predict(
    storage: FileStorage,
    config: &PredictorConfig,
    tier: DifficultyTier,
    labels: &SessionLabels,
    show_history: bool,
) -> Result<()> {
    let mut out = stdout().lock();
    render::write_banner(&mut out, labels)?;
    writeln!(out, "{}", tier.profit_tip().italic())?;

    let predictor = Predictor::new(storage, config);
    let pending = predictor.request(tier)?;
    writeln!(out, "{}", "⏳ Calculating prediction...".yellow())?;
    out.flush()?;

    let completed = tokio::select! {
        result = pending.wait() => result?,
        _ = tokio::signal::ctrl_c() => {
            predictor.cancel();
            bail!("prediction cancelled");
        }
    };
    if let Some(warning) = &completed.persist_warning {
        eprintln!("⚠️  History not saved: {warning}");
    }
    render::write_prediction(&mut out, &completed.prediction)?;

    if show_history {
        writeln!(out)?;
        render::write_history(&mut out, &predictor.history())?;
    }
    Ok(())
}

fn run_history(storage: FileStorage, config: &PredictorConfig) -> Result<()> {
    let store = HistoryStore::open_with_key(storage, config.storage_key.clone());
    let mut out = stdout().lock();
    render::write_history(&mut out, store.log())?;
    Ok(())
}

fn run_simulate(
    tier: Option<DifficultyTier>,
    samples: usize,
    format: ReportFormat,
    output: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    let tiers: Vec<DifficultyTier> = tier.map_or_else(|| DifficultyTier::ALL.to_vec(), |t| vec![t]);
    let reports: Vec<_> = tiers
        .into_iter()
        .map(|tier| simulate::run_tier(tier, samples, seed))
        .collect();

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(stdout().lock()),
    };
    match format {
        ReportFormat::Console => simulate::write_console(&mut writer, &reports)?,
        ReportFormat::Json => simulate::write_json(&mut writer, &reports)?,
    }
    writer.flush()?;
    Ok(())
}

fn run_tiers() -> Result<()> {
    let mut out = stdout().lock();
    writeln!(out, "{}", GENERIC_PROFIT_TIP.italic())?;
    for tier in DifficultyTier::ALL {
        writeln!(out)?;
        render::write_tier_summary(&mut out, tier)?;
    }
    Ok(())
}
