//! spinestat CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use sp_core::SampleRole;
use sp_eval::{efficiency_by_cut, format_ratio, selection_efficiency, PurityEstimator};
use sp_viz::{Artist, ConfusionArtist, EfficiencyArtist};
use std::path::PathBuf;

mod config;
mod samples;

use config::read_config;
use samples::load_samples;

#[derive(Parser)]
#[command(name = "spinestat")]
#[command(about = "spinestat - selection efficiency, purity and confusion statistics")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Row-normalised confusion matrix artifact (plot-friendly JSON)
    Confusion {
        /// Analysis config (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Sample role to accumulate (signal, simulation, on_source, off_source)
        #[arg(long, default_value = "simulation", value_parser = parse_role)]
        role: SampleRole,

        /// Keep the null (missing prediction) column.
        #[arg(long)]
        show_null_column: bool,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Efficiency vs a variable on the signal sample (plot-friendly JSON)
    Efficiency {
        /// Analysis config (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Variable name (a key of `variables` in the config)
        #[arg(long)]
        variable: String,

        /// Override the number of uniform efficiency bins.
        #[arg(long)]
        nbins: Option<usize>,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Efficiency and purity after each sequential cut
    Cutflow {
        /// Analysis config (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Overall selection efficiency and purity
    Summary {
        /// Analysis config (YAML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print version information
    Version,
}

fn parse_role(s: &str) -> std::result::Result<SampleRole, String> {
    SampleRole::ALL.iter().copied().find(|r| r.as_str() == s).ok_or_else(|| {
        let names: Vec<&str> = SampleRole::ALL.iter().map(|r| r.as_str()).collect();
        format!("unknown sample role '{}' (expected one of {:?})", s, names)
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Confusion { config, role, show_null_column, output } => {
            cmd_confusion(&config, role, show_null_column, output.as_ref())
        }
        Commands::Efficiency { config, variable, nbins, output } => {
            cmd_efficiency(&config, &variable, nbins, output.as_ref())
        }
        Commands::Cutflow { config } => cmd_cutflow(&config),
        Commands::Summary { config } => cmd_summary(&config),
        Commands::Version => {
            println!("spinestat {}", sp_core::VERSION);
            Ok(())
        }
    }
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
        tracing::info!(path = %path.display(), "artifact written");
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

fn cmd_confusion(
    config: &PathBuf,
    role: SampleRole,
    show_null_column: bool,
    output: Option<&PathBuf>,
) -> Result<()> {
    let cfg = read_config(config)?;
    let samples = load_samples(&cfg, &[role])?;

    let mut artist = ConfusionArtist::new(cfg.registry()?, cfg.confusion.title.clone())
        .with_null_column(show_null_column);
    if let (Some(x), Some(y)) = (&cfg.confusion.xlabel, &cfg.confusion.ylabel) {
        artist = artist.with_labels(x.clone(), y.clone());
    }
    artist.add_sample(samples.get(role)?)?;

    let totals = artist.accumulator().totals();
    tracing::info!(
        accepted = totals.accepted,
        discarded = totals.discarded(),
        null_predictions = totals.remapped_to_null,
        "confusion matrix accumulated"
    );
    write_json(output, serde_json::to_value(artist.draw()?)?)
}

fn cmd_efficiency(
    config: &PathBuf,
    variable: &str,
    nbins: Option<usize>,
    output: Option<&PathBuf>,
) -> Result<()> {
    if nbins == Some(0) {
        anyhow::bail!("nbins must be > 0");
    }
    let cfg = read_config(config)?;
    let estimator = cfg.estimator(variable, nbins)?;
    let samples = load_samples(&cfg, &[SampleRole::Signal])?;

    let mut artist = EfficiencyArtist::new(estimator, None);
    if let Some(xlabel) = cfg.variable(variable)?.xlabel.clone() {
        artist = artist.with_xlabel(xlabel);
    }
    artist.add_sample(samples.get(SampleRole::Signal)?)?;

    write_json(output, serde_json::to_value(artist.draw()?)?)
}

fn cmd_cutflow(config: &PathBuf) -> Result<()> {
    let cfg = read_config(config)?;
    let cuts = cfg.cut_flow()?;
    let samples = load_samples(&cfg, &SampleRole::ALL)?;

    let signal = samples.get(SampleRole::Signal)?;
    for line in efficiency_by_cut(&signal.events, &cuts).summary_lines() {
        println!("{}", line);
    }

    let purity = PurityEstimator::from_samples(&samples, cfg.foreground.clone())?;
    for line in purity.by_cut(&cuts).summary_lines() {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_summary(config: &PathBuf) -> Result<()> {
    let cfg = read_config(config)?;
    let samples = load_samples(&cfg, &SampleRole::ALL)?;

    let eff = selection_efficiency(&samples.get(SampleRole::Signal)?.events, &cfg.selection);
    let purity = PurityEstimator::from_samples(&samples, cfg.foreground.clone())?;
    let pur = purity.compute_with(&cfg.selection);
    tracing::info!(
        selected = eff.selected,
        total = eff.total,
        matched = pur.matched,
        scaled_total = pur.total,
        "summary computed"
    );

    println!("Efficiency: {}", format_ratio(eff.value, 4));
    println!("Purity: {}", format_ratio(pur.purity, 4));
    Ok(())
}
