use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use popsens::{PopulationTable, Ranges, RunConfig, RunReport, init_logging, run, write_reports};
use popsens_core::ProjectionOptions;

#[derive(Parser, Debug)]
#[command(name = "popsens")]
#[command(about = "Sobol sensitivity analysis of cohort-component population projections")]
struct Args {
    /// Run configuration (YAML); command-line options override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Population table (CSV) with at least two census years per country
    #[arg(short, long)]
    population: Option<PathBuf>,

    /// Parameter ranges table (CSV)
    #[arg(short, long, conflicts_with = "history")]
    ranges: Option<PathBuf>,

    /// Annual population history (CSV) to derive parameter ranges from
    #[arg(long)]
    history: Option<PathBuf>,

    /// Directory for report.json, sensitivity.csv and trajectory.csv
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only analyse these countries (repeatable)
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Base sample count is 2^N
    #[arg(short = 'n', long)]
    sample_exponent: Option<u32>,

    /// Seed for bootstrap confidence intervals
    #[arg(long)]
    seed: Option<u64>,

    /// Record the baseline projection of each country
    #[arg(long)]
    trajectory: bool,

    /// Use the legacy accounting and whole-person rounding of the reference figures
    #[arg(long)]
    legacy: bool,

    /// Also write popsens.log into the output directory
    #[arg(long)]
    log_file: bool,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(path) = &self.population {
            config.population = Some(path.clone());
        }
        if let Some(path) = &self.ranges {
            config.ranges = Some(path.clone());
            config.history = None;
        }
        if let Some(path) = &self.history {
            config.history = Some(path.clone());
            config.ranges = None;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if !self.countries.is_empty() {
            config.countries = self.countries.clone();
        }
        if let Some(exponent) = self.sample_exponent {
            config.sensitivity.sample_exponent = exponent;
        }
        if let Some(seed) = self.seed {
            config.sensitivity.seed = seed;
        }
        if self.trajectory {
            config.sensitivity.record_trajectory = true;
        }
        if self.legacy {
            config.sensitivity.projection = ProjectionOptions::legacy();
        }
        if self.log_file {
            config.log_to_file = true;
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    args.apply(&mut config);

    let log_dir = config.log_to_file.then_some(config.output_dir.as_path());
    let _guard = init_logging(&args.log_level, log_dir)?;

    let population = PopulationTable::from_path(config.population_path()?)
        .wrap_err("Failed to load population table")?;
    let ranges = Ranges::load(&config.range_source()?).wrap_err("Failed to load ranges")?;
    tracing::info!(
        countries = population.countries().count(),
        base_samples = config.sensitivity.base_samples(),
        "inputs loaded"
    );

    let outcome = run(&population, &ranges, &config);
    let report = RunReport::new(config.sensitivity.clone(), outcome);
    for path in write_reports(&config.output_dir, &report)? {
        tracing::info!(path = %path.display(), "wrote");
    }

    if report.countries.is_empty() && !report.failures.is_empty() {
        return Err(eyre!("all {} countries failed", report.failures.len()));
    }
    Ok(())
}
