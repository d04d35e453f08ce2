#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

use clap::{CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use prognos::config::PredictorConfig;
use prognos::pipeline::{PredictionReport, Predictor};
use prognos::record::load_roster;
use prognos::synth::{reference_members, synthetic_members};

/// Display precision for the result table.
const DISPLAY_DECIMALS: i32 = 3;

#[derive(Parser)]
#[command(
    name = "prognos",
    about = "Relevance-weighted outcome prediction for health-plan cohorts"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict outcomes for a member roster (a JSON array of member objects)
    Predict {
        /// Path to the roster JSON file
        roster: PathBuf,

        /// Optional TOML file overriding the numerical defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip fit scoring; result rows are flagged unscored
        #[arg(long)]
        no_fit: bool,

        /// Perturb the feature matrix slightly to break exact ties
        #[arg(long)]
        jitter: bool,

        /// RNG seed for the jitter
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Also write the result table to this path as TSV
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Predict over the five reference members plus a generated cohort
    Simulate {
        /// Number of synthetic members to generate besides the reference ones
        #[arg(long, default_value = "50")]
        count: usize,

        /// RNG seed for cohort generation (and the jitter, if enabled)
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Optional TOML file overriding the numerical defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip fit scoring; result rows are flagged unscored
        #[arg(long)]
        no_fit: bool,

        /// Perturb the feature matrix slightly to break exact ties
        #[arg(long)]
        jitter: bool,

        /// Also write the result table to this path as TSV
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Predict {
            roster,
            config,
            no_fit,
            jitter,
            seed,
            output,
        }) => run_predict(
            &roster,
            config.as_deref(),
            no_fit,
            jitter,
            seed,
            output.as_deref(),
        ),
        Some(Commands::Simulate {
            count,
            seed,
            config,
            no_fit,
            jitter,
            output,
        }) => run_simulate(
            count,
            seed,
            config.as_deref(),
            no_fit,
            jitter,
            output.as_deref(),
        ),
        None => {
            Cli::command().print_help().expect("print help");
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>, no_fit: bool) -> Result<PredictorConfig, Box<dyn Error>> {
    let mut config = match path {
        Some(p) => PredictorConfig::from_toml_file(p)?,
        None => PredictorConfig::default(),
    };
    if no_fit {
        config.score_fit = false;
    }
    Ok(config)
}

fn run_predict(
    roster: &Path,
    config: Option<&Path>,
    no_fit: bool,
    jitter: bool,
    seed: u64,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let members = load_roster(roster)?;
    let predictor = Predictor::new(load_config(config, no_fit)?);
    let report = if jitter {
        let mut rng = StdRng::seed_from_u64(seed);
        predictor.predict_jittered(&members, &mut rng)?
    } else {
        predictor.predict(&members)?
    };
    render_report(&report, output)
}

fn run_simulate(
    count: usize,
    seed: u64,
    config: Option<&Path>,
    no_fit: bool,
    jitter: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut members = reference_members();
    members.extend(synthetic_members(count, &mut rng));
    log::info!(
        "Simulating a cohort of {} members ({count} generated, seed {seed})",
        members.len()
    );

    let predictor = Predictor::new(load_config(config, no_fit)?);
    let report = if jitter {
        predictor.predict_jittered(&members, &mut rng)?
    } else {
        predictor.predict(&members)?
    };
    render_report(&report, output)
}

fn round_display(v: f64) -> f64 {
    let scale = 10f64.powi(DISPLAY_DECIMALS);
    (v * scale).round() / scale
}

fn render_report(report: &PredictionReport, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    if !report.dropped_features.is_empty() {
        println!(
            "Dropped constant features: {}",
            report.dropped_features.iter().join(", ")
        );
    }

    let ids: Vec<&str> = report.rows.iter().map(|r| r.member_id.as_str()).collect();
    let risks: Vec<f64> = report.rows.iter().map(|r| round_display(r.risk)).collect();
    let fits: Vec<Option<f64>> = report
        .rows
        .iter()
        .map(|r| r.fit.map(round_display))
        .collect();

    let mut df = df!(
        "member_id" => ids,
        "predicted_risk" => risks,
        "fit_score" => fits,
    )?;

    println!("\nRelevance-Based Prediction Results:");
    println!("{df}");

    if let Some(path) = output {
        let mut file = std::fs::File::create(path)?;
        CsvWriter::new(&mut file)
            .with_separator(b'\t')
            .finish(&mut df)?;
        log::info!("Wrote result table to {}", path.display());
    }
    Ok(())
}
