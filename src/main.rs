mod input;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use thermopath_core::{AveragePath, ErrorModel, PartitionTable, ScaledTable, ThermalPath, z_normalize};

use crate::input::{PairReader, SeriesPair};

#[derive(Parser)]
#[command(name = "thermopath")]
#[command(about = "Thermal optimal path lead/lag estimation between two time series")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for the parallel fill (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input file and column selection.
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Path to the input CSV file (header row, one row per time step)
    #[arg(long)]
    data: PathBuf,

    /// Column holding the first series (defaults to the first column)
    #[arg(long)]
    column_a: Option<String>,

    /// Column holding the second series (defaults to the second column)
    #[arg(long)]
    column_b: Option<String>,
}

/// Shared model parameters.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Temperature of the Boltzmann kernel (must be positive)
    #[arg(long, default_value_t = 1.0, value_parser = parse_temperature)]
    temperature: f64,

    /// Use the absolute error instead of the squared error
    #[arg(long, default_value_t = false)]
    sqrt: bool,

    /// Only score positive correlation (ignore the anti-correlated reading)
    #[arg(long, default_value_t = false)]
    single_sign: bool,

    /// Z-normalize both series before computing the partition function
    #[arg(long, default_value_t = false)]
    normalize: bool,

    /// Fill each rotated-time layer in parallel
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the average lag path, in rotated time and in original time
    AveragePath {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Print the full partition function table
    Partition {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Print each rotated-time layer rescaled to unit sum, plus the log scales
        #[arg(long, default_value_t = false)]
        rescale: bool,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct AveragePathOutput<'a> {
    columns: &'a [String; 2],
    n: usize,
    temperature: f64,
    average_path: &'a [f64],
    lags: Vec<f64>,
}

#[derive(Serialize)]
struct PartitionOutput<'a> {
    columns: &'a [String; 2],
    n: usize,
    temperature: f64,
    table: Vec<&'a [f64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_scale: Option<&'a [f64]>,
}

fn parse_temperature(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("invalid temperature: {s}"))?;
    if !(value.is_finite() && value > 0.0) {
        return Err(format!("temperature must be finite and positive, got {value}"));
    }
    Ok(value)
}

fn build_engine(model: &ModelArgs) -> ThermalPath<ErrorModel> {
    let error_model = ErrorModel::default()
        .with_sqrt(model.sqrt)
        .with_both_signs(!model.single_sign);
    ThermalPath::new(model.temperature).with_cost(error_model)
}

fn load_pair(input: &InputArgs, normalize: bool) -> Result<SeriesPair> {
    let mut pair = PairReader::new(&input.data)
        .with_columns(input.column_a.clone(), input.column_b.clone())
        .read()
        .context("failed to read input CSV")?;
    info!(n = pair.a.len(), "series loaded");

    if normalize {
        pair.a = z_normalize(&pair.a)
            .with_context(|| format!("z-normalization of column \"{}\" failed", pair.columns[0]))?;
        pair.b = z_normalize(&pair.b)
            .with_context(|| format!("z-normalization of column \"{}\" failed", pair.columns[1]))?;
        info!("z-normalized both series");
    }
    Ok(pair)
}

fn compute_table(model: &ModelArgs, pair: &SeriesPair) -> Result<PartitionTable> {
    let engine = build_engine(model);
    let table = if model.parallel {
        engine.partition_function_par(&pair.a, &pair.b)
    } else {
        engine.partition_function(&pair.a, &pair.b)
    };
    table.context("partition function failed")
}

fn compute_scaled(model: &ModelArgs, pair: &SeriesPair) -> Result<ScaledTable> {
    let engine = build_engine(model);
    let table = if model.parallel {
        engine.partition_function_scaled_par(&pair.a, &pair.b)
    } else {
        engine.partition_function_scaled(&pair.a, &pair.b)
    };
    table.context("partition function failed")
}

fn ensure_defined(avg: &AveragePath) -> Result<()> {
    let interior = avg.interior_undefined();
    if interior > 0 {
        bail!(
            "average path is undefined at {interior} interior rotated time(s); \
             all path weight underflowed, try a higher temperature or --normalize"
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::AveragePath { input, model } => {
            let pair = load_pair(&input, model.normalize)?;
            let scaled = compute_scaled(&model, &pair)?;
            let avg: AveragePath = thermopath_core::average_path(scaled.table());
            ensure_defined(&avg)?;
            info!(steps = avg.len(), "average path computed");

            let output = AveragePathOutput {
                columns: &pair.columns,
                n: pair.a.len(),
                temperature: model.temperature,
                average_path: avg.values(),
                lags: avg.lags(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Partition {
            input,
            model,
            rescale,
        } => {
            let pair = load_pair(&input, model.normalize)?;
            let n = pair.a.len();

            if rescale {
                let scaled = compute_scaled(&model, &pair)?;
                info!(n, "rescaled partition function computed");
                let output = PartitionOutput {
                    columns: &pair.columns,
                    n,
                    temperature: model.temperature,
                    table: scaled.table().rows().collect(),
                    log_scale: Some(scaled.log_scales()),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let table = compute_table(&model, &pair)?;
                let overflowed = table.as_slice().iter().filter(|g| !g.is_finite()).count();
                if overflowed > 0 {
                    warn!(overflowed, "partition weights overflowed; rerun with --rescale");
                }
                info!(n, "partition function computed");
                let output = PartitionOutput {
                    columns: &pair.columns,
                    n,
                    temperature: model.temperature,
                    table: table.rows().collect(),
                    log_scale: None,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
    }

    Ok(())
}
