//! `range-eval` binary: score a range model artifact against a labelled CSV.
//!
//! ```bash
//! range-eval --vehicle ev --data data/ev_test.csv --model models/ev_model.onnx \
//!     --metrics-out outputs/ev_metrics.csv
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_validator::VehicleClass;
use range_eval::{evaluate, write_metrics_csv};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "range-eval", version, about = "Evaluate a range model on a labelled CSV dataset")]
struct Args {
    /// Vehicle class (`ev` or `hv`)
    #[arg(long, value_name = "CLASS")]
    vehicle: VehicleClass,

    /// Labelled CSV dataset with a header row
    #[arg(long, value_name = "FILE")]
    data: PathBuf,

    /// Model artifact (`.onnx` or `.json`)
    #[arg(long, value_name = "FILE")]
    model: PathBuf,

    /// Write `metric,value` rows to this CSV
    #[arg(long, value_name = "FILE")]
    metrics_out: Option<PathBuf>,

    /// Treat a numeric `ambient_temp` column as Celsius and bucket it
    #[arg(long, default_value_t = false)]
    bucket_numeric_ambient: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    info!("Evaluating {} model {}", args.vehicle, args.model.display());
    let metrics = evaluate(args.vehicle, &args.data, &args.model, args.bucket_numeric_ambient)?;

    println!("RMSE: {:.2}", metrics.rmse);
    println!("MAE: {:.2}", metrics.mae);
    println!("R2: {:.4}", metrics.r2);

    if let Some(path) = &args.metrics_out {
        write_metrics_csv(path, &metrics)?;
        info!("Metrics written to {}", path.display());
    }
    Ok(())
}
