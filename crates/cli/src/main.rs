//! Water Quality Monitor CLI
//!
//! A command-line tool for running potability checks against the
//! hosted scoring service and uploading raw data files to object
//! storage.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use commands::{ingest, predict};
use monitor_lib::WaterReadings;

/// Water Quality Monitor CLI
#[derive(Parser)]
#[command(name = "wqm")]
#[command(author, version, about = "CLI for the Water Quality Monitor", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a potability check for one set of readings
    Predict(ReadingArgs),

    /// Upload a raw data file to the object storage bucket
    Ingest {
        /// Local file to upload
        #[arg(default_value = "water_potability.csv")]
        file: PathBuf,

        /// Object name to store the file under
        #[arg(long, default_value = "raw_water_potability_data.csv")]
        object_name: String,
    },
}

/// Measurements for one potability check
#[derive(Args)]
pub struct ReadingArgs {
    /// Water pH
    #[arg(long, default_value_t = 4.5)]
    pub ph: f64,

    /// Hardness (mg/L)
    #[arg(long, default_value_t = 150.0)]
    pub hardness: f64,

    /// Total dissolved solids (ppm)
    #[arg(long, default_value_t = 20000.0)]
    pub solids: f64,

    /// Chloramines (ppm)
    #[arg(long, default_value_t = 5.0)]
    pub chloramines: f64,

    /// Sulfate (mg/L)
    #[arg(long, default_value_t = 300.0)]
    pub sulfate: f64,

    /// Conductivity (uS/cm)
    #[arg(long, default_value_t = 450.0)]
    pub conductivity: f64,

    /// Organic carbon (ppm)
    #[arg(long, default_value_t = 10.0)]
    pub organic_carbon: f64,

    /// Trihalomethanes (ug/L)
    #[arg(long, default_value_t = 55.0)]
    pub trihalomethanes: f64,

    /// Turbidity (NTU)
    #[arg(long, default_value_t = 9.0)]
    pub turbidity: f64,
}

impl ReadingArgs {
    fn into_readings(self) -> WaterReadings {
        WaterReadings {
            ph: self.ph,
            hardness: self.hardness,
            solids: self.solids,
            chloramines: self.chloramines,
            sulfate: self.sulfate,
            conductivity: self.conductivity,
            organic_carbon: self.organic_carbon,
            trihalomethanes: self.trihalomethanes,
            turbidity: self.turbidity,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Predict(args) => predict::run_check(&args.into_readings(), cli.format).await,
        Commands::Ingest { file, object_name } => {
            ingest::upload_file(&file, &object_name, cli.format).await
        }
    };

    if let Err(e) = result {
        output::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
