//! Diabetes Risk Calculator - command line front end
//!
//! Collects the form values, loads the classifier once and prints the
//! risk label for the submitted measurements.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use diabetes_risk::{
    config::{AppConfig, LoggingConfig},
    error::PredictionError,
    feature_extractor::FeatureExtractor,
    models::inference::RiskPredictor,
    statistics,
    types::patient::{Gender, Hypertension, PatientInputs},
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "diabetes-risk", version, about = "SaluSite diabetes risk calculator")]
struct Cli {
    /// Configuration file
    #[arg(long, env = "DIABETES_RISK_CONFIG", default_value = "config/config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate diabetes risk for one set of measurements
    Assess(AssessArgs),
    /// Show background diabetes statistics
    Stats,
    /// List classifier features in input order
    Features,
}

#[derive(Args)]
struct AssessArgs {
    /// HbA1c level (3.5 - 9.0)
    #[arg(long, default_value_t = 6.0)]
    hba1c: f64,
    /// AHD level (0 - 100)
    #[arg(long, default_value_t = 50)]
    ahd: u32,
    /// Blood glucose level (60 - 400)
    #[arg(long, default_value_t = 120.0)]
    glucose: f64,
    /// Age in years (1 - 150)
    #[arg(long, default_value_t = 30)]
    age: u32,
    /// Height in cm (30 - 300)
    #[arg(long, default_value_t = 170.0)]
    height: f64,
    /// Weight in kg (1 - 500)
    #[arg(long, default_value_t = 70.0)]
    weight: f64,
    /// Female or Male
    #[arg(long, default_value = "Female")]
    gender: Gender,
    /// Yes or No
    #[arg(long, default_value = "Yes")]
    hypertension: Hypertension,
    /// Print the full assessment as JSON
    #[arg(long)]
    json: bool,
}

impl AssessArgs {
    fn to_inputs(&self) -> PatientInputs {
        PatientInputs {
            hba1c: self.hba1c,
            ahd: self.ahd,
            blood_glucose: self.glucose,
            age: self.age,
            height_cm: self.height,
            weight_kg: self.weight,
            gender: self.gender,
            hypertension: self.hypertension,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Stats => {
            println!("{}", statistics::render_background());
            println!();
            println!("Diabetes Statistics");
            println!("{}", statistics::render());
            Ok(ExitCode::SUCCESS)
        }
        Command::Features => {
            let extractor = FeatureExtractor::new();
            for (idx, name) in extractor.feature_names().iter().enumerate() {
                println!("{}. {}", idx + 1, name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Assess(args) => {
            let config = AppConfig::load_from_path(&cli.config)
                .with_context(|| format!("Failed to load {}", cli.config.display()))?;
            init_logging(&config.logging)?;
            run_assessment(&config, &args)
        }
    }
}

fn run_assessment(config: &AppConfig, args: &AssessArgs) -> Result<ExitCode> {
    let inputs = args.to_inputs();

    // Model load failure is fatal; the predictor never becomes ready
    let predictor = RiskPredictor::new(config).context("Failed to initialize risk predictor")?;
    info!(
        model = %predictor.classifier_name(),
        scaling = predictor.scaling().mode_name(),
        "Risk predictor initialized"
    );

    match predictor.assess(&inputs) {
        Ok(assessment) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                println!("BMI: {:.2}", assessment.bmi);
                println!("Diabetes Risk Prediction: {}", assessment.label);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ PredictionError::InvalidInput(_)) => {
            eprintln!("{}", e);
            Ok(ExitCode::from(2))
        }
        Err(e) => {
            error!(error = %e, "Assessment failed");
            eprintln!("Error making prediction: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}
