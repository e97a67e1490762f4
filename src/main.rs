use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;

use terra_score::batch::{run_batch, BatchOptions};
use terra_score::config::Config;
use terra_score::fuzzy::FuzzyError;
use terra_score::similarity::{EarthSimilarity, Field};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NO_SCORE: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a single planet from flags and/or a JSON file
    Score {
        /// Planet radius (Earth radii)
        #[arg(long)]
        radius: Option<f64>,

        /// Equilibrium temperature (K)
        #[arg(long)]
        teq: Option<f64>,

        /// Insolation flux (Earth = 1)
        #[arg(long)]
        insol: Option<f64>,

        /// Orbital period (days)
        #[arg(long)]
        period: Option<f64>,

        /// Stellar effective temperature (K)
        #[arg(long)]
        st_teff: Option<f64>,

        /// Stellar radius (Solar radii)
        #[arg(long)]
        st_rad: Option<f64>,

        /// Stellar surface gravity (log10 cgs)
        #[arg(long)]
        st_logg: Option<f64>,

        /// JSON object keyed by field name; flags override its values
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fill the similarity score of every eligible record in a JSON store
    Batch {
        /// JSON array of records
        #[arg(long)]
        records: PathBuf,

        /// Reference rows keyed by object id: a CSV file (.csv) or a JSON array
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Where the scored records are written (may equal --records)
        #[arg(short, long)]
        output: PathBuf,

        /// Override batch.checkpoint_every from the config
        #[arg(long)]
        checkpoint_every: Option<usize>,

        /// Ignore an existing checkpoint and start over
        #[arg(long)]
        no_resume: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "terra-score")]
#[command(about = "Fuzzy Earth-similarity scoring for exoplanets", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/terra-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let mut config = match terra_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Commands::Batch {
        checkpoint_every: Some(n),
        ..
    } = &cli.command
    {
        config.batch.checkpoint_every = *n;
    }

    // Validate config at startup
    if let Err(errors) = terra_score::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let scorer = match EarthSimilarity::new(config.defaults) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Model error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!(
            "Model: {} inputs, {} rules",
            scorer.engine().inputs().len(),
            scorer.engine().rules().len()
        );
    }

    let code = match cli.command {
        Commands::Score {
            radius,
            teq,
            insol,
            period,
            st_teff,
            st_rad,
            st_logg,
            input,
            json,
        } => {
            let flags = [
                (Field::Radius, radius),
                (Field::Teq, teq),
                (Field::Insol, insol),
                (Field::Period, period),
                (Field::StTeff, st_teff),
                (Field::StRad, st_rad),
                (Field::StLogg, st_logg),
            ];
            run_score(&scorer, &config, input.as_deref(), &flags, json, cli.verbose)
        }
        Commands::Batch {
            records,
            reference,
            output,
            no_resume,
            ..
        } => {
            let options = BatchOptions {
                records_path: records,
                reference_path: reference,
                output_path: output,
                resume: !no_resume,
                show_progress: std::io::stderr().is_terminal(),
                verbose: cli.verbose,
            };
            match run_batch(&scorer, &config.batch, &options) {
                Ok(summary) => {
                    let use_colors = terra_score::output::should_use_colors();
                    println!(
                        "{}",
                        terra_score::output::format_summary(&summary, &options.output_path, use_colors)
                    );
                    EXIT_SUCCESS
                }
                Err(e) => {
                    eprintln!("Batch failed: {:#}", e);
                    EXIT_IO
                }
            }
        }
    };

    if cli.verbose {
        eprintln!("Done in {:?}", start_time.elapsed());
    }

    std::process::exit(code);
}

/// Read the object passed with `--input`
fn read_input_file(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file at {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input file at {}", path.display()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => anyhow::bail!("Input file {} must hold a JSON object", path.display()),
    }
}

fn run_score(
    scorer: &EarthSimilarity,
    config: &Config,
    input: Option<&Path>,
    flags: &[(Field, Option<f64>)],
    json: bool,
    verbose: bool,
) -> i32 {
    let mut object = match input {
        Some(path) => match read_input_file(path) {
            Ok(object) => object,
            Err(e) => {
                eprintln!("Input error: {:#}", e);
                return EXIT_IO;
            }
        },
        None => Map::new(),
    };

    if verbose {
        for key in object.keys() {
            if key.parse::<Field>().is_err() {
                eprintln!("Ignoring unknown input key '{}'", key);
            }
        }
    }

    for (field, value) in flags {
        if let Some(value) = value {
            object.insert(field.name().to_string(), Value::from(*value));
        }
    }

    let assessment = match scorer.assess_json(&object) {
        Ok(a) => a,
        Err(FuzzyError::UndefinedDefuzzification) => {
            eprintln!("No score: none of the rules apply to this planet.");
            return EXIT_NO_SCORE;
        }
        Err(e) => {
            eprintln!("Scoring failed: {}", e);
            return EXIT_NO_SCORE;
        }
    };

    if json {
        let value = terra_score::output::assessment_to_json(&assessment, config.batch.round_decimals);
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize assessment: {}", e);
                return EXIT_IO;
            }
        }
    } else {
        let use_colors = terra_score::output::should_use_colors();
        println!(
            "{}",
            terra_score::output::format_assessment(&assessment, verbose, use_colors)
        );
    }

    EXIT_SUCCESS
}
