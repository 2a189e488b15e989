//! # tunecast-cli
//!
//! Command-line interface for forecast parameter tuning.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tunecast_models::standard_registry;
use tuner_facade::progress;
use tuner_facade::{
    extract_values, validate_and_preprocess, FieldPriorityAccessor, Frequency, GridOptimizer,
    ParamSet, SearchRequest, SearchSummary, ValidationEngine, DEFAULT_SEASONAL_PERIOD,
};

type CliResult<T> = std::result::Result<T, String>;

#[derive(Parser)]
#[command(name = "tunecast")]
#[command(about = "Forecast parameter tuning CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search parameter grids and rank configurations by accuracy
    Search {
        /// Input file (CSV or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Comma-separated model ids (default: the whole catalog)
        #[arg(short, long)]
        models: Option<String>,

        /// Series frequency (weekly, monthly, quarterly, yearly)
        #[arg(short, long)]
        frequency: Option<String>,

        /// Seasonal period override
        #[arg(long)]
        seasonal_period: Option<usize>,

        /// Rows to show in the ranked table
        #[arg(long, default_value = "15")]
        top: usize,

        /// Column name or index for series values
        #[arg(short, long)]
        column: Option<String>,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare a candidate parameter set against a baseline
    Compare {
        /// Input file (CSV or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Model id to compare on
        #[arg(short, long)]
        model: String,

        /// Candidate parameters as JSON, e.g. '{"alpha": 0.8}'
        #[arg(long)]
        candidate: String,

        /// Baseline parameters as JSON
        #[arg(long)]
        baseline: String,

        /// Seasonal period override
        #[arg(long)]
        seasonal_period: Option<usize>,

        /// Column name or index for series values
        #[arg(short, long)]
        column: Option<String>,
    },

    /// Check a series against the tuning data-quality gate
    Validate {
        /// Input file (CSV or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Column name or index for series values
        #[arg(short, long)]
        column: Option<String>,
    },
}

/// Load series values from a CSV file
fn load_csv_data(path: &PathBuf, column: Option<&str>) -> CliResult<Vec<f64>> {
    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read headers: {}", e))?
        .clone();

    let col_idx = match column {
        // Accept a position or a header name
        Some(col) => match col.parse::<usize>() {
            Ok(idx) => idx,
            Err(_) => headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(col))
                .ok_or_else(|| format!("Column '{}' not found", col))?,
        },
        None => {
            // Prefer a sales-like header, else take the first column
            let lower: Vec<String> = headers.iter().map(|h| h.to_ascii_lowercase()).collect();
            ["sales", "quantity", "value", "amount"]
                .iter()
                .find_map(|name| lower.iter().position(|h| h == name))
                .unwrap_or(0)
        }
    };

    let mut data = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("Failed to read record: {}", e))?;
        if let Some(raw) = record.get(col_idx) {
            if let Ok(value) = raw.trim().parse::<f64>() {
                data.push(value);
            }
        }
    }

    if data.is_empty() {
        return Err("No numeric data found in the specified column".to_string());
    }

    Ok(data)
}

/// Load series values from a JSON file
fn load_json_data(path: &PathBuf, column: Option<&str>) -> CliResult<Vec<f64>> {
    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let reader = BufReader::new(file);
    let json: serde_json::Value =
        serde_json::from_reader(reader).map_err(|e| format!("Failed to parse JSON: {}", e))?;

    let points = match &json {
        serde_json::Value::Array(points) => points.as_slice(),
        serde_json::Value::Object(object) => ["data", "values", "series", "sales"]
            .iter()
            .find_map(|key| object.get(*key).and_then(|v| v.as_array()))
            .map(|points| points.as_slice())
            .ok_or_else(|| "Could not find a series array in JSON".to_string())?,
        _ => return Err("Could not extract numeric data from JSON".to_string()),
    };

    // Bare numbers pass through; objects go through the field accessor.
    if points.iter().all(|p| p.is_number()) {
        return Ok(points.iter().filter_map(|p| p.as_f64()).collect());
    }

    let accessor = match column {
        Some(col) => FieldPriorityAccessor::new([col]),
        None => FieldPriorityAccessor::sales_default(),
    };
    let data = extract_values(points, &accessor);
    if data.is_empty() {
        return Err("Could not extract numeric data from JSON".to_string());
    }
    Ok(data)
}

/// Load data from file (auto-detect format)
fn load_data(path: &PathBuf, column: Option<&str>) -> CliResult<Vec<f64>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => load_csv_data(path, column),
        "json" => load_json_data(path, column),
        _ => load_csv_data(path, column).or_else(|_| load_json_data(path, column)),
    }
}

fn write_summary(summary: &SearchSummary, path: &PathBuf) -> CliResult<()> {
    let mut file = File::create(path).map_err(|e| format!("Failed to create output: {}", e))?;
    serde_json::to_writer_pretty(&mut file, summary)
        .map_err(|e| format!("Failed to write JSON: {}", e))?;
    println!("Results written to {:?}", path);
    Ok(())
}

fn print_summary(summary: &SearchSummary, top: usize) {
    println!("\n=== Search Summary ===");
    println!(
        "Evaluated: {} combinations ({} succeeded)",
        summary.stats.evaluated, summary.stats.succeeded
    );
    println!(
        "Split: {} train / {} validation (seasonal period {})",
        summary.training_len, summary.validation_len, summary.seasonal_period
    );
    println!("Took: {} ms", summary.duration_ms);

    if !summary.compatibility.invalid.is_empty() {
        println!("\nSkipped models:");
        for rejection in &summary.compatibility.invalid {
            println!("  {}: {}", rejection.model_id, rejection.reason);
        }
    }

    println!(
        "\n{:<4} {:<16} {:>9} {:>9} {:>9} {:>9}  parameters",
        "#", "model", "accuracy", "mape", "rmse", "mae"
    );
    for (i, result) in summary.results.iter().take(top).enumerate() {
        if result.success {
            println!(
                "{:<4} {:<16} {:>9.2} {:>9.2} {:>9.3} {:>9.3}  {}",
                i + 1,
                result.model_id,
                result.accuracy,
                result.mape,
                result.rmse,
                result.mae,
                result.parameters
            );
        } else {
            println!(
                "{:<4} {:<16} {:>9} {:>9} {:>9} {:>9}  {}",
                i + 1,
                result.model_id,
                "failed",
                "-",
                "-",
                "-",
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    if summary.results.len() > top {
        println!("  ... {} more", summary.results.len() - top);
    }

    if let Some(best) = &summary.best {
        println!(
            "\nBest: {} {} (accuracy {:.2}%)",
            best.model_id, best.parameters, best.accuracy
        );
    }
}

/// Run grid search command
fn run_search(
    input: PathBuf,
    models: Option<String>,
    frequency: Option<String>,
    seasonal_period: Option<usize>,
    top: usize,
    column: Option<String>,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let data = load_data(&input, column.as_deref())?;
    println!(
        "Loaded {} data points from {:?}",
        data.len(),
        input.file_name().unwrap_or_default()
    );

    let registry = standard_registry();
    let mut request = SearchRequest::new();
    if let Some(models) = &models {
        let ids: Vec<String> = models
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        request = request.models(ids);
    }
    if let Some(raw) = &frequency {
        let parsed: Frequency = raw.parse()?;
        request = request.frequency(parsed);
    }
    if let Some(period) = seasonal_period {
        request = request.seasonal_period(period);
    }

    // Progress goes to stderr so stdout stays parseable.
    let (progress, events) = progress::channel();
    let reporter = std::thread::spawn(move || {
        let mut any = false;
        for event in events.iter() {
            any = true;
            eprint!(
                "\r  {:>3}% ({}/{}) {:<16}",
                event.percent, event.completed, event.total, event.model_id
            );
        }
        if any {
            eprintln!();
        }
    });

    let optimizer = GridOptimizer::new(&registry);
    let outcome = optimizer.run_with_progress(&data, &request, Some(&progress));
    drop(progress);
    let _ = reporter.join();

    let summary = outcome.map_err(|e| e.to_string())?;
    print_summary(&summary, top);

    if let Some(path) = output {
        write_summary(&summary, &path)?;
    }

    Ok(())
}

/// Run comparison command
fn run_compare(
    input: PathBuf,
    model: String,
    candidate: String,
    baseline: String,
    seasonal_period: Option<usize>,
    column: Option<String>,
) -> CliResult<()> {
    let data = load_data(&input, column.as_deref())?;
    let candidate: ParamSet =
        serde_json::from_str(&candidate).map_err(|e| format!("Invalid candidate JSON: {}", e))?;
    let baseline: ParamSet =
        serde_json::from_str(&baseline).map_err(|e| format!("Invalid baseline JSON: {}", e))?;

    let registry = standard_registry();
    if !registry.contains(&model) {
        return Err(format!("Unknown model '{}'", model));
    }

    let engine = ValidationEngine::default();
    let outcome = engine.compare(
        &registry,
        &model,
        &data,
        &candidate,
        &baseline,
        seasonal_period.unwrap_or(DEFAULT_SEASONAL_PERIOD),
    );

    println!("=== Comparison: {} ===", outcome.model_id);
    println!(
        "Candidate: accuracy {:.2}% (confidence {:.0}%)  {}",
        outcome.candidate.accuracy, outcome.candidate.confidence, candidate
    );
    println!(
        "Baseline:  accuracy {:.2}% (confidence {:.0}%)  {}",
        outcome.baseline.accuracy, outcome.baseline.confidence, baseline
    );
    println!("Improvement: {:+.2} points", outcome.improvement);
    println!(
        "Verdict: {}",
        if outcome.accepted {
            "ACCEPT candidate"
        } else {
            "KEEP baseline"
        }
    );

    Ok(())
}

/// Run data-quality check command
fn run_validate(input: PathBuf, column: Option<String>) -> CliResult<()> {
    let data = load_data(&input, column.as_deref())?;
    println!(
        "Loaded {} data points from {:?}",
        data.len(),
        input.file_name().unwrap_or_default()
    );

    let clean = validate_and_preprocess(&data).map_err(|e| e.to_string())?;
    let min = clean.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = clean.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = clean.iter().sum::<f64>() / clean.len() as f64;
    println!("Series is usable for tuning");
    println!("  points: {}", clean.len());
    println!("  range: {:.3} .. {:.3} (mean {:.3})", min, max, mean);

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search {
            input,
            models,
            frequency,
            seasonal_period,
            top,
            column,
            output,
        } => run_search(input, models, frequency, seasonal_period, top, column, output),

        Commands::Compare {
            input,
            model,
            candidate,
            baseline,
            seasonal_period,
            column,
        } => run_compare(input, model, candidate, baseline, seasonal_period, column),

        Commands::Validate { input, column } => run_validate(input, column),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
