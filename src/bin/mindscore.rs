//! MindScore CLI - Command-line interface for Synheart MindScore
//!
//! Commands:
//! - score: Assess a single set of habit inputs
//! - run: Assess NDJSON requests from stdin (streaming mode)
//! - doctor: Diagnose model and configuration health
//! - schema: Print request/payload schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use synheart_mindscore::model::load_model_file;
use synheart_mindscore::types::AssessmentRequest;
use synheart_mindscore::{
    inverse_availability, EngineConfig, LinearInspectable, Predictable, ScoreEngine, ScoreError,
    MINDSCORE_VERSION, PRODUCER_NAME,
};

/// MindScore - On-device scoring engine for daily habit inputs
#[derive(Parser)]
#[command(name = "mindscore")]
#[command(author = "Synheart AI Inc")]
#[command(version = MINDSCORE_VERSION)]
#[command(about = "Score screen time and exercise habits with a pre-trained model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a single set of habit inputs
    Score {
        /// Model file path (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Daily screen time in hours
        #[arg(long)]
        screen: Option<f64>,

        /// Daily exercise in hours
        #[arg(long)]
        exercise: Option<f64>,

        /// Adjustment category (e.g. profession) from the configuration
        #[arg(long)]
        category: Option<String>,

        /// Target score for the exercise estimate
        #[arg(long)]
        target: Option<f64>,

        /// What-if change in screen time (hours)
        #[arg(long, allow_hyphen_values = true)]
        what_if_screen: Option<f64>,

        /// What-if change in exercise (hours)
        #[arg(long, allow_hyphen_values = true)]
        what_if_exercise: Option<f64>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Assess NDJSON requests from stdin (streaming mode)
    Run {
        /// Model file path (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Diagnose model and configuration health
    Doctor {
        /// Model file to check
        #[arg(long)]
        model: Option<PathBuf>,

        /// Configuration file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Assessment request
    Input,
    /// Assessment payload
    Output,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), MindScoreCliError> {
    match cli.command {
        Commands::Score {
            model,
            config,
            screen,
            exercise,
            category,
            target,
            what_if_screen,
            what_if_exercise,
            output_format,
        } => {
            let mut request = AssessmentRequest {
                screen_hours: screen,
                exercise_hours: exercise,
                category,
                what_if: None,
                target_score: target,
            };
            if what_if_screen.is_some() || what_if_exercise.is_some() {
                request = request.with_what_if(
                    what_if_screen.unwrap_or(0.0),
                    what_if_exercise.unwrap_or(0.0),
                );
            }
            cmd_score(&model, config.as_deref(), &request, output_format)
        }

        Commands::Run {
            model,
            config,
            flush,
        } => cmd_run(&model, config.as_deref(), flush),

        Commands::Doctor {
            model,
            config,
            json,
        } => cmd_doctor(model.as_deref(), config.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn load_engine(model: &Path, config: Option<&Path>) -> Result<ScoreEngine, MindScoreCliError> {
    let config = match config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    Ok(ScoreEngine::from_model_file(model, config)?)
}

fn cmd_score(
    model: &Path,
    config: Option<&Path>,
    request: &AssessmentRequest,
    output_format: OutputFormat,
) -> Result<(), MindScoreCliError> {
    let engine = load_engine(model, config)?;
    let assessment = engine.assess(request)?;

    let output = match output_format {
        OutputFormat::Json => engine.encode(&assessment)?,
        OutputFormat::JsonPretty => engine.encode_pretty(&assessment)?,
    };
    println!("{}", output);

    Ok(())
}

fn cmd_run(model: &Path, config: Option<&Path>, flush: bool) -> Result<(), MindScoreCliError> {
    let engine = load_engine(model, config)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let request = AssessmentRequest::from_json(trimmed).map_err(|e| {
            MindScoreCliError::ParseError(format!("Line {}: {}", line_no + 1, e))
        })?;
        let assessment = engine.assess(&request)?;

        writeln!(stdout, "{}", engine.encode(&assessment)?)?;
        if flush {
            stdout.flush()?;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn cmd_doctor(
    model: Option<&Path>,
    config: Option<&Path>,
    json: bool,
) -> Result<(), MindScoreCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "mindscore_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("MindScore version {}", MINDSCORE_VERSION),
    });

    if let Some(model_path) = model {
        checks.push(check_model(model_path));
    }

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Configuration file does not exist, defaults apply".to_string(),
            }
        } else {
            match EngineConfig::from_file(config_path) {
                Ok(cfg) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Configuration valid (bands {}/{}, {} adjustment categories)",
                        cfg.thresholds.moderate_from,
                        cfg.thresholds.good_from,
                        cfg.adjustments.len()
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid configuration: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: MINDSCORE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("MindScore Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(MindScoreCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_model(path: &Path) -> DoctorCheck {
    match load_model_file(path) {
        Ok(model) => {
            let names = model
                .feature_names()
                .filter(|n| !n.is_empty())
                .map(|n| n.join(", "))
                .unwrap_or_else(|| "none declared, fallback applies".to_string());
            let inverse = match inverse_availability(&model) {
                Ok(()) => "available".to_string(),
                Err(reason) => format!("unavailable, {}", reason),
            };
            DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Model valid (features: {}; intercept {}; inverse estimate {})",
                    names,
                    model.intercept(),
                    inverse
                ),
            }
        }
        Err(ScoreError::ModelNotFound(p)) => DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Error,
            message: format!("Model file not found: {}", p),
        },
        Err(e) => DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Error,
            message: format!("Invalid model: {}", e),
        },
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), MindScoreCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input: assessment request (JSON object, one per line for `run`)");
            println!();
            println!("- screen_hours: daily screen time in hours (default from config)");
            println!("- exercise_hours: daily exercise in hours (default from config)");
            println!("- category: adjustment category from config (optional)");
            println!("- what_if: {{ delta_screen_hours, delta_exercise_hours }} (optional)");
            println!("- target_score: target for the exercise estimate (default from config)");
            println!();
            println!("Model file: {{ intercept, coefficients, feature_names? }}");
            println!("Recognized features: Screen_Time_Hours, Exercise_Hours, Exercise_Minutes");
        }
        SchemaType::Output => {
            println!("Output: assessment payload");
            println!();
            println!("- payload_version, producer {{ name, version, instance_id }}, computed_at_utc");
            println!("- inputs: {{ screen_hours, exercise_hours }}");
            println!("- features: [{{ name, value }}] in model order, fallback_features");
            println!("- score: {{ raw, clamped, band, color, advice }}");
            println!("- adjustment: {{ category, adjustment, adjusted, band, color, advice, tip }} (optional)");
            println!("- what_if: {{ screen_hours, exercise_hours, base_score, simulated_score, difference }} (optional)");
            println!("- target: {{ target_score, required_exercise_delta_hours, unavailable_reason }}");
        }
    }

    Ok(())
}

// Error types

#[derive(Debug)]
enum MindScoreCliError {
    Io(io::Error),
    Score(ScoreError),
    Json(serde_json::Error),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for MindScoreCliError {
    fn from(e: io::Error) -> Self {
        MindScoreCliError::Io(e)
    }
}

impl From<ScoreError> for MindScoreCliError {
    fn from(e: ScoreError) -> Self {
        MindScoreCliError::Score(e)
    }
}

impl From<serde_json::Error> for MindScoreCliError {
    fn from(e: serde_json::Error) -> Self {
        MindScoreCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MindScoreCliError> for CliError {
    fn from(e: MindScoreCliError) -> Self {
        match e {
            MindScoreCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MindScoreCliError::Score(e) => {
                let (code, hint) = match &e {
                    ScoreError::ModelNotFound(_) => {
                        ("MODEL_NOT_FOUND", "Check the --model path; no score can be computed without a model")
                    }
                    ScoreError::InvalidModel(_) => {
                        ("INVALID_MODEL", "Run 'mindscore doctor --model <path>' for details")
                    }
                    ScoreError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Run 'mindscore doctor --config <path>' for details")
                    }
                    ScoreError::UnknownCategory(_) => {
                        ("UNKNOWN_CATEGORY", "Add the category to the configuration's adjustments")
                    }
                    ScoreError::InvalidRequest(_) | ScoreError::JsonError(_) => {
                        ("INVALID_REQUEST", "Run 'mindscore schema input' for the request format")
                    }
                    ScoreError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MindScoreCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MindScoreCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            MindScoreCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Each stdin line must be one JSON request".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
