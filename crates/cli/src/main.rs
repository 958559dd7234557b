//! Credit Default Risk Command Line Interface
//!
//! Form boundary for the predictor: reads a JSON customer record, prints the
//! assessment, and offers inspection helpers for model artifacts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use credit_risk_core::{
    load_model, Category, EncodingTables, EnsembleModel, FeatureLayout, LayoutSetting,
    LogFormat, Predictor, RawInputRecord, RiskConfig,
};
use serde_json::json;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "credit-risk")]
#[command(about = "Credit card default risk prediction", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict default risk for one customer record
    Predict {
        /// Model artifact (overrides config)
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
        /// Customer record JSON ("-" for stdin)
        #[arg(long, value_name = "PATH")]
        input: PathBuf,
        /// Row layout (overrides config)
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the encoded row and engineered features for a record
    Features {
        /// Customer record JSON ("-" for stdin)
        #[arg(long, value_name = "PATH")]
        input: PathBuf,
        #[arg(long, value_enum, default_value = "engineered")]
        layout: LayoutArg,
    },
    /// Print the ordered model input columns
    Schema {
        #[arg(long, value_enum, default_value = "engineered")]
        layout: LayoutArg,
    },
    /// Print the categorical label tables
    Labels,
    /// Summarize a model artifact
    Inspect {
        #[arg(long, value_name = "PATH")]
        model: PathBuf,
    },
    /// Print the canonical hash of a model artifact
    Hash {
        #[arg(long, value_name = "PATH")]
        model: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    Auto,
    Engineered,
    Base,
}

impl From<LayoutArg> for LayoutSetting {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Auto => LayoutSetting::Auto,
            LayoutArg::Engineered => LayoutSetting::Engineered,
            LayoutArg::Base => LayoutSetting::Base,
        }
    }
}

impl LayoutArg {
    /// Concrete layout; `auto` means engineered when no model is involved
    fn layout(self) -> FeatureLayout {
        LayoutSetting::from(self)
            .fixed()
            .unwrap_or(FeatureLayout::Engineered)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Predict {
            model,
            input,
            layout,
            format,
        } => handle_predict(config, model, &input, layout, format),
        Commands::Features { input, layout } => handle_features(&input, layout),
        Commands::Schema { layout } => {
            print!("{}", render_schema(layout.layout()));
            Ok(())
        }
        Commands::Labels => {
            print!("{}", render_labels(&EncodingTables::standard()));
            Ok(())
        }
        Commands::Inspect { model } => handle_inspect(&model),
        Commands::Hash { model } => {
            let model = load_model(&model, None)
                .with_context(|| format!("failed to load model {}", model.display()))?;
            println!("{}", model.hash_hex()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RiskConfig> {
    let mut config = match path {
        Some(path) => RiskConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RiskConfig::default(),
    };
    config
        .apply_env()
        .context("invalid environment override")?;
    config.ensure_valid().context("invalid configuration")?;
    Ok(config)
}

fn init_logging(config: &RiskConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries results only
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    let installed = match config.logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn read_record(path: &Path) -> Result<RawInputRecord> {
    let record = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read record from stdin")?;
        serde_json::from_str(&buffer)
    } else {
        let file = File::open(path)
            .with_context(|| format!("failed to open record {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
    };
    record.with_context(|| format!("invalid customer record {}", path.display()))
}

fn handle_predict(
    mut config: RiskConfig,
    model: Option<PathBuf>,
    input: &Path,
    layout: Option<LayoutArg>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(model) = model {
        config.model.path = model;
    }
    if let Some(layout) = layout {
        config.features.layout = layout.into();
    }
    debug!(model = %config.model.path.display(), "Resolved configuration");

    let predictor = credit_risk_core::predictor_from_config(&config)
        .with_context(|| format!("failed to prepare model {}", config.model.path.display()))?;
    let record = read_record(input)?;
    let output = render_prediction(&predictor, &record, format)?;
    println!("{output}");
    Ok(())
}

fn render_prediction(
    predictor: &Predictor<EnsembleModel>,
    record: &RawInputRecord,
    format: OutputFormat,
) -> Result<String> {
    let result = predictor.predict(record).context("prediction failed")?;
    let assessment = result.assessment();
    info!(level = ?assessment.level, "Rendered assessment");

    Ok(match format {
        OutputFormat::Text => assessment.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "label": result.label.class(),
            "probability_default": result.probability_default,
            "assessment": assessment,
            "layout": predictor.layout(),
        }))?,
    })
}

fn handle_features(input: &Path, layout: LayoutArg) -> Result<()> {
    let record = read_record(input)?;
    record.validate()?;
    let encoded = record.encode(&EncodingTables::standard())?;
    let features = credit_risk_core::engineer(&encoded)?;
    let row = credit_risk_core::ModelInputRow::build(layout.layout(), &encoded, &features);

    let columns: serde_json::Map<String, serde_json::Value> = row
        .named_values()
        .into_iter()
        .map(|(name, value)| (name.to_string(), json!(value)))
        .collect();
    let output = json!({
        "layout": row.layout(),
        "engineered": features,
        "row": columns,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn render_schema(layout: FeatureLayout) -> String {
    layout
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{i:>2}  {name}\n"))
        .collect()
}

fn render_labels(tables: &EncodingTables) -> String {
    let mut out = String::new();
    for category in Category::ALL {
        out.push_str(&format!("{category}:\n"));
        for (label, code) in tables.entries(category) {
            out.push_str(&format!("  {code:>3}  {label}\n"));
        }
    }
    out
}

fn handle_inspect(path: &Path) -> Result<()> {
    let model = load_model(path, None)
        .with_context(|| format!("failed to load model {}", path.display()))?;
    println!("{}", render_inspect(&model)?);
    Ok(())
}

fn render_inspect(model: &EnsembleModel) -> Result<String> {
    let layout = FeatureLayout::matching(&model.feature_names)
        .map(|l| l.to_string())
        .unwrap_or_else(|| "unrecognized".to_string());

    let summary = json!({
        "version": model.version,
        "objective": model.objective,
        "trees": model.num_trees(),
        "scale": model.scale,
        "post_scale": model.post_scale,
        "decision_threshold": model.decision_threshold(),
        "feature_count": model.feature_names.len(),
        "layout": layout,
        "hash": model.hash_hex()?,
        "inspected_by": format!("credit-risk-core {}", credit_risk_core::VERSION),
    });
    Ok(serde_json::to_string_pretty(&summary)?)
}
