//! `toptag`: score the large-radius jets of JSON-lines events.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use toptag::config::{self, TaggerConfig};
use toptag::logging;
use toptag::ml::ModelRegistry;
use toptag::pipeline::{TOP_TAG_SCHEMA, TopTagProducer, feature_version};
use toptag::runner;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    workers: Option<usize>,
    diagnostics: bool,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging to file disabled: {err}");
    }

    let mut config = load_config(&options)?;
    if let Some(workers) = options.workers {
        config.workers = workers;
    }
    config.diagnostics |= options.diagnostics;

    let root = config.deploy_root();
    let registry = ModelRegistry::load(&root, &config.models, &TOP_TAG_SCHEMA)
        .map_err(|err| err.to_string())?;
    let producer =
        TopTagProducer::from_config(&config, Arc::new(registry)).map_err(|err| err.to_string())?;
    let workers = config.effective_workers();
    tracing::info!(
        feature_version = feature_version(),
        collection = %config.src,
        models = producer.registry().len(),
        workers,
        "starting run"
    );

    let input: Box<dyn BufRead> = match &options.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).map_err(|err| format!("Failed to open {}: {err}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut output: Box<dyn Write> = match &options.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .map_err(|err| format!("Failed to create {}: {err}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let summary =
        runner::run(&producer, input, &mut output, workers).map_err(|err| err.to_string())?;
    eprintln!("Scored {} jets in {} events", summary.jets, summary.events);
    Ok(())
}

fn load_config(options: &CliOptions) -> Result<TaggerConfig, String> {
    match &options.config {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--input" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--input requires a value".to_string())?;
                options.input = (value != "-").then(|| PathBuf::from(value));
            }
            "--output" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--output requires a value".to_string())?;
                options.output = (value != "-").then(|| PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
            }
            "--workers" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--workers requires a value".to_string())?;
                let workers = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --workers value: {value}"))?;
                options.workers = Some(workers);
            }
            "--diagnostics" => options.diagnostics = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "Usage: toptag [--input <events.jsonl|->] [--output <scores.jsonl|->]",
        "              [--config <config.toml>] [--workers <n>] [--diagnostics]",
        "",
        "Reads one event per line and writes one line of top-tag scores per event.",
        "Models are loaded relative to $TOPTAG_BASE, or `deploy_root` in the config.",
    ]
    .join("\n")
}
