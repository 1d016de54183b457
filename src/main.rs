use anyhow::{Context, Result};
use clap::Parser;
use rootfinder::analysis::{analyze_with, AnalysisRequest};
use rootfinder::classify::per_file_verdicts;
use rootfinder::cli::{Cli, OutputFormat};
use rootfinder::config::AnalysisConfig;
use rootfinder::ingest::load_collection;
use rootfinder::json_output::{self, JsonOutput};
use rootfinder::log::retain_callee_all;
use rootfinder::predicate::{Predicate, PredicateType};
use rootfinder::record::FormatVersion;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` forces TRACE, otherwise RUST_LOG or warn
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (or defaults) with command-line overrides applied
fn resolve_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_toml(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(version) = &cli.format_version {
        config.format_version = version.parse::<FormatVersion>()?;
    }
    if let Some(selection) = cli.selection {
        config.selection = selection.into();
    }
    if let Some(method) = &cli.method_name {
        config.method_name = Some(method.clone());
    }
    if cli.sequential {
        config.parallel = false;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Bad predicates fail before any file is read
    let predicate_type: PredicateType = cli.predicate_type.parse()?;
    let predicate = Predicate::from_args(predicate_type, &cli.predicate_values)?;
    let config = resolve_config(&cli)?;

    let mut passing = load_collection(&cli.passing_dir, &config, true)
        .context("Failed to load passing traces")?;
    let mut failing = load_collection(&cli.failing_dir, &config, false)
        .context("Failed to load failing traces")?;

    if let Some(keyword) = &cli.keyword {
        passing = retain_callee_all(&passing, keyword);
        failing = retain_callee_all(&failing, keyword);
        tracing::info!(
            "keyword '{}' kept {} passing and {} failing logs",
            keyword,
            passing.len(),
            failing.len()
        );
    }

    let request = AnalysisRequest {
        passing,
        failing,
        predicate_type,
        predicate_args: cli.predicate_values.clone(),
        output_dir: cli.output_dir.clone(),
    };
    let outcome = analyze_with(&request, config.parallel)?;
    json_output::write_outcome(&outcome, &request.output_dir)?;

    if cli.per_file {
        if let Predicate::Slow = predicate {
            tracing::warn!("per-file verdicts are not available for Slow");
        } else {
            let mut listing = per_file_verdicts(&request.passing, &predicate)?;
            listing.extend(per_file_verdicts(&request.failing, &predicate)?);
            json_output::write_per_file_verdicts(&listing, &request.output_dir)?;
        }
    }

    match cli.format {
        OutputFormat::Text => {
            print!("{}", outcome.report.to_report_string());
            if let Some(diagnostic) = &outcome.diagnostic {
                eprintln!("rootfinder: {}", diagnostic);
            }
        }
        OutputFormat::Json => println!("{}", JsonOutput::new(&outcome).to_json()?),
    }

    Ok(())
}
