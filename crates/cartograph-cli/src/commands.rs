//! Command handlers for CLI subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use cartograph_client::{AnalysisClient, ReplaySource, ScanRequest, ScanSource};
use cartograph_core::{
    export_file_name, write_export, CartographConfig, ExportDocument, ExportFormat,
};
use cartograph_models::{Generation, ReportKind};
use cartograph_runtime::{Cartographer, RevealFrame, RuntimeConfig, ScanOutcome};

use crate::cli::{Commands, ScanArgs};
use crate::output::{self, LiveOutput, NO_DATA};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Chunk size used when replaying a captured stream.
const REPLAY_CHUNK_SIZE: usize = 512;

/// Execute a CLI command.
pub async fn execute(command: Commands, config: CartographConfig) -> Result<()> {
    match command {
        Commands::Analyze {
            target,
            scan,
            export,
            output,
            no_reveal,
        } => {
            let export = export.map(|format| (ExportFormat::from(format), output));
            cmd_analyze(&config, &target, &scan, export, !no_reveal).await
        }
        Commands::Ask {
            target,
            question,
            scan,
        } => {
            let config = apply_scan_args(config, &scan);
            let request = ScanRequest::query(&target, question, &config);
            cmd_report(&config, request, &scan).await
        }
        Commands::Report { kind, target, scan } => {
            let config = apply_scan_args(config, &scan);
            let request = ScanRequest::new(ReportKind::from(kind), &target, &config);
            cmd_report(&config, request, &scan).await
        }
        Commands::Preview { target, scan } => cmd_preview(&config, &target, &scan).await,
        Commands::Health => cmd_health(&config).await,
    }
}

/// Applies per-command scan limits over the loaded configuration.
pub fn apply_scan_args(mut config: CartographConfig, scan: &ScanArgs) -> CartographConfig {
    if let Some(max_files) = scan.max_files {
        config = config.with_max_files(max_files);
    }
    if let Some(depth) = scan.depth {
        config = config.with_depth(depth);
    }
    if scan.include_tests {
        config = config.with_include_tests(true);
    }
    config
}

/// Picks the service client, or a replayed capture when one is given.
fn scan_source(config: &CartographConfig, replay: Option<&Path>) -> Result<Arc<dyn ScanSource>> {
    match replay {
        Some(path) => {
            info!(path = %path.display(), "replaying captured stream");
            let source = ReplaySource::from_file(path, REPLAY_CHUNK_SIZE)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            Ok(Arc::new(source))
        }
        None => Ok(Arc::new(AnalysisClient::from_config(config))),
    }
}

async fn run_scan(
    cartographer: &Cartographer,
    request: ScanRequest,
) -> Result<ScanOutcome> {
    let mut live = LiveOutput::new();
    let result = cartographer.scan(request, &mut live).await;
    live.finish_line();
    Ok(result?)
}

async fn cmd_analyze(
    config: &CartographConfig,
    target: &str,
    scan: &ScanArgs,
    export: Option<(ExportFormat, Option<PathBuf>)>,
    reveal: bool,
) -> Result<()> {
    let config = apply_scan_args(config.clone(), scan);
    let source = scan_source(&config, scan.replay.as_deref())?;
    let mut cartographer = Cartographer::new(source, RuntimeConfig::from_config(&config));
    let frames = cartographer.subscribe()?;

    let request = ScanRequest::new(ReportKind::Architecture, target, &config);
    let outcome = run_scan(&cartographer, request).await?;

    if outcome.is_empty() {
        println!("{}", NO_DATA);
        cartographer.shutdown().await?;
        return Ok(());
    }

    if reveal {
        follow_reveal(frames, outcome.generation).await?;
    }
    println!("{}", output::render_report(&outcome.report));

    if let Some((format, path)) = export {
        let path = export_outcome(&config, &outcome, target, format, path)?;
        println!("\nExported to {}", path.display());
    }

    cartographer.shutdown().await?;
    Ok(())
}

/// Prints a progress line per reveal tick until the graph is complete.
async fn follow_reveal(
    mut frames: watch::Receiver<RevealFrame>,
    generation: Generation,
) -> Result<()> {
    loop {
        if frames.changed().await.is_err() {
            warn!("reveal stopped before completing");
            return Ok(());
        }
        let frame = frames.borrow_and_update().clone();
        if frame.generation != generation {
            continue;
        }
        output::print_progress(&frame)?;
        if frame.is_complete() {
            debug!(nodes = frame.total_nodes, "reveal complete");
            return Ok(());
        }
    }
}

fn export_outcome(
    config: &CartographConfig,
    outcome: &ScanOutcome,
    target: &str,
    format: ExportFormat,
    path: Option<PathBuf>,
) -> Result<PathBuf> {
    let reconciliation = outcome
        .report
        .reconciliation()
        .ok_or("Only architecture scans can be exported")?;

    let document = ExportDocument::new(
        &reconciliation.graph,
        reconciliation.architecture.clone(),
        outcome.metadata.clone(),
    );
    let contents = document.render(format)?;

    let path = path.unwrap_or_else(|| {
        let name = export_name(outcome, target);
        config.export_path(&export_file_name(&name, format, Utc::now()))
    });
    Ok(write_export(&path, &contents)?)
}

/// Repository name for export files: scanner metadata, else the target's
/// last path segment.
pub fn export_name(outcome: &ScanOutcome, target: &str) -> String {
    outcome
        .metadata
        .as_ref()
        .map(|metadata| metadata.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            target
                .trim_end_matches(['/', '\\'])
                .rsplit(['/', '\\', ':'])
                .next()
                .unwrap_or_default()
                .trim_end_matches(".git")
                .to_string()
        })
}

async fn cmd_report(config: &CartographConfig, request: ScanRequest, scan: &ScanArgs) -> Result<()> {
    let source = scan_source(config, scan.replay.as_deref())?;
    let mut cartographer = Cartographer::new(source, RuntimeConfig::from_config(config));

    let outcome = run_scan(&cartographer, request).await?;
    println!("{}", output::render_report(&outcome.report));

    cartographer.shutdown().await?;
    Ok(())
}

async fn cmd_preview(config: &CartographConfig, target: &str, scan: &ScanArgs) -> Result<()> {
    let config = apply_scan_args(config.clone(), scan);
    let client = AnalysisClient::from_config(&config);
    let request = ScanRequest::new(ReportKind::Architecture, target, &config);

    let preview = client.preview(&request).await?;
    if preview.files.is_empty() {
        println!("{}", NO_DATA);
        return Ok(());
    }
    println!("{}", output::render_preview(&preview));
    Ok(())
}

async fn cmd_health(config: &CartographConfig) -> Result<()> {
    let client = AnalysisClient::from_config(config);
    let health = client.health().await?;
    println!("{}", output::render_health(&health));
    if !health.is_online() {
        return Err(format!("Service at {} is not online", client.base()).into());
    }
    Ok(())
}
