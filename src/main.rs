use anyhow::{bail, Context, Result};
use churnflow::{
    column_label, Config, FileSink, PipelineController, RunOutcome, TracingObserver, UploadedFile,
};
use std::{env, path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "usage: churnflow <customers.csv> [--export <dir>] [--json]";

/// Rows printed in the results table; the rest are only counted.
const TABLE_ROWS: usize = 20;

struct Args {
    input: PathBuf,
    export_dir: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut export_dir = None;
    let mut json = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--export" => {
                let dir = args.next().context("--export needs a directory")?;
                export_dir = Some(PathBuf::from(dir));
            }
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if input.is_none() => input = Some(PathBuf::from(other)),
            other => bail!("unexpected argument {other:?}\n{USAGE}"),
        }
    }

    Ok(Args {
        input: input.context(USAGE)?,
        export_dir,
        json,
    })
}

fn config_from_env() -> Result<Config> {
    let mut config = match env::var("CHURNFLOW_BASE_URL") {
        Ok(url) => Config::with_base_url(&url)?,
        Err(_) => Config::default(),
    };
    if let Ok(secs) = env::var("CHURNFLOW_TIMEOUT_SECS") {
        let secs: u64 = secs
            .parse()
            .with_context(|| format!("CHURNFLOW_TIMEOUT_SECS={secs:?} is not a number"))?;
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) configure ────────────────────────────────────────────────
    let args = parse_args()?;
    let config = config_from_env()?;
    info!(base_url = %config.base_url, timeout = ?config.request_timeout, "startup");

    let export_dir = args
        .export_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let controller = PipelineController::new(
        &config,
        Arc::new(FileSink::new(export_dir)),
        Arc::new(TracingObserver),
    )?;

    // ─── 3) run the pipeline ─────────────────────────────────────────
    let file = UploadedFile::from_path(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?;

    let summary = match controller.file_selected(file).await {
        RunOutcome::Completed(summary) => summary,
        RunOutcome::Failed(e) => return Err(e).context("pipeline run failed"),
        RunOutcome::Rejected => bail!("a run is already in progress"),
    };

    // ─── 4) show results ─────────────────────────────────────────────
    let predictions = controller.predictions();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Analyzed {} customer records", predictions.len());
        if let Some(at) = predictions.received_at() {
            println!("Scored at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        if summary.is_empty() {
            println!("No data");
        } else {
            println!(
                "Customers at risk: {} ({:.1}%)",
                summary.churn_count, summary.churn_pct
            );
            println!(
                "Likely to stay:    {} ({:.1}%)",
                summary.no_churn_count, summary.no_churn_pct
            );
        }

        let columns = predictions.columns();
        if !columns.is_empty() {
            let mut header: Vec<String> = columns.iter().map(|c| column_label(c)).collect();
            header.push("PREDICTION".to_string());
            println!("\n{}", header.join("\t"));
            for record in predictions.iter().take(TABLE_ROWS) {
                let mut cells: Vec<String> = columns
                    .iter()
                    .map(|c| match record.get(c) {
                        Some(serde_json::Value::String(s)) => s.clone(),
                        Some(v) => v.to_string(),
                        None => String::new(),
                    })
                    .collect();
                cells.push(record.prediction().label().to_string());
                println!("{}", cells.join("\t"));
            }
            if predictions.len() > TABLE_ROWS {
                println!("... {} more", predictions.len() - TABLE_ROWS);
            }
        }
    }

    // ─── 5) optional export ──────────────────────────────────────────
    if args.export_dir.is_some() {
        let delivered = controller
            .request_export()
            .await
            .context("export failed")?;
        if let Some(path) = delivered.location {
            info!(path = %path.display(), bytes = delivered.size_bytes, "export saved");
        }
    }

    Ok(())
}
