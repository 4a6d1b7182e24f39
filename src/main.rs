use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use retail_seed::{export, verify, EmitOptions, TransformConfig};
use std::{fs, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "retail-seed")]
#[command(about = "Turn a UCI retail transaction log into catalog, orders and order item seed files")]
struct Cli {
    /// Retail transaction log
    #[arg(short, long, default_value = "retail.csv", global = true)]
    input: PathBuf,

    /// Directory the seed files are written to (and read from by `verify`)
    #[arg(short, long, default_value = ".", global = true)]
    out_dir: PathBuf,

    /// YAML file overriding transformation constants
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transform the log and write the seed tables (default)
    Transform(TransformArgs),
    /// Check seed tables already on disk
    Verify,
}

#[derive(Args, Debug, Default)]
struct TransformArgs {
    /// Also write batched SQL insert scripts
    #[arg(long)]
    sql: bool,

    /// Also write Parquet copies of the tables
    #[arg(long)]
    parquet: bool,

    /// Write per-stage row counts as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let cli = Cli::parse();

    // ─── 2) resolve config ───────────────────────────────────────────
    let cfg = match &cli.config {
        Some(path) => TransformConfig::from_yaml_file(path)?,
        None => TransformConfig::default(),
    };

    match cli.command.unwrap_or_else(|| Command::Transform(TransformArgs::default())) {
        Command::Transform(args) => {
            let start = Instant::now();
            let emit = EmitOptions {
                sql: args.sql,
                parquet: args.parquet,
            };
            let (_, counts) = retail_seed::run(&cli.input, &cli.out_dir, &cfg, emit)?;

            if let Some(path) = args.summary {
                let json = serde_json::to_string_pretty(&counts)?;
                fs::write(&path, json)
                    .with_context(|| format!("Failed to write summary {}", path.display()))?;
                info!("wrote summary {}", path.display());
            }
            info!(elapsed = ?start.elapsed(), "all done");
        }
        Command::Verify => {
            let tables = export::load_tables(&cli.out_dir)?;
            let report = verify::verify_tables(&tables, &cfg);
            println!("{}", serde_json::to_string_pretty(&report)?);
            report.ensure_ok()?;
        }
    }
    Ok(())
}
