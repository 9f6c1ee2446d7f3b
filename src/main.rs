//! CLI entry point for the mass shooting report generator.
//!
//! Provides subcommands for building a static HTML report from the MJ and
//! GVA datasets and for serving an upload page that builds it on demand.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mass_shooting_report::{
    fetch::{BasicClient, load_source},
    output::{HtmlRenderer, write_report, write_table_csv},
    parser::Dataset,
    pipeline::build_report,
    web::{self, DEFAULT_MAX_UPLOAD_BYTES, WebConfig},
};
use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "mass_shooting_report")]
#[command(about = "Build a state-by-year mass shooting report from the MJ and GVA datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download (or read) both datasets and write a static HTML report
    Generate {
        /// Mother Jones CSV: path to file or URL to fetch
        #[arg(long, value_name = "FILE_OR_URL", env = "MJ_CSV_URL", default_value = Dataset::MotherJones.default_url())]
        mj: String,

        /// Gun Violence Archive CSV: path to file or URL to fetch
        #[arg(long, value_name = "FILE_OR_URL", env = "GVA_CSV_URL", default_value = Dataset::Gva.default_url())]
        gva: String,

        /// HTML file to write the report to
        #[arg(short, long, default_value = "mass_shootings_report.html")]
        output: PathBuf,

        /// Optional: also write the state-by-year table as CSV
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
    /// Serve an upload page that builds the report from two CSV files
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Maximum request size in MiB (both files together)
        #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES / (1024 * 1024))]
        max_upload_mb: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            mj,
            gva,
            output,
            csv,
        } => {
            generate(&mj, &gva, &output, csv.as_deref()).await?;
            println!("HTML report generated: {}", output.display());
        }
        Commands::Serve {
            bind,
            max_upload_mb,
        } => {
            web::serve(WebConfig {
                bind,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
            })
            .await?;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer when dropped, so it must live
/// for the rest of `main`.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/mass_shooting_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("mass_shooting_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Loads both datasets, builds the report and writes it to `output`.
#[tracing::instrument(skip_all, fields(mj = %mj_source, gva = %gva_source, output = %output.display()))]
async fn generate(
    mj_source: &str,
    gva_source: &str,
    output: &Path,
    csv: Option<&Path>,
) -> Result<()> {
    let client = BasicClient::new()?;

    let (mj_bytes, gva_bytes) = tokio::try_join!(
        load_source(&client, mj_source),
        load_source(&client, gva_source)
    )?;

    let report = build_report(&mj_bytes, &gva_bytes)?;

    let renderer = HtmlRenderer::new()?;
    let html = renderer.render_report(&report)?;
    write_report(output, &html)?;

    if let Some(csv_path) = csv {
        write_table_csv(csv_path, &report.rows)?;
        info!(path = %csv_path.display(), "Table CSV written");
    }

    Ok(())
}
