//! scandeck service binary.
//!
//! Usage:
//!     scandeck --bind 0.0.0.0:5520 --scans-dir /var/lib/scandeck/scans

use clap::Parser;
use scandeck::{api, AppState, ServiceConfig};
use scandeck_protocol::defaults;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "scandeck",
    about = "HTTP service driving a document scanner and printer through external tools",
    version
)]
struct Args {
    /// Address to bind the HTTP API on
    #[arg(long, env = "SCANDECK_BIND", default_value = defaults::DEFAULT_BIND_ADDR)]
    bind: String,

    /// Destination directory for scanned documents
    #[arg(short = 'd', long, env = "SCANDECK_SCANS_DIR", default_value = defaults::DEFAULT_SCANS_DIR)]
    scans_dir: PathBuf,

    /// Scanner input buffer size in kilobytes
    #[arg(long, env = "SCANDECK_BUFFER_SIZE", default_value_t = defaults::DEFAULT_BUFFER_SIZE)]
    buffer_size: u32,

    /// Scan executable (scanimage-compatible)
    #[arg(long, env = "SCANDECK_SCAN_BIN", default_value = defaults::DEFAULT_SCAN_BIN)]
    scan_bin: String,

    /// Merge executable (ImageMagick convert-compatible)
    #[arg(long, env = "SCANDECK_MERGE_BIN", default_value = defaults::DEFAULT_MERGE_BIN)]
    merge_bin: String,

    /// Print executable (lp-compatible)
    #[arg(long, env = "SCANDECK_PRINT_BIN", default_value = defaults::DEFAULT_PRINT_BIN)]
    print_bin: String,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "SCANDECK_UPLOAD_LIMIT", default_value_t = defaults::DEFAULT_UPLOAD_LIMIT)]
    upload_limit: u64,

    /// Mirror the full log feed to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    scandeck_logging::init_logging("scandeck", args.verbose)?;

    let config = ServiceConfig {
        bind_addr: args.bind,
        scans_dir: args.scans_dir,
        buffer_size: args.buffer_size,
        scan_bin: args.scan_bin,
        merge_bin: args.merge_bin,
        print_bin: args.print_bin,
        upload_limit: args.upload_limit,
    };
    config.ensure_scans_dir()?;

    info!("Starting scandeck");
    info!("  Bind: {}", config.bind_addr);
    info!("  Scans dir: {}", config.scans_dir.display());
    info!("  Scan executable: {}", config.scan_bin);

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
