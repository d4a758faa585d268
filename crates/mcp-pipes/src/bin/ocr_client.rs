//! Run OCR on an image through the OCR provider.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use mcp_pipes::config::{load_config, resolve_provider_exe, PROVIDER_EXE_ENV};
use mcp_pipes::demos::{output_path, DemoContext, Launch};

#[derive(Parser)]
#[command(
    name = "ocr_client",
    about = "Run OCR on an image using the local MCP provider",
    version
)]
struct Cli {
    /// Path to the image file to OCR.
    image_path: PathBuf,

    /// Save the extracted text here. A directory receives `<stem>_ocr.txt`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Executable serving the OCR provider.
    #[arg(long, env = PROVIDER_EXE_ENV)]
    provider: Option<PathBuf>,

    /// Configuration file path.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !cli.image_path.exists() {
        println!("Error: Image file '{}' not found!", cli.image_path.display());
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!(" Error processing image: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let exe = resolve_provider_exe(cli.provider.as_deref())?;
    let ctx = DemoContext::new(Launch::Spawn(exe), config);

    println!(" Processing image: {}", cli.image_path.display());
    let text = ctx.extract_text(&cli.image_path).await?;

    let rule = "=".repeat(50);
    println!("\n OCR Results:\n{rule}\n{text}\n{rule}");

    if let Some(out) = &cli.out {
        let saved = save(out, &cli.image_path, &text)?;
        println!(" Saved OCR text to: {}", saved.display());
    }
    Ok(())
}

fn save(out: &Path, image: &Path, text: &str) -> anyhow::Result<PathBuf> {
    let path = output_path(out, image);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    std::fs::write(&path, text).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}
