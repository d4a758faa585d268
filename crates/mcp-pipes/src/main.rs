//! mcp-pipes: demo providers and the clients that drive them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mcp_pipes::config::{load_config, resolve_provider_exe};
use mcp_pipes::demos::{DemoContext, Launch};
use mcp_pipes::providers::{self, ProviderKind};
use mcp_pipes::types::{CapabilityKind, InitializeResult, ServerCapabilities, MCP_VERSION};
use mcp_pipes_tools::report::DEFAULT_REPORT_NAME;

#[derive(Parser)]
#[command(
    name = "mcp-pipes",
    about = "MCP providers and clients over process pipes",
    version
)]
struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one provider over stdio.
    Serve {
        #[arg(value_enum)]
        provider: ProviderKind,
    },

    /// Print a provider's capabilities as JSON.
    Info {
        #[arg(value_enum)]
        provider: ProviderKind,
    },

    /// List prompts and render `greet-user`.
    Prompts,

    /// List resources and read `resource://hello`.
    Resources,

    /// Use server A and server B concurrently.
    Multi,

    /// Build a PDF report from the report provider's resources.
    Report {
        /// Output PDF path (default: `<output_dir>/report.pdf`).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render a certificate through the certificate provider.
    Certificate {
        #[arg(long, default_value = "Alice Johnson")]
        name: String,

        #[arg(long, default_value = "Data Science")]
        course: String,

        #[arg(long, default_value = "21-Aug-2025")]
        date: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for protocol traffic
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    if let Commands::Serve { provider } = &cli.command {
        providers::serve(*provider, &config.assets).await?;
        return Ok(());
    }
    if let Commands::Info { provider } = &cli.command {
        let registry = providers::build_registry(*provider, &config.assets);
        let result = InitializeResult::new(
            provider.server_info(),
            ServerCapabilities::for_kinds(&registry.kinds()),
        );
        let mut info = serde_json::json!({
            "server": result.server_info,
            "protocol_version": MCP_VERSION,
            "capabilities": result.capabilities,
        });
        for kind in CapabilityKind::ALL {
            let names: Vec<String> = registry
                .list(kind)
                .into_iter()
                .map(|d| d.identifier)
                .collect();
            info[kind.list_key()] = serde_json::json!(names);
        }
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let exe = resolve_provider_exe(None)?;
    let assets = config.assets.clone();
    let ctx = DemoContext::new(Launch::Spawn(exe), config);
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Prompts => ctx.run_prompts(&mut stdout).await?,
        Commands::Resources => ctx.run_resources(&mut stdout).await?,
        Commands::Multi => ctx.run_multi(&mut stdout).await?,
        Commands::Report { out } => {
            let out = out.unwrap_or_else(|| assets.output_dir.join(DEFAULT_REPORT_NAME));
            ctx.run_report(&out, &mut stdout).await?;
        }
        Commands::Certificate { name, course, date } => {
            ctx.run_certificate(&name, &course, &date, &mut stdout)
                .await?;
        }
        Commands::Serve { .. } | Commands::Info { .. } => {}
    }

    Ok(())
}
