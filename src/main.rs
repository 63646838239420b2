use clap::Parser;
use snowdax::{config, server};

#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// SnowDAX - DAX to Snowflake SQL translation service
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address the HTTP listener binds to
    #[arg(long, default_value = "0.0.0.0")]
    http_host: String,

    /// Port the HTTP listener binds to
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Disable LLM enhancement of low-confidence translations
    #[arg(long)]
    no_llm: bool,

    /// Wire up the Snowflake Cortex client at startup
    #[arg(long)]
    cortex: bool,

    /// Cortex model name
    #[arg(long, default_value = "mistral-large")]
    cortex_model: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, default_value_t = 2 * 1024 * 1024)]
    body_limit_bytes: usize,
}

impl From<Cli> for config::CliConfig {
    fn from(cli: Cli) -> Self {
        config::CliConfig {
            http_host: cli.http_host,
            http_port: cli.http_port,
            use_llm: !cli.no_llm,
            cortex_enabled: cli.cortex,
            cortex_model: cli.cortex_model,
            request_timeout_secs: cli.request_timeout_secs,
            body_limit_bytes: cli.body_limit_bytes,
        }
    }
}

#[tokio::main]
async fn main() {
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    println!("\nSnowDAX v{}\n", env!("CARGO_PKG_VERSION"));

    let cli_config: config::CliConfig = cli.into();
    let config = match config::ServerConfig::from_cli(cli_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    server::run_with_config(config).await;
}
