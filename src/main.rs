use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf, sync::Arc};
use tickerboard::{
    config::{Config, OverlapPolicy, ENV_CONFIG},
    fetch::HttpTransport,
    surface::HtmlDirectory,
    SubmissionController,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Look up ticker symbols and render the dashboard tables as HTML.
#[derive(Parser, Debug)]
#[command(name = "tickerboard", version)]
struct Cli {
    /// YAML config file.
    #[arg(long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Endpoint base URL.
    #[arg(long)]
    endpoint: Option<String>,

    /// Directory for the rendered surfaces and index.html.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Let a newer symbol replace one still in flight instead of ignoring it.
    /// Stdin lines are then looked up concurrently rather than in turn.
    #[arg(long)]
    supersede: bool,

    /// Symbols to submit in order; read from stdin, one per line, when empty.
    symbols: Vec<String>,
}

type Controller = SubmissionController<HttpTransport, HtmlDirectory>;

/// Next non-blank line, trimmed.
async fn next_symbol<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<Option<String>> {
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let symbol = line.trim();
        if !symbol.is_empty() {
            return Ok(Some(symbol.to_string()));
        }
    }
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tickerboard=info"))
        .add_directive(log_level.parse().unwrap_or(Level::INFO.into()));
    fmt().with_env_filter(filter).with_target(false).init();

    // ─── 2) config: file → env → flags ───────────────────────────────
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(out) = cli.out {
        config.out_dir = out;
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }
    if cli.supersede {
        config.overlap = OverlapPolicy::SupersedePrevious;
    }
    info!(endpoint = %config.endpoint, out = %config.out_dir.display(), "startup");

    // ─── 3) wire transport + surfaces ────────────────────────────────
    let transport = HttpTransport::new(&config.endpoint, config.timeout())?;
    let surfaces = HtmlDirectory::new(&config.out_dir)?;
    let controller: Arc<Controller> =
        Arc::new(SubmissionController::new(transport, surfaces, &config));

    // ─── 4) submit ───────────────────────────────────────────────────
    if !cli.symbols.is_empty() {
        for (symbol, outcome) in controller.submit_all(&cli.symbols).await {
            println!("{}\t{}", symbol, outcome);
        }
    } else if config.overlap == OverlapPolicy::SupersedePrevious {
        // lines race each other; only the newest lookup still running commits
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut handles = Vec::new();
        while let Some(symbol) = next_symbol(&mut lines).await? {
            let controller = Arc::clone(&controller);
            handles.push(tokio::spawn(async move {
                let outcome = controller.submit(&symbol).await;
                println!("{}\t{}", symbol, outcome);
            }));
        }
        for h in handles {
            if let Err(e) = h.await {
                error!(error = %e, "lookup task failed");
            }
        }
    } else {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(symbol) = next_symbol(&mut lines).await? {
            let outcome = controller.submit(&symbol).await;
            println!("{}\t{}", symbol, outcome);
        }
    }

    info!(page = %controller.target().index_path().display(), "all done");
    Ok(())
}
