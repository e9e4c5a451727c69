//! voya - conversational flight-search CLI

mod config;
mod render;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use voya_api::HttpTransport;
use voya_client::{SessionController, SessionEvent};

use crate::config::Config;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// voya - conversational flight search
#[derive(Parser, Debug)]
#[command(name = "voya")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (default: http://localhost:8000/api)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Use the buffered (non-streaming) chat endpoint
    #[arg(long)]
    no_stream: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        let path = Config::init()?;
        println!("Config file created at {}", path.display());
        println!("\n{}", config::example_config());
        return Ok(());
    }

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config = Config::load();
    let base_url = args
        .base_url
        .or(config.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let timeout = Duration::from_secs(args.timeout.or(config.timeout_secs).unwrap_or(60));
    let streaming = !args.no_stream && config.stream.unwrap_or(true);

    let transport = HttpTransport::with_timeout(&base_url, timeout)?;
    let mut controller = SessionController::new(Arc::new(transport));

    // Progress phases print as they stream in.
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let SessionEvent::PhaseChange { phase, message } = event {
                render::print_phase(phase, message.as_deref());
            }
        }
    });

    println!("voya - conversational flight search ({base_url})");
    println!("Type a request, /reset to start over, /debug for diagnostics, /quit to exit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/reset" => {
                controller.reset();
                println!("Session cleared.\n");
                continue;
            }
            "/debug" => {
                render::print_debug(controller.state());
                continue;
            }
            _ => {}
        }

        // A bare number answers a pending clarification.
        let selected = controller
            .state()
            .clarify
            .as_ref()
            .and_then(|clarify| {
                let n = input.parse::<usize>().ok()?;
                clarify.options.get(n.checked_sub(1)?)
            })
            .cloned();

        let outcome = match selected {
            Some(option) => controller.select_option(&option).await,
            None if streaming => controller.send(input).await,
            None => controller.send_buffered(input).await,
        };

        // Failures are already written into the history as the error entry.
        if let Err(error) = outcome {
            tracing::debug!("turn failed: {error}");
        }
        render::print_turn_outcome(controller.state());
    }

    Ok(())
}
