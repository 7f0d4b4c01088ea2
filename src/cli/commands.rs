use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use http::{HeaderName, Method};
use serde::Serialize;

use crate::config::AppConfig;
use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse, HeaderVec};
use crate::middleware::{CorsAction, CorsMiddleware, TracingMiddleware};

#[derive(Parser)]
#[command(name = "corsgate")]
#[command(about = "Inspect and exercise a CORS policy", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, normalize and print the policy as JSON
    Policy {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run one request through the policy and print the outcome as JSON
    Check {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long, default_value = "GET")]
        method: String,

        #[arg(long, default_value = "/")]
        path: String,

        /// Request header as "Name: value"; repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

#[derive(Serialize)]
struct CheckReport {
    decision: CorsAction,
    forwarded: bool,
    response: HandlerResponse,
}

fn load_middleware(config: &Path) -> anyhow::Result<CorsMiddleware> {
    let app = AppConfig::load(config)
        .with_context(|| format!("loading {}", config.display()))?;
    Ok(CorsMiddleware::new(&app.cors)?)
}

fn parse_header(raw: &str) -> anyhow::Result<(Arc<str>, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header '{}' must look like 'Name: value'", raw))?;
    let name = name.trim();
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| anyhow!("header '{}' has an invalid name '{}'", raw, name))?;
    Ok((Arc::from(name), value.trim().to_string()))
}

/// Execute a parsed command, writing JSON to `out`
pub fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    match cli.command {
        Commands::Policy { config } => {
            let cors = load_middleware(&config)?;
            serde_json::to_writer_pretty(&mut *out, cors.policy())?;
            writeln!(out)?;
        }
        Commands::Check {
            config,
            method,
            path,
            headers,
        } => {
            let cors = load_middleware(&config)?;
            let method = Method::from_bytes(method.as_bytes())
                .with_context(|| format!("invalid method '{}'", method))?;
            let headers = headers
                .iter()
                .map(|h| parse_header(h))
                .collect::<anyhow::Result<HeaderVec>>()?;
            let request = HandlerRequest::new(method, path, headers);

            let forwarded = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&forwarded);
            let handler = move |_: &HandlerRequest| {
                flag.store(true, Ordering::SeqCst);
                HandlerResponse::empty(200)
            };

            let decision = cors.policy().evaluate(&request).action;
            let mut dispatcher = Dispatcher::new(Arc::new(handler));
            dispatcher.add_middleware(Arc::new(TracingMiddleware));
            dispatcher.add_middleware(Arc::new(cors));
            let response = dispatcher.dispatch(&request);

            let report = CheckReport {
                decision,
                forwarded: forwarded.load(Ordering::SeqCst),
                response,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Parse `std::env::args` and run against stdout
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    run(cli, &mut lock)
}
