//! Auth Chain Demo
//!
//! Runs a handful of requests through a middleware chain that logs,
//! authenticates, loads data concurrently and renders a response. Each token
//! on the command line becomes one request.
//!
//! ```text
//! log_start ─▶ caught ─▶ fork(audit) ─▶ authenticate ─▶ optional(admin_notice)
//!           ─▶ concurrency[load_profile, load_quota] ─▶ tap(record_metrics)
//!           ─▶ lazy(handle)
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package auth-chain -- valid admin bad boom
//! cargo run --package auth-chain -- --config strata.toml valid
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use parking_lot::Mutex;
use strata::prelude::*;
use strata::runtime::config::load_config_from_file;
use tracing::{debug, info, warn};

const USERS: &[(&str, &str)] = &[("valid", "alice"), ("admin", "root"), ("boom", "mallory")];

#[derive(Parser)]
#[command(about = "Send requests through a Strata middleware chain")]
struct Args {
    /// Configuration file to load instead of searching the default locations.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tokens to send, one request per token.
    #[arg(default_values = ["valid", "admin", "bad", "boom"])]
    tokens: Vec<String>,
}

#[derive(Debug, Clone)]
struct Response {
    status: u16,
    body: String,
}

struct Request {
    id: usize,
    token: String,
    user: Mutex<Option<String>>,
    profile: Mutex<Option<String>>,
    quota: Mutex<Option<u32>>,
    response: Mutex<Option<Response>>,
}

impl Request {
    fn new(id: usize, token: String) -> Arc<Self> {
        Arc::new(Self {
            id,
            token,
            user: Mutex::new(None),
            profile: Mutex::new(None),
            quota: Mutex::new(None),
            response: Mutex::new(None),
        })
    }

    fn user(&self) -> Option<String> {
        self.user.lock().clone()
    }

    fn is_admin(&self) -> bool {
        self.user().as_deref() == Some("root")
    }

    fn respond(&self, status: u16, body: impl Into<String>) {
        *self.response.lock() = Some(Response {
            status,
            body: body.into(),
        });
    }
}

// ============================================================================
// Middleware
// ============================================================================

async fn log_start(req: Arc<Request>, next: Next) -> ChainResult {
    let started = Instant::now();
    info!(id = req.id, "request started");

    let result = next.run().await;

    info!(id = req.id, elapsed = ?started.elapsed(), "request finished");
    result
}

async fn render_error(req: Arc<Request>, error: ChainError) -> ChainResult {
    warn!(id = req.id, %error, "request failed");
    req.respond(500, format!("internal error: {error}"));
    Ok(())
}

async fn audit(req: Arc<Request>, _next: Next) -> ChainResult {
    tokio::time::sleep(Duration::from_millis(5)).await;
    info!(id = req.id, token = %req.token, "audit record written");
    Ok(())
}

async fn authenticate(req: Arc<Request>, next: Next) -> ChainResult {
    match USERS.iter().find(|(token, _)| *token == req.token) {
        Some((_, user)) => {
            *req.user.lock() = Some((*user).to_string());
            next.run().await
        }
        None => {
            req.respond(401, "invalid token");
            Ok(())
        }
    }
}

async fn admin_notice(req: Arc<Request>, next: Next) -> ChainResult {
    info!(id = req.id, "admin session");
    next.run().await
}

async fn load_profile(req: Arc<Request>, next: Next) -> ChainResult {
    tokio::time::sleep(Duration::from_millis(20)).await;
    let user = req.user().unwrap_or_default();
    *req.profile.lock() = Some(format!("{user}@example.com"));
    next.run().await
}

async fn load_quota(req: Arc<Request>, next: Next) -> ChainResult {
    tokio::time::sleep(Duration::from_millis(10)).await;
    *req.quota.lock() = Some(if req.is_admin() { u32::MAX } else { 100 });
    next.run().await
}

async fn record_metrics(req: Arc<Request>, _next: Next) -> ChainResult {
    debug!(id = req.id, user = ?req.user(), "authenticated request");
    Ok(())
}

async fn handle(req: Arc<Request>, next: Next) -> ChainResult {
    let user = req.user().unwrap_or_default();
    if user == "mallory" {
        return Err(ChainError::msg(format!("refusing to serve {user}")));
    }

    let profile = req.profile.lock().clone().unwrap_or_default();
    let quota = req.quota.lock().unwrap_or_default();
    req.respond(200, format!("hello {user} <{profile}>, quota {quota}"));
    next.run().await
}

fn build_chain() -> Middleware<Request> {
    ChainBuilder::new()
        .named("log_start", log_start)
        .caught(render_error)
        .fork(audit)
        .named("authenticate", authenticate)
        .optional(Condition::when(Request::is_admin), admin_notice)
        .concurrency([
            Middleware::from_fn(load_profile).with_name("load_profile"),
            Middleware::from_fn(load_quota).with_name("load_quota"),
        ])
        .tap(record_metrics)
        .lazy(|_req: Arc<Request>| async {
            info!("resolving request handler");
            Ok(Middleware::from_fn(handle).with_name("handle"))
        })
        .compose()
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from_file(path)?,
        None => load_config()?,
    };
    init_from_config(&config.logging);

    let chain = build_chain();

    for (id, token) in args.tokens.into_iter().enumerate() {
        let req = Request::new(id, token);
        chain.invoke(Arc::clone(&req)).await?;

        match req.response.lock().clone() {
            Some(Response { status, body }) => info!(id, status, %body, "response"),
            None => warn!(id, "chain finished without a response"),
        }
    }

    // Give forked audit tasks a moment to finish before the runtime shuts down.
    tokio::time::sleep(Duration::from_millis(20)).await;

    Ok(())
}
