//! Route monitor entry point.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use route_monitor::api::{create_router, AppState};
use route_monitor::config::Config;
use route_monitor::metrics;
use route_monitor::resolver::{BaseUrlResolver, OpenShiftClient};
use route_monitor::source::{ContrastClient, RouteSource};
use route_monitor::utils::shutdown_signal;
use route_monitor::verify::{VerificationOrchestrator, VerificationReport, VerificationRequest};
use route_monitor::VerifyError;

/// Post-deployment GET route verification.
#[derive(Parser, Debug)]
#[command(name = "route-monitor")]
#[command(about = "Verify that a deployed service's GET routes answer successfully")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port for the API.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// HTTP server port for the API.
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Run one verification and print the report.
    Verify {
        /// Service name known to Contrast.
        #[arg(short, long)]
        service: String,

        /// Build number being verified.
        #[arg(short, long)]
        build: String,

        /// Base URL to test against; resolved through OpenShift when omitted.
        #[arg(long)]
        base_url: Option<String>,

        /// Target environment label.
        #[arg(short, long, default_value = "qa")]
        environment: String,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Check connectivity to Contrast and OpenShift.
    TestConnection,

    /// Resolve a service's base URL through OpenShift.
    ResolveRoute {
        /// Service name.
        #[arg(short, long)]
        service: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("route_monitor=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        Some(Command::Verify {
            service,
            build,
            base_url,
            environment,
            json,
        }) => cmd_verify(service, build, base_url, environment, json).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::TestConnection) => cmd_test_connection().await,
        Some(Command::ResolveRoute { service }) => cmd_resolve_route(service).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Build the OpenShift resolver when configured.
fn build_resolver(config: &Config) -> anyhow::Result<Option<Arc<dyn BaseUrlResolver>>> {
    match OpenShiftClient::from_config(config) {
        Some(client) => {
            let resolver: Arc<dyn BaseUrlResolver> = Arc::new(client?);
            Ok(Some(resolver))
        }
        None => Ok(None),
    }
}

/// Serve the HTTP API until shutdown.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<ExitCode> {
    info!("Loading configuration...");
    let config = load_config()?;
    let port = port_override.unwrap_or(config.port);

    info!("Configuration loaded successfully");
    info!("Max concurrent probes: {}", config.max_concurrent);
    info!("Route timeout: {} ms", config.route_timeout_ms);

    let source: Arc<dyn RouteSource> = Arc::new(ContrastClient::new(&config)?);
    let resolver = build_resolver(&config)?;
    if resolver.is_none() {
        warn!("OpenShift is not configured; base URL lookups are disabled");
    }

    let orchestrator = VerificationOrchestrator::from_config(&config, Arc::clone(&source))?;
    let mut state = AppState::new(orchestrator, source, resolver);

    if config.metrics_enabled {
        let handle = metrics::install_prometheus()?;
        state = state.with_metrics(handle);
        info!("Prometheus metrics enabled");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(ExitCode::SUCCESS)
}

/// Run a single verification from the command line.
async fn cmd_verify(
    service: String,
    build: String,
    base_url: Option<String>,
    environment: String,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let config = load_config()?;

    let base_url = match base_url {
        Some(url) => url,
        None => {
            let resolver = build_resolver(&config)?.ok_or_else(|| {
                anyhow::anyhow!("--base-url is required when OpenShift is not configured")
            })?;
            resolver
                .route_url(&service)
                .await
                .ok_or_else(|| anyhow::anyhow!("Route not found for service: {}", service))?
        }
    };

    let source: Arc<dyn RouteSource> = Arc::new(ContrastClient::new(&config)?);
    let orchestrator = VerificationOrchestrator::from_config(&config, source)?;

    let request = VerificationRequest {
        environment,
        ..VerificationRequest::new(service, build, base_url)
    };

    let report = match orchestrator.execute(&request).await {
        Ok(report) => report,
        Err(VerifyError::UpstreamUnavailable(reason)) => {
            eprintln!("Route source unavailable: {}", reason);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &VerificationReport) {
    println!("======================================================================");
    println!(
        "ROUTE VERIFICATION - {} (build {})",
        report.service_name, report.build_number
    );
    println!("======================================================================");

    for outcome in &report.results {
        let mark = if outcome.success { "PASS" } else { "FAIL" };
        println!(
            "  [{}] {:>3} {:<24} {:>6} ms  {}",
            mark, outcome.status_code, outcome.status_message, outcome.response_time_ms, outcome.route
        );
        if let Some(err) = &outcome.error_message {
            println!("         {}", err);
        }
    }

    println!("----------------------------------------------------------------------");
    println!("  Total:    {}", report.total_routes);
    println!("  Passed:   {}", report.passed_routes);
    println!("  Failed:   {}", report.failed_routes);
    println!("  Duration: {} ms", report.total_duration_ms);
    println!("======================================================================");
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<ExitCode> {
    println!("======================================================================");
    println!("ROUTE MONITOR - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Contrast API: {}", config.contrast_api_url);
    println!("  Organization: {}", config.contrast_organization_id);
    match &config.openshift_api_url {
        Some(url) if config.has_openshift() => println!(
            "  OpenShift: {} (namespace {}, timeout {} ms)",
            url,
            config.openshift_namespace.as_deref().unwrap_or_default(),
            config.openshift_timeout_ms
        ),
        _ => println!("  OpenShift: not configured"),
    }
    println!("  Route Timeout: {} ms", config.route_timeout_ms);
    println!("  Max Concurrent: {}", config.max_concurrent);
    println!("  Retry Attempts: {} (not applied)", config.retry_attempts);
    println!("  Stable Result Order: {}", config.stable_result_order);
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(ExitCode::SUCCESS)
}

/// Check connectivity to the route source and resolver.
async fn cmd_test_connection() -> anyhow::Result<ExitCode> {
    let config = load_config()?;
    let mut healthy = true;

    print!("Contrast Security ({})... ", config.contrast_api_url);
    let contrast = ContrastClient::new(&config)?;
    match contrast.check_connection().await {
        Ok(()) => println!("OK"),
        Err(e) => {
            healthy = false;
            println!("FAILED");
            println!("  Error: {}", e);
        }
    }

    match OpenShiftClient::from_config(&config) {
        Some(client) => {
            let client = client?;
            print!("OpenShift (namespace {})... ", client.namespace());
            match client.check_connection().await {
                Ok(()) => println!("OK"),
                Err(e) => {
                    healthy = false;
                    println!("FAILED");
                    println!("  Error: {}", e);
                }
            }
        }
        None => println!("OpenShift... SKIPPED (not configured)"),
    }

    Ok(if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Resolve and print a service's base URL.
async fn cmd_resolve_route(service: String) -> anyhow::Result<ExitCode> {
    let config = load_config()?;
    let Some(client) = OpenShiftClient::from_config(&config) else {
        println!("OpenShift is not configured");
        return Ok(ExitCode::FAILURE);
    };

    match client?.fetch_route_url(&service).await {
        Ok(url) => {
            println!("{}", url);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("Route not found for service {}: {}", service, e);
            Ok(ExitCode::FAILURE)
        }
    }
}
