// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lbaas_scenario::backend::LabelServer;
use lbaas_scenario::clients::{
    authenticate, http_client, ComputeClient, NetworkClient, ReqwestProbe, RestClient, SshShell,
};
use lbaas_scenario::config::{load_config, Config};
use lbaas_scenario::scenario::{Collaborators, ScenarioDriver, ScenarioReport};
use lbaas_scenario::traffic::TrafficVerifier;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

#[derive(Parser)]
#[command(name = "lbaas-scenario", about = "Provision a load balancer and verify round-robin traffic")]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, env = "LBAAS_SCENARIO_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Log at trace level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full provision-and-verify scenario
    Run {
        #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
        report: ReportFormat,
    },
    /// Verify traffic distribution through an existing VIP
    Verify {
        /// VIP or floating IP address, optionally with a port
        #[arg(long)]
        address: String,
        #[arg(long)]
        samples: Option<usize>,
        /// Expected backend labels (defaults to the configured ones)
        #[arg(long = "label")]
        labels: Vec<String>,
        #[arg(long, default_value_t = 120)]
        connect_timeout_secs: u64,
    },
    /// Serve labelled responses locally
    Backend {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long = "label", required = true)]
        labels: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "trace" } else { "debug" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("lbaas_scenario={}", level).parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    match cli.command {
        Command::Run { report } => {
            let config = load(&cli.config).await?;
            let report_out = run_scenario(config).await?;
            print_report(&report_out, report)?;
            if report_out.outcome.is_failed() {
                std::process::exit(1);
            }
        }
        Command::Verify {
            address,
            samples,
            labels,
            connect_timeout_secs,
        } => {
            let (samples, labels, interval) = match load(&cli.config).await {
                Ok(config) => (
                    samples.unwrap_or(config.scenario.sample_count),
                    if labels.is_empty() { config.scenario.labels.clone() } else { labels },
                    config.scenario.poll_interval(),
                ),
                Err(_) if !labels.is_empty() => (samples.unwrap_or(10), labels, Duration::from_secs(1)),
                Err(e) => return Err(e),
            };

            let probe = Arc::new(ReqwestProbe::new(Duration::from_secs(10))?);
            let verifier = TrafficVerifier::new(probe, Duration::from_secs(connect_timeout_secs), interval);
            let report = verifier.verify_distribution(&address, samples, &labels).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Backend { port, labels } => {
            let addr: SocketAddr = ([0, 0, 0, 0], port).into();
            let server = LabelServer::bind(addr, labels).await?;
            tokio::select! {
                _ = server.wait() => {},
                _ = shutdown_signal() => {},
            }
        }
    }

    Ok(())
}

async fn load(path: &PathBuf) -> Result<Config> {
    info!("Loading configuration from: {}", path.display());
    load_config(path)
        .await
        .with_context(|| format!("loading {}", path.display()))
}

async fn run_scenario(config: Config) -> Result<ScenarioReport> {
    let http = http_client(config.scenario.request_timeout())?;
    let credentials = authenticate(&http, &config.identity)
        .await
        .context("authenticating")?;

    let compute = ComputeClient::new(RestClient::new(
        http.clone(),
        config.endpoints.compute_url.clone(),
        credentials.token.clone(),
    ));
    let network = NetworkClient::new(RestClient::new(
        http,
        config.endpoints.network_url.clone(),
        credentials.token.clone(),
    ));

    let clients = Collaborators {
        compute: Arc::new(compute),
        network: Arc::new(network),
        shell: Arc::new(SshShell::new(config.scenario.poll_interval())),
        probe: Arc::new(ReqwestProbe::new(config.scenario.request_timeout())?),
    };

    let driver = ScenarioDriver::new(config, credentials.tenant_id, clients);
    Ok(driver.run().await)
}

fn print_report(report: &ScenarioReport, format: ReportFormat) -> Result<()> {
    let rendered = match format {
        ReportFormat::Json => serde_json::to_string_pretty(report)?,
        ReportFormat::Yaml => serde_yaml::to_string(report)?,
    };
    println!("{}", rendered);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
