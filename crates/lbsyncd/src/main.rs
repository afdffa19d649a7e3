// # lbsyncd - Load Balancer Sync Daemon
//
// Thin integration layer. All synchronization logic lives in lbsync-core
// and all DNS I/O in lbsync-hickory.
//
// The lbsyncd daemon is responsible for:
// 1. Reading settings from environment variables
// 2. Loading the INI configuration file
// 3. Initializing the runtime and logging
// 4. Starting one tracker per load balancer
// 5. Serving the health endpoint
//
// ## Configuration
//
// - `LBSYNC_CONFIG`: Path to the INI configuration (default /etc/lbsync/update.ini)
// - `LBSYNC_KEY_FILE`: TSIG key file (default /var/run/named/session.key)
// - `LBSYNC_HTTP_ADDR`: Health endpoint address (default 0.0.0.0:8080)
// - `LBSYNC_HEALTH_RESOLVERS`: Comma-separated resolver IPs (default 8.8.8.8,8.8.4.4)
// - `LBSYNC_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// ## Example
//
// ```bash
// export LBSYNC_CONFIG=/etc/lbsync/update.ini
// export LBSYNC_LOG_LEVEL=debug
//
// lbsyncd
// ```

mod http;

use anyhow::{Context, Result};
use lbsync_core::{
    CredentialSource, DnsExchange, HealthMonitor, HostLookup, KeyFileCredentials, SyncConfig,
    SyncContext, SyncCoordinator, UpdateTransport,
};
use lbsync_hickory::{
    DEFAULT_HEALTH_RESOLVERS, HickoryExchange, HickoryUpdateTransport, PublicResolverLookup,
};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_CONFIG_PATH: &str = "/etc/lbsync/update.ini";
const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum LbsyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<LbsyncExitCode> for ExitCode {
    fn from(code: LbsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon settings read from the environment
#[derive(Debug)]
struct Config {
    config_path: PathBuf,
    key_file: PathBuf,
    http_addr: String,
    health_resolvers: Option<String>,
    log_level: String,
}

impl Config {
    /// Load settings from environment variables
    fn from_env() -> Self {
        Self {
            config_path: env::var("LBSYNC_CONFIG")
                .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
                .into(),
            key_file: env::var("LBSYNC_KEY_FILE")
                .unwrap_or_else(|_| lbsync_core::credentials::DEFAULT_KEY_FILE.to_string())
                .into(),
            http_addr: env::var("LBSYNC_HTTP_ADDR").unwrap_or_else(|_| DEFAULT_HTTP_ADDR.to_string()),
            health_resolvers: env::var("LBSYNC_HEALTH_RESOLVERS").ok(),
            log_level: env::var("LBSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the settings
    fn validate(&self) -> Result<()> {
        self.http_addr()?;
        self.health_resolvers()?;
        self.log_level()?;
        Ok(())
    }

    fn http_addr(&self) -> Result<SocketAddr> {
        self.http_addr
            .parse()
            .with_context(|| format!("LBSYNC_HTTP_ADDR '{}' is not a socket address", self.http_addr))
    }

    fn health_resolvers(&self) -> Result<Vec<IpAddr>> {
        let Some(raw) = &self.health_resolvers else {
            return Ok(DEFAULT_HEALTH_RESOLVERS.to_vec());
        };

        let resolvers = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<IpAddr>()
                    .with_context(|| format!("LBSYNC_HEALTH_RESOLVERS entry '{}' is not an IP address", s))
            })
            .collect::<Result<Vec<_>>>()?;

        if resolvers.is_empty() {
            anyhow::bail!("LBSYNC_HEALTH_RESOLVERS must contain at least one address");
        }
        Ok(resolvers)
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "LBSYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

/// Everything set up before serving
struct Daemon {
    coordinator: SyncCoordinator,
    listener: TcpListener,
    monitor: Arc<HealthMonitor>,
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return LbsyncExitCode::ConfigError.into();
    }

    let log_level = config.log_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return LbsyncExitCode::ConfigError.into();
    }

    info!("Starting lbsyncd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return LbsyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let daemon = match start_daemon(&config).await {
            Ok(daemon) => daemon,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return LbsyncExitCode::ConfigError;
            }
        };

        match run_daemon(daemon).await {
            Ok(()) => LbsyncExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                LbsyncExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Load the configuration, start the trackers and bind the health endpoint
async fn start_daemon(config: &Config) -> Result<Daemon> {
    let sync_config = SyncConfig::from_file(&config.config_path)
        .with_context(|| format!("loading {}", config.config_path.display()))?;

    let exchange: Arc<dyn DnsExchange> = Arc::new(HickoryExchange::new());
    let transport: Arc<dyn UpdateTransport> = Arc::new(HickoryUpdateTransport::new());
    let credentials: Arc<dyn CredentialSource> =
        Arc::new(KeyFileCredentials::new(&config.key_file));

    let context = Arc::new(SyncContext::new(sync_config, exchange, transport, credentials)?);
    info!(
        "Configuration loaded: {} domain(s), {} remote server(s)",
        context.config().domains.len(),
        context.config().remote_dns_servers.len()
    );
    for lb in context.load_balancers() {
        info!(loadbalancer = %lb.fqdn, domains = lb.domains.len(), "Tracking load balancer");
    }

    let lookup: Arc<dyn HostLookup> =
        Arc::new(PublicResolverLookup::new(&config.health_resolvers()?));
    let monitor = Arc::new(HealthMonitor::new(lookup));

    let addr = config.http_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind health endpoint on {}", addr))?;

    let mut coordinator = SyncCoordinator::new(context);
    let started = coordinator.start()?;
    info!("Started {} tracker(s)", started);

    Ok(Daemon {
        coordinator,
        listener,
        monitor,
    })
}

/// Serve the health endpoint; trackers run until the process exits
async fn run_daemon(daemon: Daemon) -> Result<()> {
    let Daemon {
        mut coordinator,
        listener,
        monitor,
    } = daemon;

    let result = http::serve(listener, monitor).await;
    coordinator.abort_all();
    result
}
