// # buildwatchd - one-shot change poller
//
// This binary is a THIN integration layer. All change detection, trigger and
// labeling logic lives in buildwatch-core and the source plugin crates.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering source plugins
// 4. Running a single poll cycle and reporting what changed
//
// Deciding when to poll again is left to whatever invokes the binary
// (a scheduler, cron, a CI trigger).
//
// ## Configuration
//
// - `BUILDWATCH_CONFIG`: Path to a project configuration JSON file
// - `BUILDWATCH_PROJECT`: Project name when no config file is given (default: "default")
// - `BUILDWATCH_REPOSITORY_ROOT`: Directory to watch when no config file is given
// - `BUILDWATCH_IGNORE_MISSING_ROOT`: "true" to tolerate a missing root
// - `BUILDWATCH_WORKING_DIR`: Build working directory (default: the repository root)
// - `BUILDWATCH_SINCE`: RFC 3339 timestamp of the last known modification
// - `BUILDWATCH_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export BUILDWATCH_REPOSITORY_ROOT=/srv/checkout/app
// export BUILDWATCH_SINCE=2025-01-09T12:00:00Z
//
// buildwatchd
// ```

use anyhow::{Context, Result};
use buildwatch_core::{
    ChangeMonitor, IntegrationResult, PollOutcome, ProjectConfig, SourceConfig,
    SourceRegistry,
};
use chrono::{DateTime, Utc};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum PollExitCode {
    /// Poll completed (with or without changes)
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The poll itself failed
    RuntimeError = 2,
}

impl From<PollExitCode> for ExitCode {
    fn from(code: PollExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    config_path: Option<PathBuf>,
    project_name: String,
    repository_root: Option<PathBuf>,
    ignore_missing_root: bool,
    working_dir: Option<PathBuf>,
    since: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            config_path: env::var("BUILDWATCH_CONFIG").ok().map(PathBuf::from),
            project_name: env::var("BUILDWATCH_PROJECT")
                .unwrap_or_else(|_| "default".to_string()),
            repository_root: env::var("BUILDWATCH_REPOSITORY_ROOT").ok().map(PathBuf::from),
            ignore_missing_root: env::var("BUILDWATCH_IGNORE_MISSING_ROOT")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            working_dir: env::var("BUILDWATCH_WORKING_DIR").ok().map(PathBuf::from),
            since: env::var("BUILDWATCH_SINCE").ok(),
            log_level: env::var("BUILDWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.config_path.is_none() && self.repository_root.is_none() {
            anyhow::bail!(
                "Either BUILDWATCH_CONFIG or BUILDWATCH_REPOSITORY_ROOT must be set. \
                Set it via: export BUILDWATCH_REPOSITORY_ROOT=/path/to/checkout"
            );
        }

        self.since()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "BUILDWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Lower bound of the query, defaulting to the beginning of time
    fn since(&self) -> Result<DateTime<Utc>> {
        match &self.since {
            Some(text) => DateTime::parse_from_rfc3339(text)
                .map(|t| t.with_timezone(&Utc))
                .with_context(|| format!("BUILDWATCH_SINCE is not an RFC 3339 timestamp: {}", text)),
            None => Ok(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Resolve the project configuration from a file or from the environment
    fn project_config(&self) -> Result<ProjectConfig> {
        if let Some(path) = &self.config_path {
            let config = ProjectConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            return Ok(config);
        }

        let root = self
            .repository_root
            .clone()
            .context("BUILDWATCH_REPOSITORY_ROOT is not set")?;
        let working_dir = self.working_dir.clone().unwrap_or_else(|| root.clone());

        Ok(ProjectConfig::new(
            self.project_name.clone(),
            working_dir,
            SourceConfig::Filesystem {
                repository_root: root,
                ignore_missing_root: self.ignore_missing_root,
            },
        ))
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return PollExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PollExitCode::ConfigError.into();
    }

    let project_config = match config.project_config().and_then(|c| {
        c.validate()?;
        Ok(c)
    }) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return PollExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PollExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match poll_once(&config, project_config).await {
            Ok(_) => PollExitCode::Completed,
            Err(e) => {
                error!("Poll failed: {:#}", e);
                PollExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Build the source tree and run one poll cycle
async fn poll_once(config: &Config, project_config: ProjectConfig) -> Result<PollOutcome> {
    let registry = SourceRegistry::new();

    #[cfg(feature = "filesystem")]
    {
        info!("Registering filesystem source");
        buildwatch_source_fs::register(&registry);
    }

    let source = registry.create_source(&project_config.source)?;
    info!(
        "Project {}: {} source ({})",
        project_config.name,
        source.source_name(),
        project_config.source.type_name()
    );

    let project = project_config.project();
    let (monitor, mut events) = ChangeMonitor::new(source, project, project_config.monitor)?;
    monitor.initialize().await?;

    let mut result: IntegrationResult = monitor
        .project()
        .new_result()
        .with_last_modification_date(config.since()?);

    let outcome = monitor.poll(&mut result).await?;

    for modification in &result.modifications {
        info!(
            "{}/{} @ {}",
            modification.folder_name(),
            modification.file_name(),
            modification.modified_time().to_rfc3339()
        );
    }

    while let Ok(event) = events.try_recv() {
        tracing::debug!("Monitor event: {:?}", event);
    }

    match outcome {
        PollOutcome::Changes(count) => info!("{} modification(s), build required", count),
        PollOutcome::NoChanges => info!("No modifications, nothing to build"),
        PollOutcome::Skipped => warn!("Trigger gate declined to poll"),
    }

    Ok(outcome)
}
