// LogPanel - main.rs
//
// Headless viewer entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Transport and capability setup
// 4. Driving the source controller and printing its display-ready text

use clap::Parser;
use logpanel::app::controller::{ControllerOptions, SourceController};
use logpanel::app::registry::{discover_capabilities, HostCapabilities, StaticCapabilities};
use logpanel::core::model::{Source, Tab};
use logpanel::platform::config::{self, AppConfig, PlatformPaths, SupervisorMode};
use logpanel::platform::http::HttpTransport;
use logpanel::util::error::{ControllerError, LogPanelError};
use logpanel::util::{self, constants};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// LogPanel - view host, supervisor and add-on logs from a dashboard host.
#[derive(Parser, Debug)]
#[command(name = "logpanel", version, about)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Host base URL, e.g. http://homeassistant.local:8123.
    #[arg(short = 'u', long = "url")]
    url: Option<String>,

    /// API token (falls back to config, then LOGPANEL_TOKEN).
    #[arg(short = 't', long = "token")]
    token: Option<String>,

    /// Log to show: core, supervisor or addon:<slug>.
    #[arg(short = 's', long = "source")]
    source: Option<Source>,

    /// Show only lines containing this text (case-insensitive).
    #[arg(short = 'f', long = "filter")]
    filter: Option<String>,

    /// Print installed add-ons (slug and name) and exit.
    #[arg(long = "list-addons")]
    list_addons: bool,

    /// Reload every SECS seconds until Ctrl-C, reprinting on change.
    #[arg(short = 'w', long = "watch", value_name = "SECS")]
    watch: Option<u64>,

    /// Write the text to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "LogPanel starting"
    );

    match run(cli, app_config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "LogPanel failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when no log text could be shown at all.
async fn run(cli: Cli, app_config: AppConfig) -> Result<bool, LogPanelError> {
    let host_url = cli.url.clone().unwrap_or(app_config.host_url.clone());
    let token = config::resolve_token(cli.token.clone(), app_config.token.clone());
    let transport = Arc::new(HttpTransport::new(
        &host_url,
        token,
        Duration::from_secs(app_config.timeout_secs),
    )?);

    let capabilities: Arc<dyn HostCapabilities> = match app_config.supervisor {
        SupervisorMode::Present => Arc::new(StaticCapabilities(true)),
        SupervisorMode::Absent => Arc::new(StaticCapabilities(false)),
        SupervisorMode::Auto => match discover_capabilities(transport.as_ref()).await {
            Ok(components) => Arc::new(components),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read host components; offering core log only");
                Arc::new(StaticCapabilities(false))
            }
        },
    };

    let options = ControllerOptions {
        reset_addon_on_leave: app_config.reset_addon_on_leave,
        initial_query: cli.filter.clone().unwrap_or(app_config.filter.clone()),
    };
    let controller = SourceController::new(transport, capabilities, options);

    if cli.list_addons {
        return list_addons(&controller).await;
    }

    if let Err(e) = controller.start().await {
        report(&e);
    }

    let source = cli.source.clone().unwrap_or(app_config.initial_source.clone());
    if let Err(e) = show_source(&controller, &source).await {
        report(&e);
    }

    let mut last_sequence = controller.current_sequence();
    emit(&controller.current_text(), cli.output.as_ref()).await?;

    if let Some(secs) = cli.watch {
        let secs = secs.clamp(
            constants::MIN_WATCH_INTERVAL_SECS,
            constants::MAX_WATCH_INTERVAL_SECS,
        );
        tracing::info!(interval_secs = secs, "Watching for changes (Ctrl-C to stop)");
        let mut ticker = tokio::time::interval(Duration::from_secs(secs));
        // The first tick completes immediately; the initial fetch already happened.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = controller.reload().await {
                        report(&e);
                        continue;
                    }
                    let sequence = controller.current_sequence();
                    if sequence != last_sequence {
                        last_sequence = sequence;
                        emit(&controller.current_text(), cli.output.as_ref()).await?;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted; stopping watch");
                    break;
                }
            }
        }
    }

    Ok(controller.current_sequence().is_some())
}

/// Move the controller onto `source`. The core log was fetched by `start`.
async fn show_source(
    controller: &SourceController,
    source: &Source,
) -> Result<(), ControllerError> {
    match source {
        Source::Core => Ok(()),
        Source::Supervisor => controller.select_tab(Tab::Supervisor).await,
        Source::Addon(slug) => {
            controller.select_tab(Tab::Addon).await?;
            controller.select_addon(slug).await
        }
    }
}

async fn list_addons(controller: &SourceController) -> Result<bool, LogPanelError> {
    controller.select_tab(Tab::Addon).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for addon in controller.addon_list() {
        writeln!(out, "{}\t{}", addon.slug, addon.name).map_err(stdout_error)?;
    }
    Ok(true)
}

async fn emit(text: &str, output: Option<&PathBuf>) -> Result<(), LogPanelError> {
    match output {
        Some(path) => {
            tokio::fs::write(path, text)
                .await
                .map_err(|source| LogPanelError::Io {
                    path: path.clone(),
                    operation: "write output",
                    source,
                })?;
            tracing::info!(path = %path.display(), bytes = text.len(), "Log text written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(text.as_bytes()).map_err(stdout_error)?;
            if !text.is_empty() && !text.ends_with('\n') {
                out.write_all(b"\n").map_err(stdout_error)?;
            }
            out.flush().map_err(stdout_error)?;
        }
    }
    Ok(())
}

fn stdout_error(source: std::io::Error) -> LogPanelError {
    LogPanelError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write",
        source,
    }
}

/// Non-fatal controller errors go to stderr; the user can retry.
fn report(error: &ControllerError) {
    tracing::warn!(error = %error, "Controller operation failed");
    eprintln!("{}: {error}", constants::APP_NAME);
}
