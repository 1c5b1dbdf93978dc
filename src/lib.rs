//! Tinker - Banking API demo client
//!
//! Establishes a device identity and an authenticated session against the
//! sandbox or production API, keeps both in a per-environment credential file
//! and recovers from invalidated sandbox identities by regenerating them once.

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod identity;
pub mod logging;
pub mod model;
pub mod output;
pub mod provider;
pub mod session;
pub mod signal;
pub mod store;

use std::io;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use secrecy::SecretString;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::environment::EnvironmentType;
use crate::error::ExitCode;
use crate::output::{JsonOutput, SessionSummary, TextOutput};
use crate::provider::HttpProvider;
use crate::session::{
    add_callback_url, fetch_recent_activity, validate_callback_url, ManagerSettings,
    SessionContext, SessionManager, OVERVIEW_ACTIVITY_COUNT,
};
use crate::store::CredentialStore;

/// Run the command described by `cli`.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the session cannot be
/// established, a remote call made with it fails or output cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let handler = signal::install_handler()?;
    let environment = EnvironmentType::from(cli.environment);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.credential_dir {
        config.credential_dir = dir;
    }
    let store = CredentialStore::new(config.credential_dir.clone());
    let colored = !cli.no_color;

    let code = match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
            ExitCode::Success
        }
        Commands::Show => {
            show_credentials(&store, environment, colored)?;
            ExitCode::Success
        }
        Commands::Forget => {
            forget_credentials(&store, environment)?;
            ExitCode::Success
        }
        Commands::Login(args) => {
            let manager = build_manager(&config, environment, store)?
                .with_interrupt_flag(handler.get_flag());
            with_session(&manager, environment, |_, context| {
                let summary = SessionSummary::from_context(context);
                match args.output {
                    OutputFormat::Json => JsonOutput::new(&summary).write_to(io::stdout()),
                    OutputFormat::Text => {
                        let text = TextOutput::new(colored).render_login(&summary);
                        Ok(TextOutput::new(colored).write_to(io::stdout(), &text)?)
                    }
                }
            })?;
            ExitCode::Success
        }
        Commands::Overview(args) => {
            let manager = build_manager(&config, environment, store)?
                .with_interrupt_flag(handler.get_flag());
            with_session(&manager, environment, |provider, context| {
                let activity = fetch_recent_activity(provider, context, OVERVIEW_ACTIVITY_COUNT)
                    .context("Failed to list recent account activity")?;
                let summary = SessionSummary::from_context(context).with_activity(activity);
                match args.output {
                    OutputFormat::Json => JsonOutput::new(&summary).write_to(io::stdout()),
                    OutputFormat::Text => {
                        let text = TextOutput::new(colored).render_overview(&summary);
                        Ok(TextOutput::new(colored).write_to(io::stdout(), &text)?)
                    }
                }
            })?;
            ExitCode::Success
        }
        Commands::AddCallbackUrl(args) => {
            validate_callback_url(&args.url)?;
            let manager = build_manager(&config, environment, store)?
                .with_interrupt_flag(handler.get_flag());
            with_session(&manager, environment, |provider, context| {
                let filters = add_callback_url(provider, context, &args.url)
                    .with_context(|| format!("Failed to add callback URL {}", args.url))?;
                let output = TextOutput::new(colored);
                Ok(output.write_to(io::stdout(), &output.render_callback(&args.url, &filters))?)
            })?;
            ExitCode::Success
        }
    };

    if handler.is_shutdown_requested() {
        return Ok(ExitCode::Interrupted);
    }
    Ok(code)
}

/// Read the production API key from the configured variable.
fn secret_key_from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

fn build_manager(
    config: &Config,
    environment: EnvironmentType,
    store: CredentialStore,
) -> Result<SessionManager<HttpProvider>> {
    let base_url = config.base_url(environment);
    let provider = HttpProvider::new(base_url, Duration::from_secs(config.http_timeout_secs))
        .with_context(|| format!("Failed to set up HTTP client for {}", base_url))?;

    let settings = ManagerSettings {
        secret_key: secret_key_from_env(&config.api_key_env),
        secret_key_var: config.api_key_env.clone(),
        host_label: config.resolve_host_label(),
        device_description: config.device_description.clone(),
        permitted_ips: config.permitted_ips.clone(),
        refresh_margin: i64::try_from(config.refresh_margin_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX),
        funding: config.funding.clone(),
    };

    Ok(SessionManager::new(provider, store, settings))
}

/// Initialize a session, hand it to `action`, then refresh it.
fn with_session<F>(
    manager: &SessionManager<HttpProvider>,
    environment: EnvironmentType,
    action: F,
) -> Result<()>
where
    F: FnOnce(&HttpProvider, &SessionContext) -> Result<()>,
{
    let mut context: SessionContext = manager
        .initialize(environment)
        .with_context(|| format!("Failed to initialize {} session", environment))?;

    action(manager.provider(), &context)?;

    manager
        .refresh(&mut context)
        .with_context(|| format!("Failed to refresh {} session", environment))?;
    Ok(())
}

fn show_credentials(store: &CredentialStore, environment: EnvironmentType, colored: bool) -> Result<()> {
    let file_name = environment.policy().file_name;
    let path = store.path_for(file_name);
    if !store.exists(file_name) {
        bail!("No {} credentials stored at {}", environment, path.display());
    }

    let record = store
        .load(file_name)
        .with_context(|| format!("Failed to read {} credentials", environment))?;
    let output = TextOutput::new(colored);
    output.write_to(io::stdout(), &output.render_record(&record, &path))?;
    Ok(())
}

fn forget_credentials(store: &CredentialStore, environment: EnvironmentType) -> Result<()> {
    let file_name = environment.policy().file_name;
    let path = store.path_for(file_name);
    if !store.exists(file_name) {
        println!("No {} credentials stored at {}", environment, path.display());
        return Ok(());
    }

    store
        .delete(file_name)
        .with_context(|| format!("Failed to delete {}", path.display()))?;
    log::info!("Removed {} credentials", environment);
    println!("Removed {}", path.display());
    Ok(())
}
