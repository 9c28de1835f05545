use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cinelist_lib::ReorderPolicy;
use cinelist_lib::settings::{self, ENV_CATALOG_DIR, ENV_DATABASE, ENV_REORDER_POLICY};

use crate::CliError;

use super::Context;

/// Show the effective settings and which environment overrides are active.
pub(crate) fn run_config_show(ctx: &Context) -> Result<(), CliError> {
    let path = settings::settings_path();

    log::info!(
        "{}",
        "cinelist Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    let overrides: Vec<&str> = [ENV_DATABASE, ENV_CATALOG_DIR, ENV_REORDER_POLICY]
        .into_iter()
        .filter(|var| std::env::var_os(var).is_some())
        .collect();
    if !overrides.is_empty() {
        log::info!("  Environment overrides: {}", overrides.join(", "));
    }
    log::info!("  Database path: {}", ctx.db_path().display());
    crate::log_blank();

    let rendered = settings::render_settings(&ctx.settings)
        .map_err(|e| CliError::invalid_argument(format!("cannot render settings: {e}")))?;
    for line in rendered.lines() {
        log::info!("  {line}");
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", settings::settings_path().display());
    Ok(())
}

pub(crate) fn run_set_policy(policy: ReorderPolicy) -> Result<(), CliError> {
    let path = settings::settings_path();
    settings::save_reorder_policy(&path, policy)?;
    log::info!(
        "Reorder policy set to {} in {}",
        policy.if_supports_color(Stdout, |t| t.bold()),
        path.display()
    );
    Ok(())
}
