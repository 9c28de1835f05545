use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cinelist_lib::users;

use crate::CliError;

use super::{Context, truncate_str};

pub(crate) fn run_add(ctx: &Context, username: &str, password_hash: &str) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let user = users::add_user(&conn, username, password_hash)?;
    log::info!(
        "Added user {} '{}'",
        user.id,
        user.username.if_supports_color(Stdout, |t| t.bold()),
    );
    Ok(())
}

pub(crate) fn run_list(ctx: &Context) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let summaries = users::list_users(&conn, &ctx.settings.admin.username)?;

    if summaries.is_empty() {
        log::info!("No users.");
        return Ok(());
    }

    log::info!(
        "  {:>6}  {:<24}  {:>5}  {}",
        "ID".if_supports_color(Stdout, |t| t.bold()),
        "Username".if_supports_color(Stdout, |t| t.bold()),
        "Lists".if_supports_color(Stdout, |t| t.bold()),
        "Created".if_supports_color(Stdout, |t| t.bold()),
    );
    for user in &summaries {
        log::info!(
            "  {:>6}  {:<24}  {:>5}  {}",
            user.id,
            truncate_str(&user.username, 24),
            user.list_count,
            user.created_at,
        );
    }
    Ok(())
}

pub(crate) fn run_rename(ctx: &Context, id: i64, username: &str) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    users::rename_user(&conn, id, username)?;
    log::info!("Renamed user {id} to '{}'", username.trim());
    Ok(())
}

pub(crate) fn run_delete(ctx: &Context, id: i64) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let user = users::find_user(&conn, id)?;
    let lists = users::delete_user(&conn, id)?;
    log::info!(
        "Deleted user '{}' and {} lists",
        user.username.if_supports_color(Stdout, |t| t.bold()),
        lists
    );
    Ok(())
}
