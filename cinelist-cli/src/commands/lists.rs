use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cinelist_catalog::NewMovie;
use cinelist_lib::{AccessLevel, Caller, MovieRef, RankUpdate, ReorderPolicy};

use crate::CliError;
use crate::cli_types::MovieArgs;

use super::{Context, truncate_str};

/// The caller named by `--owner`; without it the caller is anonymous.
fn caller(owner: Option<i64>) -> Caller {
    owner.map_or(Caller::Anonymous, Caller::User)
}

pub(crate) fn run_create(ctx: &Context, owner: Option<i64>, name: &str) -> Result<(), CliError> {
    let owner = caller(owner).require_user()?;
    let conn = ctx.open_db()?;
    let list = ctx.store(&conn).create_list(owner, name)?;

    log::info!(
        "Created list {} '{}'",
        list.id,
        list.name.if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  Public (read-only):  {}",
        list.public_id.if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!(
        "  Private (owner):     {}",
        list.private_id.if_supports_color(Stdout, |t| t.yellow()),
    );
    log::info!("Keep the private identifier secret; anyone holding it can edit the list.");
    Ok(())
}

pub(crate) fn run_show(ctx: &Context, identifier: &str) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let view = ctx.store(&conn).get_list(identifier)?;

    let access = match view.access {
        AccessLevel::Owner => "owner".if_supports_color(Stdout, |t| t.green()).to_string(),
        AccessLevel::ReadOnly => "read-only".if_supports_color(Stdout, |t| t.dimmed()).to_string(),
    };
    log::info!(
        "{} ({access})",
        view.name.if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Public:  {}", view.public_id);
    if let Some(private_id) = &view.private_id {
        log::info!("  Private: {}", private_id);
    }
    log::info!("  Created: {}", view.created_at);
    crate::log_blank();

    if view.entries.is_empty() {
        log::info!("  (no entries)");
        return Ok(());
    }

    log::info!("  {:>4}  {:>6}  {:<40}  {}", "Rank", "Entry", "Title", "Release");
    for entry in &view.entries {
        log::info!(
            "  {:>4}  {:>6}  {:<40}  {}",
            entry.rank,
            entry.id,
            truncate_str(&entry.movie.title, 40),
            entry.movie.release_date.as_deref().unwrap_or("-"),
        );
        if let Some(note) = &entry.annotation {
            log::info!(
                "  {:>4}  {:>6}  {}",
                "",
                "",
                note.if_supports_color(Stdout, |t| t.italic()),
            );
        }
    }
    Ok(())
}

pub(crate) fn run_mine(ctx: &Context, owner: Option<i64>) -> Result<(), CliError> {
    let owner = caller(owner).require_user()?;
    let conn = ctx.open_db()?;
    let lists = ctx.store(&conn).lists_for_owner(owner)?;

    if lists.is_empty() {
        log::info!("User {owner} has no lists.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!("Lists owned by user {owner}").if_supports_color(Stdout, |t| t.bold()),
    );
    for list in &lists {
        log::info!(
            "  {:>4}  {:<30}  {:>3} entries",
            list.id,
            truncate_str(&list.name, 30),
            list.entry_count,
        );
        log::info!("        public  {}", list.public_id);
        log::info!("        private {}", list.private_id);
    }
    Ok(())
}

fn movie_ref(args: MovieArgs) -> Result<MovieRef, CliError> {
    let new = args.title.map(|title| NewMovie {
        title,
        poster_path: args.poster,
        release_date: args.release,
    });
    match (args.movie_id, new) {
        (Some(id), Some(movie)) => Ok(MovieRef::Keyed { id, movie }),
        (Some(id), None) => Ok(MovieRef::Id(id)),
        (None, Some(movie)) => Ok(MovieRef::Title(movie)),
        (None, None) => Err(CliError::invalid_argument(
            "either --movie-id or --title is required",
        )),
    }
}

pub(crate) fn run_add(
    ctx: &Context,
    private_id: &str,
    movie: MovieArgs,
    note: Option<&str>,
) -> Result<(), CliError> {
    let movie = movie_ref(movie)?;
    let conn = ctx.open_db()?;
    let entry = ctx.store(&conn).add_entry(private_id, &movie, note)?;

    log::info!(
        "Added '{}' as entry {} at rank {}",
        entry.movie.title.if_supports_color(Stdout, |t| t.bold()),
        entry.id,
        entry.rank,
    );
    Ok(())
}

pub(crate) fn run_reorder(
    ctx: &Context,
    private_id: &str,
    updates: &[RankUpdate],
    policy: Option<ReorderPolicy>,
) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let mut store = ctx.store(&conn);
    if let Some(policy) = policy {
        store = store.with_policy(policy);
    }
    let outcome = store.reorder(private_id, updates)?;

    log::info!(
        "Reordered: {} applied, {} skipped",
        outcome.applied.if_supports_color(Stdout, |t| t.green()),
        outcome.skipped,
    );
    if outcome.shifted > 0 {
        log::info!(
            "  {} entries shifted to resolve duplicate ranks",
            outcome.shifted
        );
    }
    Ok(())
}

pub(crate) fn run_remove(ctx: &Context, private_id: &str, entry_id: i64) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    ctx.store(&conn).remove_entry(private_id, entry_id)?;
    log::info!("Removed entry {entry_id}");
    Ok(())
}

pub(crate) fn run_note(
    ctx: &Context,
    private_id: &str,
    entry_id: i64,
    text: Option<&str>,
) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    ctx.store(&conn)
        .update_entry_annotation(private_id, entry_id, text)?;
    match text {
        Some(_) => log::info!("Updated note on entry {entry_id}"),
        None => log::info!("Cleared note on entry {entry_id}"),
    }
    Ok(())
}

pub(crate) fn run_rename(ctx: &Context, private_id: &str, name: &str) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    ctx.store(&conn).rename_list(private_id, name)?;
    log::info!("Renamed list to '{}'", name.trim());
    Ok(())
}

pub(crate) fn run_delete(ctx: &Context, private_id: &str) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    ctx.store(&conn).delete_list(private_id)?;
    log::info!("Deleted list");
    Ok(())
}
