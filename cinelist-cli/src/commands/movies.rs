use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cinelist_catalog::NewMovie;
use cinelist_lib::MovieRef;

use crate::CliError;

use super::{Context, truncate_str};

pub(crate) fn run_create(
    ctx: &Context,
    title: String,
    poster: Option<String>,
    release: Option<String>,
) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let resolved = ctx.catalog(&conn).resolve_or_create(&MovieRef::Title(NewMovie {
        title,
        poster_path: poster,
        release_date: release,
    }))?;

    let verb = if resolved.created {
        "Created".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "Found existing".if_supports_color(Stdout, |t| t.yellow()).to_string()
    };
    log::info!(
        "{verb} movie {} '{}'",
        resolved.movie.id,
        resolved.movie.title
    );
    Ok(())
}

pub(crate) fn run_custom(ctx: &Context) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let movies = ctx.catalog(&conn).user_created()?;

    if movies.is_empty() {
        log::info!("No user-created movies.");
        return Ok(());
    }

    log::info!(
        "{}",
        "User-created movies".if_supports_color(Stdout, |t| t.bold()),
    );
    for movie in &movies {
        log::info!(
            "  {:>6}  {:<40}  {}",
            movie.id,
            truncate_str(&movie.title, 40),
            movie.release_date.as_deref().unwrap_or("-"),
        );
    }
    log::info!("{} total", movies.len());
    Ok(())
}

pub(crate) fn run_delete(ctx: &Context, id: i64) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let catalog = ctx.catalog(&conn);
    let movie = catalog.find(id)?;
    let removed = catalog.delete(id)?;
    log::info!(
        "Deleted '{}' ({} list entries removed)",
        movie.title,
        removed
    );
    Ok(())
}

pub(crate) fn run_seed(ctx: &Context, dir: Option<PathBuf>) -> Result<(), CliError> {
    let Some(dir) = ctx.settings.catalog_dir(dir) else {
        return Err(CliError::invalid_argument(
            "no catalog directory; pass --dir or set catalog.dir",
        ));
    };
    let conn = ctx.open_db()?;
    let stats = ctx.catalog(&conn).seed_from_dir(&dir)?;

    log::info!(
        "Seeded from {}: {} added, {} updated, {} unchanged",
        dir.display().if_supports_color(Stdout, |t| t.cyan()),
        stats.added,
        stats.updated,
        stats.unchanged,
    );
    Ok(())
}
