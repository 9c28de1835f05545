use std::io::Write;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cinelist_import::LogProgress;

use crate::CliError;

use super::Context;

pub(crate) fn run_export(ctx: &Context, output: Option<PathBuf>) -> Result<(), CliError> {
    let conn = ctx.open_db()?;
    let snapshot = cinelist_import::export_snapshot(&conn)?;

    match output {
        Some(path) => {
            cinelist_import::write_snapshot(&path, &snapshot)?;
            log::info!(
                "Exported {} users, {} movies, {} lists, {} entries to {}",
                snapshot.users.len(),
                snapshot.movies.len(),
                snapshot.lists.len(),
                snapshot.entries.len(),
                path.display().if_supports_color(Stdout, |t| t.cyan()),
            );
        }
        None => {
            // Raw JSON only, so the output can be redirected into a file.
            let json = snapshot.to_json()?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub(crate) fn run_import(ctx: &Context, file: &Path) -> Result<(), CliError> {
    let snapshot = cinelist_import::read_snapshot(file)?;
    let conn = ctx.open_db()?;

    let source = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let stats = cinelist_import::import_snapshot(&conn, &snapshot, &source, Some(&LogProgress))?;

    crate::log_blank();
    log::info!("{}", "Import complete".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  Users:   {:>6} processed ({} created, {} matched)",
        stats.users_processed(),
        stats.users_created,
        stats.users_matched,
    );
    log::info!(
        "  Movies:  {:>6} processed ({} created, {} matched)",
        stats.movies_processed(),
        stats.movies_created,
        stats.movies_matched,
    );
    log::info!(
        "  Lists:   {:>6} processed ({} created, {} matched, {} skipped)",
        stats.lists_processed(),
        stats.lists_created,
        stats.lists_matched,
        stats.lists_skipped,
    );
    log::info!(
        "  Entries: {:>6} created ({} skipped)",
        stats.entries_created,
        stats.entries_skipped,
    );
    Ok(())
}

pub(crate) fn run_stats(ctx: &Context) -> Result<(), CliError> {
    let db_path = ctx.db_path();
    if !db_path.exists() {
        log::warn!("No database found at {}", db_path.display());
        log::info!("Run 'cinelist movie seed' or 'cinelist admin import <FILE>' to create one.");
        return Ok(());
    }

    let conn = ctx.open_db()?;
    let stats = cinelist_db::catalog_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to query stats: {}", e)))?;

    log::info!(
        "{}",
        "Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    crate::log_blank();
    log::info!("  Users:          {:>8}", stats.users);
    log::info!(
        "  Movies:         {:>8} ({} seeded)",
        stats.movies,
        stats.seeded_movies
    );
    log::info!("  Lists:          {:>8}", stats.lists);
    log::info!("  Entries:        {:>8}", stats.entries);
    log::info!("  Imports:        {:>8}", stats.imports);

    let recent = cinelist_db::list_import_logs(&conn, 5)
        .map_err(|e| CliError::database(format!("Failed to query import log: {}", e)))?;
    if !recent.is_empty() {
        crate::log_blank();
        log::info!("  Recent imports:");
        for entry in &recent {
            log::info!(
                "    {}  {}  (+{} lists, +{} entries)",
                entry.imported_at,
                entry.source_name,
                entry.lists_created,
                entry.entries_created,
            );
        }
    }
    Ok(())
}
