//! cinelist CLI
//!
//! Command-line front end for ranked movie lists: list editing by private
//! identifier, catalog and user administration, and snapshot export/import.

mod cli_types;
mod commands;
mod error;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;

use cli_types::{AdminAction, Cli, Commands, ConfigAction, ListAction, MovieAction, UserAction};
pub(crate) use error::CliError;

/// Print an empty line through the logger so `--quiet` suppresses it too.
pub(crate) fn log_blank() {
    log::info!("");
}

/// Stdout writer that also copies everything, minus ANSI escapes, to a file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(&strip_ansi_escapes::strip(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

fn init_logger(quiet: bool, verbose: bool, logfile: Option<&Path>) -> io::Result<()> {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder.filter_level(level);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.format(move |buf, record| {
        if verbose {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        } else {
            match record.level() {
                log::Level::Error => writeln!(buf, "error: {}", record.args()),
                log::Level::Warn => writeln!(buf, "warning: {}", record.args()),
                _ => writeln!(buf, "{}", record.args()),
            }
        }
    });

    match logfile {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(Target::Pipe(Box::new(Tee { file })));
        }
        None => {
            builder.target(Target::Stdout);
        }
    }

    builder.init();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logger(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("Failed to open log file: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = cinelist_lib::load_settings()?;
    let ctx = commands::Context::new(settings, cli.db);

    match cli.command {
        Commands::List { action } => match action {
            ListAction::Create { owner, name } => commands::lists::run_create(&ctx, owner, &name),
            ListAction::Show { identifier } => commands::lists::run_show(&ctx, &identifier),
            ListAction::Mine { owner } => commands::lists::run_mine(&ctx, owner),
            ListAction::Add {
                private_id,
                movie,
                note,
            } => commands::lists::run_add(&ctx, &private_id, movie, note.as_deref()),
            ListAction::Reorder {
                private_id,
                updates,
                policy,
            } => commands::lists::run_reorder(&ctx, &private_id, &updates, policy),
            ListAction::Remove {
                private_id,
                entry_id,
            } => commands::lists::run_remove(&ctx, &private_id, entry_id),
            ListAction::Note {
                private_id,
                entry_id,
                text,
            } => commands::lists::run_note(&ctx, &private_id, entry_id, text.as_deref()),
            ListAction::Rename { private_id, name } => {
                commands::lists::run_rename(&ctx, &private_id, &name)
            }
            ListAction::Delete { private_id } => commands::lists::run_delete(&ctx, &private_id),
        },
        Commands::Movie { action } => match action {
            MovieAction::Create {
                title,
                poster,
                release,
            } => commands::movies::run_create(&ctx, title, poster, release),
            MovieAction::Custom => commands::movies::run_custom(&ctx),
            MovieAction::Delete { id } => commands::movies::run_delete(&ctx, id),
            MovieAction::Seed { dir } => commands::movies::run_seed(&ctx, dir),
        },
        Commands::User { action } => match action {
            UserAction::Add {
                username,
                password_hash,
            } => commands::users::run_add(&ctx, &username, &password_hash),
            UserAction::List => commands::users::run_list(&ctx),
            UserAction::Rename { id, username } => commands::users::run_rename(&ctx, id, &username),
            UserAction::Delete { id } => commands::users::run_delete(&ctx, id),
        },
        Commands::Admin { action } => match action {
            AdminAction::Export { output } => commands::admin::run_export(&ctx, output),
            AdminAction::Import { file } => commands::admin::run_import(&ctx, &file),
            AdminAction::Stats => commands::admin::run_stats(&ctx),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&ctx),
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::SetPolicy { policy } => commands::config::run_set_policy(policy),
        },
    }
}
