//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cinelist_lib::{RankUpdate, ReorderPolicy};

#[derive(Parser)]
#[command(name = "cinelist")]
#[command(about = "Ranked movie lists with shareable read-only and owner links", long_about = None)]
pub(crate) struct Cli {
    /// SQLite database file (overrides CINELIST_DB and settings.toml)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create, view, and edit lists
    List {
        #[command(subcommand)]
        action: ListAction,
    },

    /// Manage the movie catalog
    Movie {
        #[command(subcommand)]
        action: MovieAction,
    },

    /// Administer user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Export, import, and inspect the whole dataset
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// How to pick the movie for `list add`.
///
/// `--movie-id` alone names an existing record, `--title` alone matches or
/// creates by title, and both together describe an externally keyed record.
#[derive(Args, Clone)]
pub(crate) struct MovieArgs {
    /// Catalog ID of the movie
    #[arg(long, required_unless_present = "title")]
    pub movie_id: Option<i64>,

    /// Movie title (matched case-insensitively)
    #[arg(long)]
    pub title: Option<String>,

    /// Poster path or URL, used only when the movie is created
    #[arg(long, requires = "title")]
    pub poster: Option<String>,

    /// Release date or year, used only when the movie is created
    #[arg(long, requires = "title")]
    pub release: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum ListAction {
    /// Create an empty list and print its two identifiers
    Create {
        /// Owning user ID; omitted means an anonymous caller, which is refused
        #[arg(long)]
        owner: Option<i64>,

        /// List name
        name: String,
    },

    /// Show a list by public or private identifier
    Show {
        identifier: String,
    },

    /// Show every list a user owns
    Mine {
        /// Owning user ID; omitted means an anonymous caller, which is refused
        #[arg(long)]
        owner: Option<i64>,
    },

    /// Append a movie to the end of a list
    Add {
        /// Private identifier of the list
        private_id: String,

        #[command(flatten)]
        movie: MovieArgs,

        /// Annotation for the entry
        #[arg(long)]
        note: Option<String>,
    },

    /// Move entries to new ranks (ENTRY=RANK ...)
    Reorder {
        /// Private identifier of the list
        private_id: String,

        /// Rank updates, e.g. 12=0 15=1
        #[arg(required = true, value_parser = parse_rank_update)]
        updates: Vec<RankUpdate>,

        /// Override the configured duplicate-rank policy
        #[arg(long, value_parser = parse_policy)]
        policy: Option<ReorderPolicy>,
    },

    /// Remove an entry (remaining ranks are kept)
    Remove {
        private_id: String,
        entry_id: i64,
    },

    /// Set or clear an entry's annotation
    Note {
        private_id: String,
        entry_id: i64,

        /// New annotation; omit to clear
        text: Option<String>,
    },

    /// Rename a list
    Rename {
        private_id: String,
        name: String,
    },

    /// Delete a list and all its entries
    Delete {
        private_id: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum MovieAction {
    /// Add a user-created movie, or show the existing match
    Create {
        title: String,

        #[arg(long)]
        poster: Option<String>,

        #[arg(long)]
        release: Option<String>,
    },

    /// List movies added by users rather than the catalog seed
    Custom,

    /// Delete a movie and every list entry that references it
    Delete {
        id: i64,
    },

    /// Reconcile the canonical movie set from the catalog directory
    Seed {
        /// Catalog directory (default: settings, then ./catalog)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub(crate) enum UserAction {
    /// Register a user with a precomputed password hash
    Add {
        username: String,

        #[arg(long)]
        password_hash: String,
    },

    /// List users with their list counts (admin account hidden)
    List,

    /// Change a user's name
    Rename {
        id: i64,
        username: String,
    },

    /// Delete a user together with their lists
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub(crate) enum AdminAction {
    /// Write a snapshot of the whole dataset
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge a snapshot into the database
    Import {
        file: PathBuf,
    },

    /// Show row counts and recent imports
    Stats,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings and where they come from
    Show,

    /// Print the settings file path
    Path,

    /// Persist the duplicate-rank policy used by `list reorder`
    SetPolicy {
        #[arg(value_parser = parse_policy)]
        policy: ReorderPolicy,
    },
}

/// Parse `ENTRY=RANK`.
pub(crate) fn parse_rank_update(s: &str) -> Result<RankUpdate, String> {
    let (entry, rank) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ENTRY=RANK, got '{s}'"))?;
    let entry_id = entry
        .trim()
        .parse()
        .map_err(|_| format!("invalid entry id '{entry}'"))?;
    let rank = rank
        .trim()
        .parse()
        .map_err(|_| format!("invalid rank '{rank}'"))?;
    Ok(RankUpdate::new(entry_id, rank))
}

fn parse_policy(s: &str) -> Result<ReorderPolicy, String> {
    s.parse().map_err(|e: cinelist_lib::StoreError| e.to_string())
}
