mod cmd_admin;
mod cmd_commit;
mod cmd_list;
mod cmd_nav;
mod host;

use anyhow::Result;
use clap::{Parser, Subcommand};
use snapvault::{VersionId, VersionTag};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "snapvault")]
#[command(about = "File-scoped version control for large opaque documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output machine-readable JSON where a command supports it
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a new version of a document
    Commit {
        /// The document to snapshot
        file: PathBuf,

        /// Note stored with the version
        #[arg(short, long)]
        note: Option<String>,

        /// Skip the retention pass after committing
        #[arg(long)]
        no_prune: bool,
    },
    /// List a document's recorded versions
    List {
        file: PathBuf,

        /// Only versions carrying this tag
        #[arg(long)]
        tag: Option<VersionTag>,

        /// Only locked versions
        #[arg(long)]
        locked: bool,

        /// Only versions whose note contains this text
        #[arg(long)]
        find: Option<String>,
    },
    /// Show whether a path is live or a checked-out snapshot
    Status {
        file: PathBuf,
    },
    /// Report per-object change history
    Objects {
        file: PathBuf,

        /// Limit to one object
        #[arg(long)]
        name: Option<String>,

        /// Include unchanged (record-only) entries
        #[arg(long)]
        records: bool,
    },
    /// Resolve a version's snapshot path for opening
    Checkout {
        file: PathBuf,
        id: VersionId,
    },
    /// Overwrite the parent document with this snapshot (backs the parent up
    /// first)
    Restore {
        /// A checked-out snapshot path
        file: PathBuf,
    },
    /// Print the parent document of a snapshot
    Parent {
        file: PathBuf,
    },
    /// Copy a snapshot out as a new document with a fresh history
    Fork {
        /// A checked-out snapshot path
        file: PathBuf,
    },
    /// Apply the retention policy now
    Prune {
        file: PathBuf,

        /// Override the configured number of unlocked versions to keep
        #[arg(long)]
        max_keep: Option<usize>,
    },
    /// Tag a version (none, stable, milestone, experiment, bug)
    Tag {
        file: PathBuf,
        id: VersionId,
        tag: VersionTag,
    },
    /// Protect a version from deletion and pruning
    Lock {
        file: PathBuf,
        id: VersionId,
    },
    /// Remove a version's protection
    Unlock {
        file: PathBuf,
        id: VersionId,
    },
    /// Replace a version's note
    Note {
        file: PathBuf,
        id: VersionId,
        text: String,
    },
    /// Delete a version (locked versions are refused)
    Delete {
        file: PathBuf,

        /// Version id, e.g. v001
        id: String,

        /// Remove outright instead of using the platform trash
        #[arg(long)]
        no_trash: bool,
    },
    /// Adopt an existing history directory for this document
    Link {
        file: PathBuf,

        /// History directory (or its manifest.json) to move into place
        source: PathBuf,
    },
    /// Run one autosave scheduling decision
    AutosaveTick {
        file: PathBuf,

        /// Override the configured interval in minutes
        #[arg(long)]
        interval: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Commit {
            file,
            note,
            no_prune,
        } => cmd_commit::commit(&file, note, no_prune, cli.json),
        Commands::List {
            file,
            tag,
            locked,
            find,
        } => cmd_list::list(&file, tag, locked, find.as_deref(), cli.json),
        Commands::Status { file } => cmd_list::status(&file, cli.json),
        Commands::Objects {
            file,
            name,
            records,
        } => cmd_list::objects(&file, name.as_deref(), records, cli.json),
        Commands::Checkout { file, id } => cmd_nav::checkout(&file, id),
        Commands::Restore { file } => cmd_nav::restore(&file),
        Commands::Parent { file } => cmd_nav::parent(&file),
        Commands::Fork { file } => cmd_nav::fork(&file),
        Commands::Prune { file, max_keep } => cmd_admin::prune(&file, max_keep),
        Commands::Tag { file, id, tag } => cmd_admin::tag(&file, id, tag),
        Commands::Lock { file, id } => cmd_admin::set_lock(&file, id, true),
        Commands::Unlock { file, id } => cmd_admin::set_lock(&file, id, false),
        Commands::Note { file, id, text } => cmd_admin::note(&file, id, text),
        Commands::Delete { file, id, no_trash } => cmd_admin::delete(&file, &id, no_trash),
        Commands::Link { file, source } => cmd_admin::link(&file, &source),
        Commands::AutosaveTick { file, interval } => cmd_commit::autosave_tick(&file, interval),
    }
}
