//! Command-line companion to the arcview GUI.
//!
//! Prints the tree of an archive, or extracts one member of it, using the
//! same index the GUI browses.

use arcview_archive::{
    AppContext, ArchiveTree, Command, LaunchMode, Response, TreePresenter, View,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "arcview-cli")]
#[command(version, about = "Browse and extract archives from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the directory tree of an archive
    Tree {
        /// Archive file to index
        archive: PathBuf,

        /// Output the index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract one file or directory of an archive
    Extract {
        /// Archive file to read
        archive: PathBuf,

        /// Path of the member inside the archive
        member: String,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tree { archive, json } => handle_tree(archive, json),
        Commands::Extract {
            archive,
            member,
            out,
        } => handle_extract(archive, member, out),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn handle_tree(archive: PathBuf, json: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let tree = ArchiveTree::index(&archive)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(0);
    }

    println!("{} ({}, {} entries)", archive.display(), tree.format(), tree.len());
    print_children(&TreePresenter::new(&tree), "", 1);
    Ok(0)
}

fn print_children(presenter: &TreePresenter<'_>, node: &str, depth: usize) {
    for row in presenter.rows_of(node) {
        let indent = "  ".repeat(depth);
        if row.is_branch || row.display_size.is_empty() {
            println!("{}{}/", indent, row.display_name);
        } else {
            println!("{}{}  {}", indent, row.display_name, row.display_size);
        }
        if row.is_branch {
            print_children(presenter, &row.id, depth + 1);
        }
    }
}

fn handle_extract(
    archive: PathBuf,
    member: String,
    out: PathBuf,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut ctx = AppContext::init(&LaunchMode::Open(archive));
    if let View::OpenArchive { error: Some(error) } = ctx.run() {
        return Err(error.into());
    }

    let request = ctx
        .presenter()
        .and_then(|presenter| presenter.render_row(&member))
        .ok_or_else(|| format!("No member named {} in the archive", member))?
        .extract
        .with_destination(Some(out));

    if let Response::Extract(job) = ctx.dispatch(Command::ExtractEntry(request)) {
        tracing::info!(member = %job.entry().path, destination = %job.destination().display(), "starting extraction");
        let outcome = job.run();
        ctx.finish(outcome);
    }

    Ok(ctx.shutdown())
}
