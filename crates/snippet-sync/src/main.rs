//! Update README code snippets from the files they quote.
//!
//! ```bash
//! snippet-sync                 # rewrite README.md in place
//! snippet-sync --check         # exit 1 if any snippet is stale
//! ```

use anyhow::Context as _;
use clap::Parser;
use snippet_sync::{Mode, Options, Status};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "snippet-sync", version, about = "Update README code snippets from source files")]
struct Args {
    /// Verify snippets are up to date without modifying the file.
    #[arg(long)]
    check: bool,

    /// Path to the Markdown file.
    #[arg(long, default_value = "README.md")]
    readme: PathBuf,

    /// Directory snippet paths are relative to.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Prefix for the links under each snippet.
    #[arg(long, env = "SNIPPET_SYNC_BASE_URL", default_value = "https://github.com/mcpmux/mcpmux/blob/main")]
    base_url: String,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let options = Options {
        root: args.root,
        base_url: args.base_url,
    };
    let mode = if args.check { Mode::Check } else { Mode::Write };

    let (status, regenerated) = snippet_sync::sync(&args.readme, &options, mode)
        .with_context(|| format!("syncing snippets in {}", args.readme.display()))?;
    for skipped in &regenerated.skipped {
        eprintln!("Warning: {skipped}");
    }

    let readme = args.readme.display();
    match status {
        Status::UpToDate if mode == Mode::Check => {
            println!("✓ {readme} code snippets are up to date");
        }
        Status::UpToDate => println!("✓ {readme} already up to date"),
        Status::Updated => println!("✓ Updated {readme}"),
        Status::Outdated => {
            eprintln!("Error: {readme} has outdated code snippets. Run 'snippet-sync' to update.");
        }
    }
    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
