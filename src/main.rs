// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = error)
//
// `add` is the full pipeline:
//   source -> tree (branch fallback) -> selection -> download -> index -> block
// or, for an llms.txt URL:
//   source -> manifest download -> index -> block
//
// A download where some files failed but at least one succeeded still exits 0;
// the failed paths are listed for the user.
//
// Rust concepts:
// - #[tokio::main]: turns async fn main into a normal main with a runtime
// - anyhow::Result: one error type for the top level, with context attached
// - Modules: each `mod x;` line pulls in src/x.rs or src/x/mod.rs
// =============================================================================

mod block;
mod cli;
mod config;
mod error;
mod fsio;
mod github;
mod gitignore;
mod index;
mod manifest;
mod source;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use block::{DocumentBlock, UpsertAction};
use cli::{AddArgs, Cli, Commands, TargetArgs};
use error::DocResult;
use github::GithubClient;
use index::DocIndex;
use source::{ManifestSource, RepoSource, SourceLocator};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Run the command and convert the result into an exit code
    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {e:#}");
            1
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for --json output.
// RUST_LOG overrides the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "docpin=debug" } else { "docpin=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Add(args) => handle_add(args, cli.quiet).await,
        Commands::List { target, json } => handle_list(&target, json),
        Commands::Remove {
            id,
            target,
            keep_files,
        } => handle_remove(&id, &target, keep_files),
        Commands::Index { dir } => {
            let index = index::build_index(&dir)?;
            println!("{}", index.render());
            Ok(())
        }
    }
}

// Summary printed at the end of `add`
#[derive(Debug, Serialize)]
struct AddSummary {
    id: String,
    title: String,
    source: String,
    branch: Option<String>,
    path: Option<String>,
    auto_detected: bool,
    truncated: bool,
    downloaded: usize,
    total: usize,
    failed: Vec<String>,
    local_root: PathBuf,
    target: PathBuf,
    action: UpsertAction,
}

// Everything the fetch stage hands to the index/merge stage
struct Fetched {
    title: String,
    index: DocIndex,
    branch: Option<String>,
    path: Option<String>,
    auto_detected: bool,
    truncated: bool,
    downloaded: usize,
    total: usize,
    failed: Vec<String>,
}

// Handles the 'add' subcommand
//
// Steps:
// 1. Parse the source and work out the block identifier
// 2. Fetch the docs (repository or manifest) into <output>/<id>
// 3. Render the block and upsert it into the target document
// 4. Make sure <output> is in .gitignore (best effort)
// 5. Print a summary
async fn handle_add(args: AddArgs, quiet: bool) -> Result<()> {
    // Step 1: what are we fetching, and under which name?
    let locator = source::parse_source(&args.source)?;

    let id = match (&args.name, &locator) {
        (Some(name), _) => name.trim().to_string(),
        (None, SourceLocator::Repository(repo)) => repo.default_id(),
        (None, SourceLocator::Manifest(manifest)) => manifest.host().replace('.', "-"),
    };
    // Fail on a bad identifier before any network traffic
    block::validate_id(&id)?;
    let local_root = github::resolve_inside(&args.target.output, &id)?;

    if !quiet {
        eprintln!("🔍 Fetching docs for '{}' from {}", id, args.source);
    }

    // Step 2: download; a --branch flag overrides the one in the URL
    let fetched = match locator {
        SourceLocator::Repository(mut repo) => {
            if let Some(branch) = &args.branch {
                repo.branch = branch.trim().to_string();
            }
            fetch_repository(&args, &repo, &id, &local_root, quiet).await?
        }
        SourceLocator::Manifest(manifest) => {
            fetch_manifest(&args, &manifest, &local_root).await?
        }
    };

    // Step 3: the block's root line is written from the document's point of view
    let target_dir = document_dir(&args.target.target);
    let block = DocumentBlock {
        id: id.clone(),
        title: fetched.title.clone(),
        root: relative_root(target_dir, &local_root)?,
        index: fetched.index.render(),
    };
    let action = block::upsert_file(&args.target.target, &id, &block.body())?;

    // Step 4: never fails the command
    if !args.no_gitignore {
        match gitignore_entry(target_dir, &args.target.output) {
            Some(entry) => {
                if let Err(e) = gitignore::ensure_ignored(target_dir, &entry) {
                    warn!("could not update .gitignore: {e}");
                }
            }
            None => warn!(
                "{} is not inside {}; not adding it to .gitignore",
                args.target.output.display(),
                target_dir.display()
            ),
        }
    }

    // Step 5
    let summary = AddSummary {
        id,
        title: fetched.title,
        source: args.source.clone(),
        branch: fetched.branch,
        path: fetched.path,
        auto_detected: fetched.auto_detected,
        truncated: fetched.truncated,
        downloaded: fetched.downloaded,
        total: fetched.total,
        failed: fetched.failed,
        local_root,
        target: args.target.target.clone(),
        action,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

// Repository source: tree -> selection -> download -> index
//
// Files are downloaded into a hidden sibling directory and indexed there.
// The previous copy at local_root is only replaced once both steps have
// succeeded; on any failure it stays exactly as it was.
async fn fetch_repository(
    args: &AddArgs,
    repo: &RepoSource,
    id: &str,
    local_root: &Path,
    quiet: bool,
) -> Result<Fetched> {
    let client = GithubClient::new(args.remote.settings())?;

    // Resolve the branch and list every path on it
    let tree = github::fetch_tree(&client, &repo.owner, &repo.repo, &repo.branch).await?;
    let selection = github::select_docs(&tree.entries, args.path.as_deref().unwrap_or(""))?;

    if !quiet {
        let how = if selection.auto_detected { " (auto-detected)" } else { "" };
        eprintln!(
            "📄 Found {} file(s) in '{}'{} on branch '{}'",
            selection.entries.len(),
            github::display_path(&selection.effective_path),
            how,
            tree.branch
        );
    }

    // Start from an empty staging directory (a crashed earlier run may have
    // left one behind)
    let staging = staging_dir(local_root);
    remove_dir_if_exists(&staging)?;

    let bar = progress_bar(selection.entries.len(), quiet);
    let result = github::download_selection(
        &client,
        &repo.owner,
        &repo.repo,
        &tree.branch,
        &selection,
        &staging,
        |succeeded, _total, path| {
            bar.set_message(format!("{succeeded} ok, {path}"));
            bar.inc(1);
        },
    )
    .await;
    bar.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            discard_staging(&staging);
            return Err(e.into());
        }
    };

    // Index the staged files under the final name, before touching local_root
    let index = match index::build_named_index(&outcome.local_root, id) {
        Ok(index) => index,
        Err(e) => {
            discard_staging(&staging);
            return Err(e.into());
        }
    };
    debug!(files = index.file_count(), "index built");

    // Swap the staged copy in
    remove_dir_if_exists(local_root)?;
    std::fs::rename(&outcome.local_root, local_root).with_context(|| {
        format!(
            "could not move {} to {}",
            outcome.local_root.display(),
            local_root.display()
        )
    })?;

    Ok(Fetched {
        title: args.title.clone().unwrap_or_else(|| repo.repo.clone()),
        index,
        branch: Some(tree.branch),
        path: Some(github::display_path(&selection.effective_path)),
        auto_detected: selection.auto_detected,
        truncated: tree.truncated,
        downloaded: outcome.succeeded,
        total: outcome.total,
        failed: outcome.failed,
    })
}

// Manifest source: one file, indexed without walking
async fn fetch_manifest(
    args: &AddArgs,
    manifest: &ManifestSource,
    local_root: &Path,
) -> Result<Fetched> {
    let settings = args.remote.settings();
    let http = settings.http_client()?;

    let outcome = manifest::download_manifest(&http, &settings, manifest, local_root).await?;
    debug!(file = %outcome.file.display(), "manifest saved");

    // A manifest is not a Markdown file, so it is indexed directly
    let root_name = local_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| manifest.host().to_string());
    let mut index = DocIndex::new(root_name);
    index.insert(outcome.file_name);

    // --title, then the manifest's own "# " heading, then the host name
    let title = args
        .title
        .clone()
        .or(outcome.heading)
        .unwrap_or_else(|| manifest.host().to_string());

    Ok(Fetched {
        title,
        index,
        branch: None,
        path: None,
        auto_detected: false,
        truncated: false,
        downloaded: outcome.files,
        total: outcome.files,
        failed: Vec::new(),
    })
}

fn handle_list(target: &TargetArgs, json: bool) -> Result<()> {
    let ids = block::list_file(&target.target)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ids)?);
    } else if ids.is_empty() {
        println!("No docpin blocks in {}", target.target.display());
    } else {
        for id in ids {
            println!("{id}");
        }
    }
    Ok(())
}

fn handle_remove(id: &str, target: &TargetArgs, keep_files: bool) -> Result<()> {
    let removed = block::remove_file(&target.target, id)?;

    if removed {
        println!("🗑️  Removed block '{}' from {}", id, target.target.display());
    } else {
        println!("No block '{}' in {}", id, target.target.display());
    }

    if !keep_files {
        // Best effort: the block is already gone
        match github::resolve_inside(&target.output, id) {
            Ok(dir) => {
                if let Err(e) = remove_dir_if_exists(&dir) {
                    warn!("could not delete {}: {e:#}", dir.display());
                }
            }
            Err(e) => warn!("not deleting local files: {e}"),
        }
    }
    Ok(())
}

fn print_summary(summary: &AddSummary) {
    println!(
        "✅ Indexed {}/{} file(s) for '{}' into {} ({})",
        summary.downloaded,
        summary.total,
        summary.id,
        summary.target.display(),
        match summary.action {
            UpsertAction::Created => "created",
            UpsertAction::Appended => "added",
            UpsertAction::Updated => "updated",
            UpsertAction::Unchanged => "unchanged",
        }
    );

    if !summary.failed.is_empty() {
        println!("⚠️  {} file(s) could not be downloaded:", summary.failed.len());
        for path in &summary.failed {
            println!("   - {path}");
        }
    }
}

fn progress_bar(total: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {wide_msg}") {
        bar.set_style(style);
    }
    bar
}

// Directory the target document lives in ("" becomes ".")
fn document_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

// The block's "root:" line: local_root as seen from the document's directory,
// e.g. "./.docpin/react" or "../.docpin/react"
fn relative_root(document_dir: &Path, local_root: &Path) -> DocResult<String> {
    let relative = slash_path(&fsio::relative_path(document_dir, local_root)?);

    if relative == ".." || relative.starts_with("../") || Path::new(&relative).is_absolute() {
        Ok(relative)
    } else {
        Ok(format!("./{relative}"))
    }
}

// The .gitignore line for `output`, relative to the document's directory.
// None when output is not below that directory (a .gitignore cannot list it).
fn gitignore_entry(document_dir: &Path, output: &Path) -> Option<String> {
    let relative = slash_path(&fsio::relative_path(document_dir, output).ok()?);

    let outside = relative.is_empty()
        || relative == ".."
        || relative.starts_with("../")
        || Path::new(&relative).is_absolute();
    (!outside).then_some(relative)
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn staging_dir(local_root: &Path) -> PathBuf {
    let name = local_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    local_root.with_file_name(format!(".{name}.partial"))
}

// Best effort: the error that got us here is the one worth reporting
fn discard_staging(staging: &Path) {
    if let Err(e) = remove_dir_if_exists(staging) {
        warn!("could not clean up {}: {e:#}", staging.display());
    }
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(error::DocError::from_io(dir, e).into()),
    }
}
