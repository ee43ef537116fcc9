// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - add:    fetch docs from GitHub or an llms.txt URL and index them
// - list:   show the blocks currently in the target document
// - remove: delete a block (and, by default, its local files)
// - index:  print the compressed index of any local folder
//
// Rust concepts:
// - derive(Parser): clap builds the parser from the struct definition
// - #[command(flatten)]: share one group of flags between subcommands
// - Doc comments (///) on fields become the --help text
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Settings, DEFAULT_API_URL, DEFAULT_RAW_URL};

#[derive(Parser, Debug)]
#[command(
    name = "docpin",
    version,
    about = "Pin remote Markdown docs locally and index them in AGENTS.md",
    long_about = "docpin downloads the documentation folder of a GitHub repository (or a single \
                  llms.txt manifest), stores it next to your project, and keeps a compact index \
                  of it inside a shared instructions file such as AGENTS.md."
)]
pub struct Cli {
    /// Show debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Hide progress output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download docs and add (or refresh) their block in the target file
    ///
    /// Example: docpin add https://github.com/vercel/next.js --path docs
    Add(AddArgs),

    /// List the docpin blocks in the target file
    List {
        #[command(flatten)]
        target: TargetArgs,

        /// Output the identifiers as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a block from the target file
    Remove {
        /// Block identifier, as shown by `docpin list`
        id: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Keep the downloaded files on disk
        #[arg(long)]
        keep_files: bool,
    },

    /// Print the compressed index of a local directory
    Index {
        /// Directory to index
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// GitHub repository (github.com/<owner>/<repo>[/tree/<branch>]) or llms.txt URL
    pub source: String,

    /// Folder inside the repository to take docs from (auto-detected by default)
    #[arg(long)]
    pub path: Option<String>,

    /// Branch to try first before main, master, develop, dev
    #[arg(long)]
    pub branch: Option<String>,

    /// Block identifier (defaults to <owner>-<repo> or the manifest host)
    #[arg(long)]
    pub name: Option<String>,

    /// Title shown in the block (defaults to the repository name)
    #[arg(long)]
    pub title: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Do not add the output directory to .gitignore
    #[arg(long)]
    pub no_gitignore: bool,

    /// Print a JSON summary instead of text
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

/// Where blocks and downloaded files live.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Document that holds the index blocks
    #[arg(long, default_value = "AGENTS.md")]
    pub target: PathBuf,

    /// Directory that downloaded docs are stored under
    #[arg(long, default_value = ".docpin")]
    pub output: PathBuf,
}

/// How to reach GitHub.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// GitHub token, sent as a bearer token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "DOCPIN_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Raw file base URL
    #[arg(long, env = "DOCPIN_RAW_URL", default_value = DEFAULT_RAW_URL)]
    pub raw_url: String,
}

impl RemoteArgs {
    pub fn settings(&self) -> Settings {
        Settings {
            api_url: self.api_url.clone(),
            raw_url: self.raw_url.clone(),
            token: self.token.clone(),
            ..Settings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_defaults() {
        let cli = Cli::try_parse_from(["docpin", "add", "github.com/o/r", "--path", "docs"]).unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.source, "github.com/o/r");
                assert_eq!(args.path.as_deref(), Some("docs"));
                assert_eq!(args.target.target, PathBuf::from("AGENTS.md"));
                assert_eq!(args.target.output, PathBuf::from(".docpin"));
                assert!(!args.no_gitignore);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_remove() {
        let cli = Cli::try_parse_from(["docpin", "-q", "remove", "o-r", "--keep-files"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Remove { ref id, keep_files: true, .. } if id == "o-r"
        ));
    }
}
