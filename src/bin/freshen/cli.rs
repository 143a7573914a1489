//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// freshen - configuration migration and release lookup for dependency updates
#[derive(Parser)]
#[command(name = "freshen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate a configuration file to the current schema
    Migrate(MigrateArgs),

    /// List the releases of a dependency
    Releases(ReleasesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct MigrateArgs {
    /// Configuration file (discovered in the current directory by default)
    pub path: Option<PathBuf>,

    /// Write the migrated configuration back to the file
    #[arg(long, conflicts_with = "check")]
    pub write: bool,

    /// Exit with an error if the configuration needs migration
    #[arg(long)]
    pub check: bool,

    /// Configuration the file is read on top of
    #[arg(long, value_name = "FILE")]
    pub parent: Option<PathBuf>,

    /// Rewrite a preset reference in `extends` (an empty TO removes it)
    #[arg(long = "preset-rename", value_name = "FROM=TO")]
    pub preset_renames: Vec<String>,
}

#[derive(Args)]
pub struct ReleasesArgs {
    /// Datasource id (git-refs, git-tags)
    pub datasource: String,

    /// Dependency name, for git datasources the repository URL
    pub dep_name: String,

    /// Registry to query; may be repeated
    #[arg(long = "registry-url", value_name = "URL")]
    pub registry_urls: Vec<String>,

    /// How answers from several registries are combined (first, hunt, merge)
    #[arg(long)]
    pub strategy: Option<String>,

    /// Regex with a named `version` group applied to every version
    #[arg(long, value_name = "REGEX")]
    pub extract_version: Option<String>,

    /// Version validation and ordering (semver, loose)
    #[arg(long)]
    pub versioning: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Don't contact registries
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
