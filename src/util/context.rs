//! Global context for freshen operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::config::{self, Config};

/// Configuration file names, in discovery order.
///
/// `package.json` only counts when it has a `"freshen"` key.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "freshen.json",
    "freshen.yaml",
    ".github/freshen.json",
    ".gitlab/freshen.json",
    ".freshenrc",
    ".freshenrc.json",
    ".freshenrc.yaml",
    "package.json",
];

/// Key holding the configuration inside `package.json`.
pub const PACKAGE_JSON_KEY: &str = "freshen";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global freshen data (~/.freshen/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(".freshen"));
        let config = config::load_config(
            &home.join("config.toml"),
            &config::project_config_path(&cwd),
        );

        GlobalContext {
            cwd,
            home,
            verbose: false,
            color: true,
            config,
        }
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the freshen home directory (~/.freshen/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if color output is enabled.
    pub fn color(&self) -> bool {
        self.color
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Find the repository's configuration file in the working directory.
    pub fn find_config_file(&self) -> Option<PathBuf> {
        find_config_file(&self.cwd)
    }
}

/// Find the configuration file in `root`, following [`CONFIG_FILE_NAMES`].
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| {
            if !path.is_file() {
                return false;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some("package.json") {
                return package_json_has_config(path);
            }
            true
        })
}

fn package_json_has_config(path: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };
    match serde_json::from_str::<serde_json::Value>(&contents) {
        Ok(value) => value.get(PACKAGE_JSON_KEY).is_some(),
        Err(e) => {
            tracing::debug!("ignoring unparsable {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        assert!(ctx.home().to_string_lossy().contains(".freshen"));
        assert!(ctx.config_path().ends_with("config.toml"));
    }

    #[test]
    fn test_find_config_file_order() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".freshenrc"), "{}").unwrap();
        std::fs::create_dir(tmp.path().join(".github")).unwrap();
        std::fs::write(tmp.path().join(".github/freshen.json"), "{}").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(
            ctx.find_config_file(),
            Some(tmp.path().join(".github/freshen.json"))
        );

        std::fs::write(tmp.path().join("freshen.yaml"), "extends: []\n").unwrap();
        assert_eq!(ctx.find_config_file(), Some(tmp.path().join("freshen.yaml")));
    }

    #[test]
    fn test_find_config_file_package_json_needs_key() {
        let tmp = TempDir::new().unwrap();
        let package_json = tmp.path().join("package.json");

        std::fs::write(&package_json, r#"{"name": "app"}"#).unwrap();
        assert_eq!(find_config_file(tmp.path()), None);

        std::fs::write(&package_json, r#"{"name": "app", "freshen": {}}"#).unwrap();
        assert_eq!(find_config_file(tmp.path()), Some(package_json));
    }

    #[test]
    fn test_project_config_loaded() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".freshen")).unwrap();
        std::fs::write(
            tmp.path().join(".freshen/config.toml"),
            "[migration.preset-renames]\n\"@acme/old\" = \"@acme/new\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        assert_eq!(ctx.config().preset_renames().resolve("@acme/old"), "@acme/new");
    }
}
