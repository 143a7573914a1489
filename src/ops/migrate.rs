//! Implementation of `freshen migrate`.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::core::document::Document;
use crate::migration::{MigrationResult, Migrator, PresetRenames};
use crate::util::context::PACKAGE_JSON_KEY;
use crate::util::diagnostic::{suggestions, ConfigParseError};
use crate::util::GlobalContext;

/// On-disk format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    /// The `"freshen"` key of a `package.json`
    PackageJson,
}

impl ConfigFormat {
    /// Guess the format from the file name. Unknown extensions are JSON.
    pub fn from_path(path: &Path) -> Self {
        if path.file_name().and_then(|n| n.to_str()) == Some("package.json") {
            return ConfigFormat::PackageJson;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFormat::Json => write!(f, "json"),
            ConfigFormat::Yaml => write!(f, "yaml"),
            ConfigFormat::PackageJson => write!(f, "package.json"),
        }
    }
}

/// A configuration document read from disk.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub document: Document,
    /// The whole `package.json`, kept so the rest of it survives `--write`
    package_json: Option<Document>,
}

impl ConfigFile {
    /// Read and parse a configuration file.
    ///
    /// Syntax errors are reported as a [`ConfigParseError`] pointing at the
    /// failing line and column.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read file: {}", path.display()))?;
        let format = ConfigFormat::from_path(path);

        let value: Value = match format {
            ConfigFormat::Json | ConfigFormat::PackageJson => serde_json::from_str(&source)
                .map_err(|e| ConfigParseError::from_json(path, &source, &e))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&source)
                .map_err(|e| ConfigParseError::from_yaml(path, &source, &e))?,
        };
        let Value::Object(mut root) = value else {
            return Err(
                ConfigParseError::at(path, &source, 1, 1, "expected an object at the top level")
                    .into(),
            );
        };

        if format != ConfigFormat::PackageJson {
            return Ok(ConfigFile {
                path: path.to_path_buf(),
                format,
                document: root,
                package_json: None,
            });
        }

        let document = match root.get_mut(PACKAGE_JSON_KEY).map(Value::take) {
            Some(Value::Object(doc)) => doc,
            Some(_) => bail!(
                "`{}` in {} must be an object",
                PACKAGE_JSON_KEY,
                path.display()
            ),
            None => bail!("{} has no `{}` key", path.display(), PACKAGE_JSON_KEY),
        };
        Ok(ConfigFile {
            path: path.to_path_buf(),
            format,
            document,
            package_json: Some(root),
        })
    }

    /// Render `document` in this file's format.
    ///
    /// JSON is pretty-printed with a trailing newline.
    pub fn render(&self, document: &Document) -> Result<String> {
        match self.format {
            ConfigFormat::Json => render_json(document),
            ConfigFormat::Yaml => {
                serde_yaml::to_string(document).context("failed to serialize configuration")
            }
            ConfigFormat::PackageJson => {
                let mut package = self.package_json.clone().unwrap_or_default();
                package.insert(
                    PACKAGE_JSON_KEY.to_string(),
                    Value::Object(document.clone()),
                );
                render_json(&package)
            }
        }
    }
}

fn render_json(document: &Document) -> Result<String> {
    let mut out =
        serde_json::to_string_pretty(document).context("failed to serialize configuration")?;
    out.push('\n');
    Ok(out)
}

/// Options for migrating a configuration file.
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    /// Configuration file; discovered in the working directory when absent
    pub path: Option<PathBuf>,

    /// Configuration the file is read on top of
    pub parent: Option<PathBuf>,

    /// Write the migrated configuration back to the file
    pub write: bool,

    /// Extra preset renames, applied over the tool configuration's
    pub preset_renames: PresetRenames,
}

/// Result of a migration run.
#[derive(Debug)]
pub struct MigrateOutcome {
    pub file: ConfigFile,
    pub result: MigrationResult,
    /// Migrated configuration in the file's format
    pub rendered: String,
    /// Whether the file was rewritten
    pub written: bool,
}

/// Migrate a configuration file.
pub fn migrate(ctx: &GlobalContext, opts: &MigrateOptions) -> Result<MigrateOutcome> {
    let path = match &opts.path {
        Some(path) => ctx.cwd().join(path),
        None => match ctx.find_config_file() {
            Some(path) => path,
            None => bail!(
                "no configuration file found in {}\n{}",
                ctx.cwd().display(),
                suggestions::NO_CONFIG
            ),
        },
    };
    tracing::debug!("migrating {}", path.display());

    let file = ConfigFile::load(&path)?;
    let parent = opts
        .parent
        .as_ref()
        .map(|p| ConfigFile::load(&ctx.cwd().join(p)))
        .transpose()?;

    let mut renames = ctx.config().preset_renames();
    renames.extend(opts.preset_renames.clone());
    let migrator = Migrator::new().with_preset_renames(renames);
    let result = migrator.migrate(&file.document, parent.as_ref().map(|p| &p.document));

    let rendered = file.render(&result.migrated_config)?;
    let written = opts.write && result.is_migrated;
    if written {
        std::fs::write(&file.path, &rendered)
            .with_context(|| format!("failed to write file: {}", file.path.display()))?;
        tracing::info!("migrated {}", file.path.display());
    } else if !result.is_migrated {
        tracing::debug!("{} is up to date", file.path.display());
    }

    Ok(MigrateOutcome {
        file,
        result,
        rendered,
        written,
    })
}

/// Top-level options that differ between `before` and `after`, in
/// `before` order followed by options only `after` has.
pub fn changed_options(before: &Document, after: &Document) -> Vec<String> {
    let mut changed: Vec<String> = before
        .iter()
        .filter(|(key, value)| after.get(*key) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect();
    changed.extend(
        after
            .keys()
            .filter(|key| !before.contains_key(*key))
            .cloned(),
    );
    changed
}
