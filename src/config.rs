//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dirtree/dirtree.toml`
//! 3. Explicit config: `--config <file>`
//! 4. Environment variables: `DIRTREE_*` prefix
//!
//! The tree engine itself reads no configuration; these settings are applied
//! by whoever composes an engine (see [`crate::application::Session::from_settings`]).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::ParentPolicy;

/// Nodes inserted into a fresh session before any user command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    /// Name of the root directory; an empty value leaves the tree empty
    pub root: String,
    /// Directories created under the root, in order
    pub directories: Vec<String>,
    /// Files created under the root after the directories
    pub files: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            root: "My Storage".into(),
            directories: vec!["Document".into(), "Archive".into()],
            files: vec![],
        }
    }
}

/// Raw seed config for intermediate parsing (None means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSeedConfig {
    pub root: Option<String>,
    pub directories: Option<Vec<String>>,
    pub files: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub parent_policy: Option<ParentPolicy>,
    pub seed: RawSeedConfig,
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Which nodes may receive children
    pub parent_policy: ParentPolicy,
    pub seed: SeedConfig,
}

impl SeedConfig {
    /// Overlay wins field by field; arrays are replaced, not merged.
    pub fn merge(&self, overlay: &RawSeedConfig) -> Self {
        Self {
            root: overlay.root.clone().unwrap_or_else(|| self.root.clone()),
            directories: overlay
                .directories
                .clone()
                .unwrap_or_else(|| self.directories.clone()),
            files: overlay.files.clone().unwrap_or_else(|| self.files.clone()),
        }
    }
}

/// Get the XDG config directory for dirtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dirtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dirtree.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_path(path: &str) -> PathBuf {
    shellexpand::full(path)
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| PathBuf::from(path))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            parent_policy: overlay.parent_policy.unwrap_or(self.parent_policy),
            seed: self.seed.merge(&overlay.seed),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; unlike
    ///   the global file it must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = explicit {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Load settings from a single file on top of the defaults, ignoring the
    /// global config and the environment.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Apply DIRTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("DIRTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("seed.directories")
                .with_list_parse_key("seed.files"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("parent_policy") {
            settings.parent_policy = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("seed.root") {
            settings.seed.root = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("seed.directories") {
            settings.seed.directories = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("seed.files") {
            settings.seed.files = val;
        }

        Ok(settings)
    }

    /// Serialize the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }

    /// Commented template for `dirtree config init`.
    pub fn template() -> String {
        r#"# dirtree configuration
#
# Environment overrides use the DIRTREE_ prefix, e.g.
#   DIRTREE_PARENT_POLICY=directories-only
#   DIRTREE_SEED__DIRECTORIES=Document,Archive

# Which nodes may receive children:
#   "permissive"       any node, files included
#   "directories-only" inserting under a file goes to its nearest directory
parent_policy = "permissive"

[seed]
# Root directory of a fresh tree; "" starts empty
root = "My Storage"
directories = ["Document", "Archive"]
files = []
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_then_seed_matches_initial_storage() {
        let settings = Settings::default();
        assert_eq!(settings.parent_policy, ParentPolicy::Permissive);
        assert_eq!(settings.seed.root, "My Storage");
        assert_eq!(settings.seed.directories, vec!["Document", "Archive"]);
        assert!(settings.seed.files.is_empty());
    }

    #[test]
    fn given_template_when_parsed_then_equals_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let raw: RawSettings = toml::from_str(
            r#"
parent_policy = "directories-only"
[seed]
files = ["README.md"]
"#,
        )
        .expect("parse overlay");

        let merged = Settings::default().merge_with(&raw);

        assert_eq!(merged.parent_policy, ParentPolicy::DirectoriesOnly);
        assert_eq!(merged.seed.root, "My Storage");
        assert_eq!(merged.seed.directories, vec!["Document", "Archive"]);
        assert_eq!(merged.seed.files, vec!["README.md"]);
    }

    #[test]
    fn given_settings_when_serialized_then_roundtrips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().expect("serialize");
        assert!(text.contains("parent_policy = \"permissive\""));
        let back: Settings = toml::from_str(&text).expect("parse");
        assert_eq!(back, settings);
    }
}
