//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/domcascade/domcascade.toml`
//! 3. Explicit config file (`--config <file>`)
//! 4. Environment variables: `DOMCASCADE_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::BuildOptions;

/// Tree construction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSettings {
    /// Types allowed to carry text contents
    pub content_types: Vec<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            content_types: vec!["h1".into(), "p".into()],
        }
    }
}

/// Terminal display settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Types shown by `render`; everything else is a container
    pub visual_types: Vec<String>,
    /// Visual types whose text is upper-cased
    pub uppercase_types: Vec<String>,
    /// Emit ANSI colours (NO_COLOR still wins)
    pub color: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            visual_types: vec!["h1".into(), "p".into()],
            uppercase_types: vec!["h1".into()],
            color: true,
        }
    }
}

/// Raw sections for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawBuildSettings {
    pub content_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderSettings {
    pub visual_types: Option<Vec<String>>,
    pub uppercase_types: Option<Vec<String>>,
    pub color: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub build: RawBuildSettings,
    pub render: RawRenderSettings,
}

/// Overlay a list from a config file onto `base`.
///
/// - Plain items replace the base list entirely
/// - Items prefixed with `!` remove the corresponding item
/// - A list of only `!` items edits the base list in place
///
/// # Examples
/// ```ignore
/// merge_list(&["h1", "p"], &["h2"])        // → ["h2"]
/// merge_list(&["h1", "p"], &["!p"])        // → ["h1"]
/// merge_list(&["h1", "p"], &["h2", "!h2"]) // → []
/// ```
pub fn merge_list(base: &[String], overlay: &[String]) -> Vec<String> {
    let removed: HashSet<&str> = overlay.iter().filter_map(|s| s.strip_prefix('!')).collect();
    let added: Vec<&String> = overlay.iter().filter(|s| !s.starts_with('!')).collect();

    let mut seen = HashSet::new();
    let source: Vec<&String> = if added.is_empty() {
        base.iter().collect()
    } else {
        added
    };
    source
        .into_iter()
        .filter(|s| !removed.contains(s.as_str()))
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

fn merge_opt_list(base: &[String], overlay: &Option<Vec<String>>) -> Vec<String> {
    overlay
        .as_ref()
        .map(|o| merge_list(base, o))
        .unwrap_or_else(|| base.to_vec())
}

/// Unified configuration for domcascade.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub build: BuildSettings,
    pub render: RenderSettings,
}

/// Get the XDG config directory for domcascade.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "domcascade").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("domcascade.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge a raw file layer onto self.
    ///
    /// - Scalars: overlay wins if Some, otherwise keep base
    /// - Lists: see [`merge_list`]
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            build: BuildSettings {
                content_types: merge_opt_list(&self.build.content_types, &overlay.build.content_types),
            },
            render: RenderSettings {
                visual_types: merge_opt_list(&self.render.visual_types, &overlay.render.visual_types),
                uppercase_types: merge_opt_list(
                    &self.render.uppercase_types,
                    &overlay.render.uppercase_types,
                ),
                color: overlay.render.color.unwrap_or(self.render.color),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Config file given on the command line; must exist
    pub fn load(explicit: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_layers(global_config_path().as_deref(), explicit)
    }

    /// Layered load with the global config location passed in.
    ///
    /// A missing `global` file is skipped; a missing `explicit` file is an error.
    pub fn load_layers(global: Option<&Path>, explicit: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!(path = %path.display(), "loading config file");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables (replace, explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply DOMCASCADE_* environment variables as explicit overrides.
    ///
    /// `DOMCASCADE_RENDER__VISUAL_TYPES=h1,h2,p` sets `render.visual_types`.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("DOMCASCADE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("build.content_types")
                .with_list_parse_key("render.visual_types")
                .with_list_parse_key("render.uppercase_types"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get::<Vec<String>>("build.content_types") {
            settings.build.content_types = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("render.visual_types") {
            settings.render.visual_types = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("render.uppercase_types") {
            settings.render.uppercase_types = val;
        }
        if let Ok(val) = config.get_bool("render.color") {
            settings.render.color = val;
        }

        Ok(settings)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            content_types: self.build.content_types.iter().cloned().collect(),
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# domcascade configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/domcascade/domcascade.toml
#   Explicit: --config <file>
#   Env:      DOMCASCADE_* environment variables, e.g.
#             DOMCASCADE_RENDER__VISUAL_TYPES=h1,h2,p
#
# List semantics:
#   A list in a file REPLACES the inherited list.
#   "!item" entries REMOVE an inherited item:
#     visual_types = ["!p"]   # keep everything but p

[build]
# Types allowed to carry text contents
# content_types = ["h1", "p"]

[render]
# Types shown by `render`; all other types are invisible containers
# visual_types = ["h1", "p"]

# Visual types shown in upper case
# uppercase_types = ["h1"]

# Emit ANSI colours (NO_COLOR in the environment always disables them)
# color = true
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

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn given_plain_items_when_merging_then_replaces_base() {
        assert_eq!(merge_list(&list(&["h1", "p"]), &list(&["h2"])), list(&["h2"]));
    }

    #[test]
    fn given_only_negations_when_merging_then_edits_base() {
        assert_eq!(merge_list(&list(&["h1", "p"]), &list(&["!p"])), list(&["h1"]));
    }

    #[test]
    fn given_duplicates_when_merging_then_deduplicated_in_order() {
        assert_eq!(
            merge_list(&list(&["x"]), &list(&["p", "h1", "p"])),
            list(&["p", "h1"])
        );
    }

    #[test]
    fn given_raw_scalar_when_merging_then_overlay_wins() {
        let overlay = RawSettings {
            render: RawRenderSettings {
                color: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = Settings::default().merge_with(&overlay);

        assert!(!merged.render.color);
        assert_eq!(merged.render.visual_types, RenderSettings::default().visual_types);
    }

    #[test]
    fn given_template_when_parsing_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.render.visual_types.is_none());
    }

    #[test]
    fn given_defaults_when_serializing_then_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
