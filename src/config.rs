//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/structured/structured.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `STRUCTURED_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, IoResultExt};
use crate::domain::SimplifyOptions;

/// How `show` renders a container.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Indented `root:` / `.key:` blocks
    #[default]
    Plain,
    /// Box-drawing tree
    Tree,
}

impl std::str::FromStr for RenderStyle {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(RenderStyle::Plain),
            "tree" => Ok(RenderStyle::Tree),
            other => Err(ApplicationError::Config {
                message: format!("unknown render style: {other}"),
            }),
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Indent width of the text renderer
    pub indent: usize,
    pub style: RenderStyle,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            indent: 4,
            style: RenderStyle::Plain,
        }
    }
}

/// Defaults for the `simplify` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SimplifySettings {
    pub recurse: bool,
    pub unwrap: bool,
}

impl Default for SimplifySettings {
    fn default() -> Self {
        Self {
            recurse: true,
            unwrap: true,
        }
    }
}

impl SimplifySettings {
    pub fn options(&self) -> SimplifyOptions {
        SimplifyOptions::new()
            .recurse(self.recurse)
            .unwrap(self.unwrap)
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub render: RawRenderSettings,
    pub simplify: RawSimplifySettings,
    pub mapped_attrs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderSettings {
    pub indent: Option<usize>,
    pub style: Option<RenderStyle>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSimplifySettings {
    pub recurse: Option<bool>,
    pub unwrap: Option<bool>,
}

/// Unified configuration for structured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub render: RenderSettings,
    pub simplify: SimplifySettings,
    /// Names projected onto leaves when read as attributes
    pub mapped_attrs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render: RenderSettings::default(),
            simplify: SimplifySettings::default(),
            mapped_attrs: vec!["type".into(), "len".into()],
        }
    }
}

/// Get the XDG config directory for structured.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "structured").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("structured.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path argument.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            render: RenderSettings {
                indent: overlay.render.indent.unwrap_or(self.render.indent),
                style: overlay.render.style.unwrap_or(self.render.style),
            },
            simplify: SimplifySettings {
                recurse: overlay.simplify.recurse.unwrap_or(self.simplify.recurse),
                unwrap: overlay.simplify.unwrap.unwrap_or(self.simplify.unwrap),
            },
            mapped_attrs: overlay
                .mapped_attrs
                .clone()
                .unwrap_or_else(|| self.mapped_attrs.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given on the command line; must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/structured/structured.toml`
    /// 3. Local config passed with `--config`
    /// 4. Environment variables: `STRUCTURED_*` prefix
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(local) = local {
            let local = expand_path(local);
            let raw = load_raw_settings(&local)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply STRUCTURED_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("STRUCTURED")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("mapped_attrs")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_int("render.indent") {
            settings.render.indent = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("render.indent must not be negative: {val}"),
            })?;
        }
        if let Ok(val) = config.get_string("render.style") {
            settings.render.style = val.parse()?;
        }
        if let Ok(val) = config.get_bool("simplify.recurse") {
            settings.simplify.recurse = val;
        }
        if let Ok(val) = config.get_bool("simplify.unwrap") {
            settings.simplify.unwrap = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("mapped_attrs") {
            settings.mapped_attrs = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# structured configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/structured/structured.toml
#   Local:  file given with --config
#   Env:    STRUCTURED_* environment variables (e.g. STRUCTURED_RENDER__INDENT=2)

# Attribute names projected onto every leaf when not present as slots
# mapped_attrs = ["type", "len"]

[render]
# indent = 4
# style = "plain"   # or "tree"

[simplify]
# recurse = true
# unwrap = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
