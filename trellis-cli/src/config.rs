// Configuration types for trellis-cli, deserialized from trellis.config.toml.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use trellis::runtime::{LOG_DISPLAY, LOG_ERROR, LOG_WARNING};

pub const DEFAULT_CONFIG: &str = "trellis.config.toml";

/// Top-level config file. Every section is optional.
#[derive(Deserialize, Default, Debug)]
pub struct TrellisConfig {
    #[serde(default)]
    pub native: Option<NativeConfig>,
    #[serde(default)]
    pub app: Option<AppConfig>,
    #[serde(default)]
    pub assets: Option<AssetsConfig>,
    #[serde(default)]
    pub log: Option<LogConfig>,
}

#[derive(Deserialize, Debug)]
pub struct NativeConfig {
    /// Path to the native surface library (relative to the config file).
    pub library: String,
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    /// Registered view to open when `--demo` is not given.
    #[serde(default = "default_demo")]
    pub demo: String,
    /// Overrides the view's own window title.
    pub window_title: Option<String>,
}

fn default_demo() -> String {
    "hello".to_string()
}

#[derive(Deserialize, Debug)]
pub struct AssetsConfig {
    /// Root for SVG paths (relative to the config file). Defaults to ".".
    #[serde(default = "default_assets_root")]
    pub root: String,
}

fn default_assets_root() -> String {
    ".".to_string()
}

#[derive(Deserialize, Debug)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Display,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            LogLevel::Display => LOG_DISPLAY,
            LogLevel::Warning => LOG_WARNING,
            LogLevel::Error => LOG_ERROR,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
            ConfigError::Parse { path, message } => {
                write!(f, "failed to parse {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A parsed config plus the directory its relative paths resolve against.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: TrellisConfig,
    pub dir: PathBuf,
}

impl LoadedConfig {
    /// Load `path`. A missing file is only an error when `required`; otherwise
    /// every section falls back to its default.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LoadedConfig { config: TrellisConfig::default(), dir });
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        Self::parse(&text, path, dir)
    }

    pub fn parse(text: &str, path: &Path, dir: PathBuf) -> Result<Self, ConfigError> {
        let config = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(LoadedConfig { config, dir })
    }

    /// Library path: `--lib` flag, then `[native].library`, then
    /// `TRELLIS_NATIVE_LIB`.
    pub fn library(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| {
            self.config
                .native
                .as_ref()
                .map(|native| self.dir.join(&native.library))
        })
        .or_else(|| {
            std::env::var_os(trellis::runtime::loader::NATIVE_LIB_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
    }

    pub fn demo(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.config.app.as_ref().map(|app| app.demo.clone()))
            .unwrap_or_else(default_demo)
    }

    pub fn window_title(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.config.app.as_ref().and_then(|app| app.window_title.clone()))
    }

    pub fn assets_root(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| {
            let root = self
                .config
                .assets
                .as_ref()
                .map(|assets| assets.root.as_str())
                .unwrap_or(".");
            self.dir.join(root)
        })
    }

    pub fn log_level(&self) -> LogLevel {
        self.config.log.as_ref().map(|log| log.level).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> LoadedConfig {
        LoadedConfig::parse(text, Path::new("conf/trellis.config.toml"), PathBuf::from("conf")).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let loaded = parse("");
        assert_eq!(loaded.demo(None), "hello");
        assert_eq!(loaded.window_title(None), None);
        assert_eq!(loaded.assets_root(None), PathBuf::from("conf").join("."));
        assert_eq!(loaded.log_level(), LogLevel::Display);
    }

    #[test]
    fn sections_are_read_and_relative_to_the_config_dir() {
        let loaded = parse(
            r#"
            [native]
            library = "target/release/libtrellis_native.so"

            [app]
            demo = "animation"
            window_title = "Spinner"

            [assets]
            root = "assets"

            [log]
            level = "warning"
            "#,
        );
        assert_eq!(
            loaded.library(None),
            Some(PathBuf::from("conf").join("target/release/libtrellis_native.so"))
        );
        assert_eq!(loaded.demo(None), "animation");
        assert_eq!(loaded.window_title(None).as_deref(), Some("Spinner"));
        assert_eq!(loaded.assets_root(None), PathBuf::from("conf").join("assets"));
        assert_eq!(loaded.log_level().as_u8(), LOG_WARNING);
    }

    #[test]
    fn flags_override_the_file() {
        let loaded = parse("[app]\ndemo = \"layout\"\n[native]\nlibrary = \"a.so\"\n");
        assert_eq!(loaded.demo(Some("svg_icon".into())), "svg_icon");
        assert_eq!(loaded.library(Some(PathBuf::from("b.so"))), Some(PathBuf::from("b.so")));
        assert_eq!(loaded.assets_root(Some(PathBuf::from("/icons"))), PathBuf::from("/icons"));
    }

    #[test]
    fn unknown_log_levels_are_parse_errors() {
        let err = LoadedConfig::parse("[log]\nlevel = \"loud\"\n", Path::new("x.toml"), PathBuf::from("."))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse x.toml"));
    }

    #[test]
    fn a_missing_optional_file_is_the_default_config() {
        let loaded = LoadedConfig::load(Path::new("does-not-exist-7f3a.toml"), false).unwrap();
        assert!(loaded.config.native.is_none());
        assert!(LoadedConfig::load(Path::new("does-not-exist-7f3a.toml"), true).is_err());
    }
}
