//! Runner configuration stored as TOML in the `.toptag` directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::Error as SerdeDeError};
use thiserror::Error;

use crate::app_dirs;
use crate::ml::ModelSpec;
use crate::toptagger::HepTopTaggerConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable naming the deployment root that model paths are
/// relative to. Takes precedence over `deploy_root` in the config.
pub const DEPLOY_ROOT_ENV: &str = "TOPTAG_BASE";
pub const MAX_WORKER_COUNT: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No suitable config directory found")]
    NoConfigDir,
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

/// Settings for one tagging run.
///
/// Config keys: `src`, `deploy_root`, `workers`, `diagnostics`,
/// `[[models]]` (`name`, `path`) and an optional `[top_tagger]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggerConfig {
    /// Name of the jet collection read from each event.
    #[serde(default = "default_src")]
    pub src: String,
    #[serde(default)]
    pub deploy_root: Option<PathBuf>,
    #[serde(default = "default_models")]
    pub models: Vec<ModelSpec>,
    /// Worker threads for the runner; `0` means one per available core.
    #[serde(default)]
    pub workers: usize,
    /// Emit per-jet observables next to the scores.
    #[serde(default)]
    pub diagnostics: bool,
    #[serde(default)]
    pub top_tagger: HepTopTaggerConfig,
}

fn default_src() -> String {
    "CA15PFPuppi".to_string()
}

fn default_models() -> Vec<ModelSpec> {
    vec![ModelSpec {
        name: "v0".to_string(),
        ..ModelSpec::default()
    }]
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            src: default_src(),
            deploy_root: None,
            models: default_models(),
            workers: 0,
            diagnostics: false,
            top_tagger: HepTopTaggerConfig::default(),
        }
    }
}

impl TaggerConfig {
    fn normalized(mut self) -> Self {
        self.workers = self.workers.min(MAX_WORKER_COUNT);
        self
    }

    /// Worker count to actually run with, in `1..=MAX_WORKER_COUNT`.
    pub fn effective_workers(&self) -> usize {
        let requested = if self.workers == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            self.workers
        };
        requested.clamp(1, MAX_WORKER_COUNT)
    }

    /// Root that model paths are resolved against.
    pub fn deploy_root(&self) -> PathBuf {
        resolve_deploy_root(
            std::env::var_os(DEPLOY_ROOT_ENV).map(PathBuf::from),
            self.deploy_root.as_deref(),
        )
    }
}

fn resolve_deploy_root(env: Option<PathBuf>, configured: Option<&Path>) -> PathBuf {
    env.filter(|path| !path.as_os_str().is_empty())
        .or_else(|| configured.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Path of `config.toml` inside the `.toptag` directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load the config from the `.toptag` directory, or defaults when missing.
pub fn load_or_default() -> Result<TaggerConfig, ConfigError> {
    load_from(&config_path()?)
}

/// Load the config at `path`, or defaults when the file does not exist.
pub fn load_from(path: &Path) -> Result<TaggerConfig, ConfigError> {
    if !path.exists() {
        return Ok(TaggerConfig::default());
    }
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source: SerdeDeError::custom(source),
    })?;
    toml::from_str(&text)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
        .map(TaggerConfig::normalized)
}

pub fn save(config: &TaggerConfig) -> Result<(), ConfigError> {
    save_to_path(config, &config_path()?)
}

/// Write the config through a temporary file in the same directory and
/// rename it into place.
pub fn save_to_path(config: &TaggerConfig, path: &Path) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })?;
    let data = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    let write_error = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut staged = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;
    std::io::Write::write_all(&mut staged, data.as_bytes()).map_err(write_error)?;
    staged
        .persist(path)
        .map_err(|err| write_error(err.error))?;
    Ok(())
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
