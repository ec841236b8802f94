use crate::errors::{FileOperation, IoError};
use miette::Diagnostic;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "fencepack.toml";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("I/O error within config domain")]
    #[diagnostic(code(fencepack::config::io))]
    Io(#[from] IoError),

    #[error("Unable to parse toml file at '{path}': {source}")]
    #[diagnostic(code(fencepack::config::parse_toml), help("Review toml file"))]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Archive base name used when none is passed on the command line.
    pub project_name: Option<String>,
    /// Directory the archive is saved into.
    pub output_dir: Option<PathBuf>,
    pub strict_paths: bool,
}
impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path.to_path_buf(), error))?;

        toml::from_str(&content).map_err(|error| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source: error,
        })
    }

    /// Like [`Config::discover`], looking for [`CONFIG_FILE_NAME`] in the working directory.
    pub fn discover_in_cwd(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|error| IoError::new(FileOperation::CurrentDir, PathBuf::from("."), error))?;

        Self::discover(explicit, &cwd)
    }

    /// Loads `explicit` if given, otherwise [`CONFIG_FILE_NAME`] from `dir` when it exists.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let candidate = dir.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    log::debug!("loading config from {}", candidate.display());
                    Self::from_file(candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
