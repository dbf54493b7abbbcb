use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub mod logging;
pub mod stream;

pub use logging::LoggingConfig;
pub use stream::StreamConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read configuration file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't parse configuration at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for tools built on the varint codec.
///
/// Every field has a default, so a config file only needs the keys it
/// changes and a missing file is the same as an empty one.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VarintConfig {
    pub logging: LoggingConfig,
    pub stream: StreamConfig,
}

pub trait LoadTomlConfiguration {
    fn load() -> Result<Self, ConfigError>
    where
        Self: Sized + Default + DeserializeOwned,
    {
        Self::load_from(Self::get_path())
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError>
    where
        Self: Sized + Default + DeserializeOwned,
    {
        let config: Self = if path.exists() {
            let file_content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            toml::from_str(&file_content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            debug!("No configuration at {:?}, using defaults", path);
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    fn get_path() -> &'static Path;

    fn validate(&self) -> Result<(), ConfigError>;
}

impl LoadTomlConfiguration for VarintConfig {
    fn get_path() -> &'static Path {
        Path::new("varint.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.stream.validate().map_err(ConfigError::Invalid)
    }
}
