use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::BestEffortPathExt;

pub const CONFIG_FILE_NAME: &str = "fouter.yaml";

const ROUTER_SECTION: &str = "router";

/// Looks for the config file inside `root`, or in the working directory.
pub fn get_config_file_path(root: Option<&Path>) -> PathBuf {
    match root {
        Some(root) => root.join(CONFIG_FILE_NAME),
        None => PathBuf::from(CONFIG_FILE_NAME),
    }
}

/// Settings read from the `router` section of the config file.
///
/// Every field is optional so that command-line flags and built-in defaults
/// can fill the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterConfig {
    pub extension: Option<String>,
    pub executor: Option<String>,
    pub embedded_path: Option<String>,
}

impl RouterConfig {
    /// Reads the config file, falling back to defaults when it does not exist.
    pub async fn read(path: &Path) -> Result<Self, ConfigError> {
        debug!("Opening config file: {}", path.best_effort_path_display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    fn parse_router_section(router: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (key, value) in router {
            let Some(key) = key.as_str() else {
                debug!("Skipping non-string router key: {:?}", key);
                continue;
            };

            let target = match key {
                "extension" => &mut config.extension,
                "executor" => &mut config.executor,
                "embedded_path" => &mut config.embedded_path,
                other => {
                    debug!("Ignoring unknown router setting '{}'", other);
                    continue;
                }
            };
            *target = Some(Self::string_value(key, value)?);
        }

        Ok(config)
    }

    fn string_value(key: &str, value: &Yaml) -> Result<String, ConfigError> {
        value
            .as_str()
            .map(str::to_string)
            .context(InvalidValueSnafu { key })
    }
}

impl TryFrom<&str> for RouterConfig {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            debug!("Config file is empty");
            return Ok(Self::default());
        };

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(ROUTER_SECTION)))) {
            Some(router) => {
                let router = router.as_mapping().context(RouterNotMapSnafu)?;
                Self::parse_router_section(router)
            }
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMapError,
    #[snafu(display("Router section should be a map"))]
    RouterNotMapError,
    #[snafu(display("Router setting '{}' should be a string", key))]
    InvalidValueError { key: String },
}
