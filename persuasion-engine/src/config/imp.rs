// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    discovery::config_paths,
    elements::{
        AnalysisConfig, DefaultAnalysisConfig, DefaultStoreConfig, DeserializedAnalysisConfig,
        DeserializedStoreConfig, StoreConfig,
    },
};
use crate::{errors::ConfigError, report::StudySettings, store::ResultStore};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, io};
use swrite::{SWrite, swrite};
use tracing::{debug, warn};

/// Special value for `--config` and `PERSUASION_CONFIG` that skips loading a config file, using only
/// built-in defaults.
pub const CONFIG_NONE: &str = "none";

/// Specifies where to load configuration from.
#[derive(Clone, Copy, Debug)]
pub enum ConfigLocation<'a> {
    /// Discover the config file in the default locations.
    Default,

    /// Skip loading a config file, using only built-in defaults.
    ///
    /// This is useful for test isolation.
    Isolated,

    /// Load the config file at an explicit path.
    ///
    /// Loading fails if the file does not exist.
    Explicit(&'a Utf8Path),
}

impl<'a> ConfigLocation<'a> {
    /// Creates a config location from a CLI or environment variable value.
    ///
    /// Returns `Default` if `None`, `Isolated` if `"none"`, otherwise `Explicit` with the path.
    pub fn from_cli_or_env(s: Option<&'a str>) -> Self {
        match s {
            None => Self::Default,
            Some(s) if s == CONFIG_NONE => Self::Isolated,
            Some(s) => Self::Explicit(Utf8Path::new(s)),
        }
    }
}

/// Configuration after the config file has been applied over the built-in defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// The config file that was loaded, if any.
    pub source: Option<Utf8PathBuf>,

    /// Where results are read from.
    pub store: StoreConfig,

    /// How results are interpreted.
    pub analysis: AnalysisConfig,
}

impl ReportConfig {
    /// Loads configuration from `location`, logging warnings about unknown keys.
    pub fn load(location: ConfigLocation<'_>) -> Result<Self, ConfigError> {
        Self::load_with_warnings(location, &mut DefaultConfigWarnings)
    }

    fn load_with_warnings(
        location: ConfigLocation<'_>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigError> {
        let user = DeserializedReportConfig::from_location_with_warnings(location, warnings)?;
        let default = DefaultReportConfig::from_embedded();
        Ok(Self::resolve(&default, user))
    }

    /// Returns the built-in defaults.
    pub fn built_in() -> Self {
        Self::resolve(&DefaultReportConfig::from_embedded(), None)
    }

    fn resolve(
        default: &DefaultReportConfig,
        user: Option<(Utf8PathBuf, DeserializedReportConfig)>,
    ) -> Self {
        let (source, user) = match user {
            Some((path, config)) => (Some(path), Some(config)),
            None => (None, None),
        };
        Self {
            source,
            store: StoreConfig::resolve(&default.store, user.as_ref().map(|u| &u.store)),
            analysis: AnalysisConfig::resolve(&default.analysis, user.as_ref().map(|u| &u.analysis)),
        }
    }

    /// Overrides the results root, for a directory passed in on the command line or through the
    /// environment.
    pub fn set_results_dir(&mut self, dir: impl Into<Utf8PathBuf>) {
        self.store.dir = dir.into();
    }

    /// Returns a store reading from the configured location.
    pub fn result_store(&self) -> ResultStore {
        self.store.result_store()
    }

    /// Returns the settings that reports are computed with.
    pub fn study_settings(&self) -> StudySettings {
        self.analysis.study_settings()
    }
}

trait ConfigWarnings {
    /// Handle unknown configuration keys found in a config file.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        if let [key] = unknown.iter().collect::<Vec<_>>()[..] {
            swrite!(unknown_str, "key: {key}");
        } else {
            swrite!(unknown_str, "keys:\n");
            for ignored_key in unknown {
                swrite!(unknown_str, "\n  - {ignored_key}");
            }
        }

        warn!("in config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}

/// A config file, where every key is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedReportConfig {
    #[serde(default)]
    store: DeserializedStoreConfig,

    #[serde(default)]
    analysis: DeserializedAnalysisConfig,
}

impl DeserializedReportConfig {
    fn from_location_with_warnings(
        location: ConfigLocation<'_>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Option<(Utf8PathBuf, Self)>, ConfigError> {
        match location {
            ConfigLocation::Isolated => {
                debug!("config: skipping (isolated)");
                Ok(None)
            }
            ConfigLocation::Explicit(path) => {
                debug!("config: loading from explicit path {path}");
                match Self::from_path_with_warnings(path, warnings)? {
                    Some(config) => Ok(Some((path.to_owned(), config))),
                    None => Err(ConfigError::FileNotFound {
                        path: path.to_owned(),
                    }),
                }
            }
            ConfigLocation::Default => {
                let paths = config_paths()?;
                for path in paths.iter() {
                    if let Some(config) = Self::from_path_with_warnings(path, warnings)? {
                        return Ok(Some((path.clone(), config)));
                    }
                }
                debug!("config: no config file found at any candidate path: {paths:?}");
                Ok(None)
            }
        }
    }

    /// Returns `Ok(None)` if the file does not exist.
    fn from_path_with_warnings(
        path: &Utf8Path,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Option<Self>, ConfigError> {
        debug!("config: attempting to load from {path}");
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("config: file does not exist at {path}");
                return Ok(None);
            }
            Err(error) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    error,
                });
            }
        };

        let (config, unknown) =
            Self::deserialize_toml(&contents).map_err(|error| ConfigError::Parse {
                path: path.to_owned(),
                error,
            })?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        debug!("config: loaded successfully from {path}");
        Ok(Some(config))
    }

    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        let deserializer = toml::Deserializer::parse(contents)?;
        let mut unknown = BTreeSet::new();
        let config: Self = serde_ignored::deserialize(deserializer, |path| {
            unknown.insert(path.to_string());
        })?;
        Ok((config, unknown))
    }
}

/// The embedded defaults, where every key is required.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultReportConfig {
    store: DefaultStoreConfig,
    analysis: DefaultAnalysisConfig,
}

impl DefaultReportConfig {
    const DEFAULT_CONFIG: &'static str = include_str!("../../default-config.toml");

    /// Panics if the embedded TOML is invalid or contains unknown keys.
    fn from_embedded() -> Self {
        let deserializer = toml::Deserializer::parse(Self::DEFAULT_CONFIG)
            .expect("embedded default config should parse");
        let mut unknown = BTreeSet::new();
        let config: Self = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            unknown.insert(path.to_string());
        })
        .expect("embedded default config should be valid");

        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
        config
    }
}
