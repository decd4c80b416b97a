// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration sections.
//!
//! Each section comes in three forms: a deserialized form where every key is optional (the config
//! file), a default form where every key is required (the embedded defaults), and the resolved form
//! handed to the rest of the crate.

use crate::{
    flags::TrackedFlags, report::StudySettings, select::TwoPhaseScenarios, store::ResultStore,
};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// The `[store]` section of a config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct DeserializedStoreConfig {
    #[serde(default)]
    pub(super) dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub(super) partitions: Option<Vec<String>>,
}

/// The `[store]` section of the embedded defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct DefaultStoreConfig {
    pub(super) dir: Utf8PathBuf,
    pub(super) partitions: Vec<String>,
}

/// Where results are read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    /// The results root.
    pub dir: Utf8PathBuf,

    /// Partition subdirectories of the root, in read order.
    pub partitions: Vec<String>,
}

impl StoreConfig {
    pub(super) fn resolve(
        default: &DefaultStoreConfig,
        user: Option<&DeserializedStoreConfig>,
    ) -> Self {
        Self {
            dir: user
                .and_then(|u| u.dir.clone())
                .unwrap_or_else(|| default.dir.clone()),
            partitions: user
                .and_then(|u| u.partitions.clone())
                .unwrap_or_else(|| default.partitions.clone()),
        }
    }

    /// Returns a store reading from this location.
    pub fn result_store(&self) -> ResultStore {
        ResultStore::new(self.dir.clone(), self.partitions.iter().cloned())
    }
}

/// The `[analysis]` section of a config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct DeserializedAnalysisConfig {
    #[serde(default)]
    pub(super) two_phase_scenarios: Option<Vec<String>>,
    #[serde(default)]
    pub(super) tracked_flags: Option<TrackedFlags>,
    #[serde(default)]
    pub(super) admission_flag: Option<String>,
    #[serde(default)]
    pub(super) intensity_metric: Option<String>,
}

/// The `[analysis]` section of the embedded defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct DefaultAnalysisConfig {
    pub(super) two_phase_scenarios: Vec<String>,
    pub(super) tracked_flags: TrackedFlags,
    pub(super) admission_flag: String,
    pub(super) intensity_metric: String,
}

/// How results are interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// Scenario IDs that follow the two-phase design.
    pub two_phase_scenarios: Vec<String>,

    /// Flags counted by per-group summaries.
    pub tracked_flags: TrackedFlags,

    /// The flag that marks a model admitting it is an AI.
    pub admission_flag: String,

    /// The per-turn observation averaged turn by turn.
    pub intensity_metric: String,
}

impl AnalysisConfig {
    pub(super) fn resolve(
        default: &DefaultAnalysisConfig,
        user: Option<&DeserializedAnalysisConfig>,
    ) -> Self {
        Self {
            two_phase_scenarios: user
                .and_then(|u| u.two_phase_scenarios.clone())
                .unwrap_or_else(|| default.two_phase_scenarios.clone()),
            tracked_flags: user
                .and_then(|u| u.tracked_flags.clone())
                .unwrap_or_else(|| default.tracked_flags.clone()),
            admission_flag: user
                .and_then(|u| u.admission_flag.clone())
                .unwrap_or_else(|| default.admission_flag.clone()),
            intensity_metric: user
                .and_then(|u| u.intensity_metric.clone())
                .unwrap_or_else(|| default.intensity_metric.clone()),
        }
    }

    /// Returns the settings that reports are computed with.
    pub fn study_settings(&self) -> StudySettings {
        StudySettings {
            tracked_flags: self.tracked_flags.clone(),
            two_phase: TwoPhaseScenarios::new(self.two_phase_scenarios.iter().cloned()),
            admission_flag: self.admission_flag.clone(),
            intensity_metric: self.intensity_metric.clone(),
        }
    }
}
