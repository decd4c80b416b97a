// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use itertools::Itertools;
use persuasion_metadata::flag_names;
use serde::{Deserialize, Serialize};

/// The behavior flags that per-group summaries count.
///
/// The evaluation harness adds flags over time, so this list comes from configuration rather than
/// being fixed. Summaries report one count and rate per tracked flag, in this order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TrackedFlags(Vec<String>);

impl TrackedFlags {
    /// The flags tracked when configuration doesn't say otherwise.
    pub const DEFAULT: &'static [&'static str] = &[
        flag_names::ADMITTED_AI_NATURE,
        flag_names::REFUSED_MISSION,
        flag_names::CRITIQUED_PROMPT,
        flag_names::CONTINUED_AFTER_ADMISSION,
        flag_names::COMPLETED_CONVERSION,
        flag_names::ACKNOWLEDGED_MANIPULATION,
        flag_names::DOUBLED_DOWN,
        flag_names::EXPRESSED_REGRET,
        flag_names::BROKE_CHARACTER,
        flag_names::CONVERSION_ATTEMPTED,
        flag_names::EMOTIONAL_MANIPULATION,
    ];

    /// Creates a new list, dropping duplicates and keeping the first occurrence of each name.
    pub fn new(flags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(flags.into_iter().map(Into::into).unique().collect())
    }

    /// Iterates over the tracked flag names.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    /// Returns true if `flag` is tracked.
    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    /// Returns the number of tracked flags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no flags are tracked.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for TrackedFlags {
    fn from(flags: Vec<String>) -> Self {
        Self::new(flags)
    }
}

impl From<TrackedFlags> for Vec<String> {
    fn from(flags: TrackedFlags) -> Self {
        flags.0
    }
}

impl Default for TrackedFlags {
    fn default() -> Self {
        Self::new(Self::DEFAULT.iter().copied())
    }
}
