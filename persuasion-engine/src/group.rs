// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grouping results by a key.

use indexmap::IndexMap;
use persuasion_metadata::TestResult;
use serde::Serialize;
use std::{fmt, hash::Hash};

/// Partitions `items` by `key_fn`.
///
/// Groups appear in the order their key was first seen, and items keep their input order within a
/// group. Every item lands in exactly one group, so the group sizes always sum to the input length.
pub fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key_fn: F) -> IndexMap<K, Vec<T>>
where
    K: Hash + Eq,
    F: FnMut(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<T>> = IndexMap::new();
    for item in items {
        groups.entry(key_fn(&item)).or_default().push(item);
    }
    groups
}

/// A standard way to group results in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKey {
    /// The model description. Two configurations of one model ID are separate groups.
    Model,
    /// The model ID, ignoring configuration.
    ModelId,
    /// The human-readable scenario name.
    Scenario,
    /// The lab prefix of the gateway ID.
    Lab,
}

impl GroupKey {
    /// Returns the grouping key for `result`.
    pub fn key_for(self, result: &TestResult) -> &str {
        match self {
            Self::Model => &result.model_config.description,
            Self::ModelId => &result.model_id,
            Self::Scenario => &result.scenario.name,
            Self::Lab => result.lab(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::ModelId => write!(f, "model ID"),
            Self::Scenario => write!(f, "scenario"),
            Self::Lab => write!(f, "lab"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_data::RecordFixture;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_strategy::proptest;

    #[test]
    fn test_first_seen_order() {
        let groups = group_by(["b1", "a1", "b2", "c1", "a2"], |s| s.as_bytes()[0]);
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, [b'b', b'a', b'c']);
        assert_eq!(groups[&b'b'], ["b1", "b2"]);
        assert_eq!(groups[&b'a'], ["a1", "a2"]);
    }

    #[test]
    fn test_group_keys() {
        let result = RecordFixture::new("r")
            .model("claude-sonnet-4-5", "anthropic/claude-sonnet-4.5", "Claude Sonnet 4.5 - thinking")
            .scenario("grief-vulnerable", "Grief Vulnerable")
            .build();
        assert_eq!(GroupKey::Model.key_for(&result), "Claude Sonnet 4.5 - thinking");
        assert_eq!(GroupKey::ModelId.key_for(&result), "claude-sonnet-4-5");
        assert_eq!(GroupKey::Scenario.key_for(&result), "Grief Vulnerable");
        assert_eq!(GroupKey::Lab.key_for(&result), "anthropic");
    }

    #[proptest]
    fn grouping_is_complete(#[strategy(proptest::collection::vec(0u8..8, 0..64))] values: Vec<u8>) {
        // Tag each value with its position so that equal values are still distinct items.
        let items: Vec<(usize, u8)> = values.into_iter().enumerate().collect();
        let groups = group_by(items.iter().copied(), |(_, x)| x % 3);

        for (key, members) in &groups {
            prop_assert!(members.iter().all(|(_, x)| x % 3 == *key));
            prop_assert!(
                members.is_sorted_by_key(|(index, _)| *index),
                "members keep input order"
            );
        }

        let mut union: Vec<_> = groups.into_values().flatten().collect();
        union.sort_unstable();
        prop_assert_eq!(union, items);
    }
}
