// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-group summaries over evaluated results.

use crate::{
    flags::TrackedFlags,
    group::{GroupKey, group_by},
    select::Evaluated,
    stats::{mean, rate, stddev},
};
use indexmap::IndexMap;
use serde::Serialize;

/// How often a flag was set within a group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlagTally {
    /// The number of results where the flag was set.
    pub count: usize,
    /// `count` over the group size.
    pub rate: f64,
}

/// Summary statistics for one group of evaluated results.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupSummary {
    /// The group key.
    pub key: String,
    /// The number of results in the group.
    pub n: usize,
    /// One tally per tracked flag, in tracked order.
    pub flags: IndexMap<String, FlagTally>,
    /// Mean persuasion intensity.
    pub mean_persuasion: f64,
    /// Population standard deviation of persuasion intensity.
    pub sd_persuasion: f64,
}

impl GroupSummary {
    /// Summarizes `members` under `key`.
    pub fn new<'a, 'b: 'a>(
        key: impl Into<String>,
        members: impl IntoIterator<Item = &'a Evaluated<'b>>,
        flags: &TrackedFlags,
    ) -> Self {
        let members: Vec<_> = members.into_iter().collect();
        let n = members.len();
        let scores: Vec<f64> = members.iter().map(|m| m.persuasion_intensity()).collect();
        let flags = flags
            .iter()
            .map(|flag| {
                let count = members.iter().filter(|m| m.is_set(flag)).count();
                let tally = FlagTally {
                    count,
                    rate: rate(count, n),
                };
                (flag.to_owned(), tally)
            })
            .collect();

        Self {
            key: key.into(),
            n,
            flags,
            mean_persuasion: mean(&scores),
            sd_persuasion: stddev(&scores),
        }
    }

    /// Returns the tally for `flag`, or zero if it isn't tracked.
    pub fn tally(&self, flag: &str) -> FlagTally {
        self.flags.get(flag).copied().unwrap_or_default()
    }

    /// Returns the rate for `flag`, or `0` if it isn't tracked.
    pub fn rate(&self, flag: &str) -> f64 {
        self.tally(flag).rate
    }
}

/// Summarizes evaluated results per group, in the order groups were first seen.
///
/// The engine doesn't sort the output; callers choose a presentation order.
pub fn summarize_groups(
    evaluated: &[Evaluated<'_>],
    key: GroupKey,
    flags: &TrackedFlags,
) -> Vec<GroupSummary> {
    group_by(evaluated, |e| key.key_for(e.result))
        .into_iter()
        .map(|(name, members)| GroupSummary::new(name, members, flags))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::select_evaluated;
    use fixture_data::RecordFixture;
    use persuasion_metadata::flag_names;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summarize_by_scenario() {
        let results = vec![
            RecordFixture::new("1")
                .scenario("grief-vulnerable", "Grief")
                .intensity(2)
                .flag(flag_names::ADMITTED_AI_NATURE, true)
                .build(),
            RecordFixture::new("2")
                .scenario("meta-probe", "Meta")
                .intensity(5)
                .build(),
            RecordFixture::new("3")
                .scenario("grief-vulnerable", "Grief")
                .intensity(4)
                .flag("hell_warning", true)
                .build(),
            RecordFixture::new("failed")
                .scenario("grief-vulnerable", "Grief")
                .intensity(5)
                .flag(flag_names::ADMITTED_AI_NATURE, true)
                .failed("timeout")
                .build(),
        ];
        let evaluated = select_evaluated(&results);
        let flags = TrackedFlags::new([flag_names::ADMITTED_AI_NATURE, "hell_warning"]);
        let summaries = summarize_groups(&evaluated, GroupKey::Scenario, &flags);

        let keys: Vec<_> = summaries.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["Grief", "Meta"]);

        let grief = &summaries[0];
        assert_eq!(grief.n, 2);
        assert_eq!(grief.mean_persuasion, 3.0);
        assert_eq!(grief.sd_persuasion, 1.0);
        assert_eq!(
            grief.tally(flag_names::ADMITTED_AI_NATURE),
            FlagTally { count: 1, rate: 0.5 }
        );
        assert_eq!(grief.rate("hell_warning"), 0.5);
        assert_eq!(grief.rate(flag_names::DOUBLED_DOWN), 0.0);

        let meta = &summaries[1];
        assert_eq!(meta.n, 1);
        assert_eq!(meta.sd_persuasion, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let summaries = summarize_groups(&[], GroupKey::Model, &TrackedFlags::default());
        assert!(summaries.is_empty());

        let none: [&Evaluated<'_>; 0] = [];
        let summary = GroupSummary::new("nobody", none, &TrackedFlags::default());
        assert_eq!(summary.n, 0);
        assert_eq!(summary.mean_persuasion, 0.0);
        assert!(summary.flags.values().all(|t| t.rate == 0.0));
    }
}
