// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn-indexed analysis.
//!
//! Turn numbers here count only the turns made by one role, and start at 1: turn 1 is the first
//! user turn, regardless of how many assistant turns came before it. They are used directly as
//! "turn N" labels.

use crate::select::Evaluated;
use indexmap::IndexMap;
use persuasion_metadata::{Role, TestResult};
use serde::Serialize;

/// Returns the 1-based number of the first `role` turn whose observations set `flag`.
///
/// Returns `None` if no such turn exists.
pub fn first_turn_index_where(result: &TestResult, role: Role, flag: &str) -> Option<usize> {
    result
        .turns_by(role)
        .position(|turn| {
            turn.agent_observations
                .as_ref()
                .is_some_and(|obs| obs.is_set(flag))
        })
        .map(|index| index + 1)
}

/// For each evaluated result whose final evaluation sets `flag`, returns the turn where the flag
/// was first observed.
///
/// Results where the flag was set overall but never observed on any single turn are skipped.
pub fn first_flag_turns(evaluated: &[Evaluated<'_>], role: Role, flag: &str) -> Vec<usize> {
    evaluated
        .iter()
        .filter(|e| e.is_set(flag))
        .filter_map(|e| first_turn_index_where(e.result, role, flag))
        .collect()
}

/// Averages of a metric at one turn number, one per partition.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TurnAverage {
    /// The 1-based turn number.
    pub turn: usize,
    /// The mean per partition label, or `None` if no result in that partition had an observation
    /// of the metric at this turn. `Some(0.0)` is a real observed average.
    pub averages: IndexMap<String, Option<f64>>,
}

impl TurnAverage {
    /// Returns true if no partition has data at this turn.
    pub fn is_empty(&self) -> bool {
        self.averages.values().all(Option::is_none)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    sum: f64,
    count: usize,
}

/// Averages `metric` turn by turn, split into partitions by `partition_fn`.
///
/// Turns are numbered among `role` turns only. There is one row for every turn number up to the
/// longest such sequence across all results. A result contributes to a (turn, partition) average
/// only if its turn carries a numeric observation of `metric`.
///
/// Partitions are listed in the order of `labels` followed by any other labels in the order
/// `partition_fn` first produced them, so that expected partitions are present even when empty.
pub fn turn_by_turn_average<'a, F, L>(
    results: impl IntoIterator<Item = &'a TestResult>,
    role: Role,
    metric: &str,
    labels: &[&str],
    mut partition_fn: F,
) -> Vec<TurnAverage>
where
    F: FnMut(&TestResult) -> L,
    L: Into<String>,
{
    let mut cells: IndexMap<String, Vec<Cell>> = labels
        .iter()
        .map(|label| ((*label).to_owned(), Vec::new()))
        .collect();
    let mut max_turns = 0;

    for result in results {
        let partition = cells.entry(partition_fn(result).into()).or_default();
        for (index, turn) in result.turns_by(role).enumerate() {
            max_turns = max_turns.max(index + 1);
            let Some(value) = turn
                .agent_observations
                .as_ref()
                .and_then(|obs| obs.number(metric))
            else {
                continue;
            };
            if partition.len() <= index {
                partition.resize(index + 1, Cell::default());
            }
            partition[index].sum += value;
            partition[index].count += 1;
        }
    }

    (0..max_turns)
        .map(|index| TurnAverage {
            turn: index + 1,
            averages: cells
                .iter()
                .map(|(label, partition)| {
                    let average = partition
                        .get(index)
                        .filter(|cell| cell.count > 0)
                        .map(|cell| cell.sum / cell.count as f64);
                    (label.clone(), average)
                })
                .collect(),
        })
        .collect()
}
