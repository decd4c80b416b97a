// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summary statistics over small samples.
//!
//! Every function here is total: an empty input or a zero denominator produces a defined value
//! (usually `0`), never a panic, `NaN` or infinity. Per-group sample sizes in a study are small and
//! uneven, so these cases are routine rather than exceptional.

use serde::Serialize;

/// The persuasion intensity scale used by the evaluation harness, inclusive on both ends.
///
/// `0` is neutral information and `5` is coercive manipulation. Scores are reported on this scale
/// as-is and never rescaled.
pub const INTENSITY_LEVELS: std::ops::RangeInclusive<u8> = 0..=5;

/// Returns `count / total`, or `0` if `total` is zero.
pub fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Returns the arithmetic mean, or `0` for an empty input.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Returns the population standard deviation (dividing by `N`), or `0` for an empty input.
pub fn stddev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mean = mean(xs);
    let variance = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / xs.len() as f64;
    variance.sqrt()
}

/// Returns the lower median, or `0` for an empty input.
///
/// This is the element at index `N / 2` of the ascending-sorted input. For even `N` that is the
/// upper of the two middle elements in 0-based terms (`[1, 2, 3, 4]` gives `3`); the two middle
/// values are not averaged.
pub fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[sorted.len() / 2]
}

/// Returns the minimum and maximum, or `None` for an empty input.
pub fn min_max(xs: &[f64]) -> Option<(f64, f64)> {
    let (first, rest) = xs.split_first()?;
    Some(
        rest.iter()
            .fold((*first, *first), |(min, max), &x| (min.min(x), max.max(x))),
    )
}

/// Returns the Pearson correlation coefficient between `xs` and `ys`.
///
/// The inputs are expected to have equal lengths; if they don't, only the common prefix is used.
/// If either input has zero variance (including when it has fewer than two elements), the
/// correlation is defined as `0`.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denom_x = sum_sq_x.sqrt();
    let denom_y = sum_sq_y.sqrt();
    if denom_x == 0.0 || denom_y == 0.0 {
        return 0.0;
    }

    (numerator / (denom_x * denom_y)).clamp(-1.0, 1.0)
}

/// The shape of a non-empty sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Distribution {
    /// The number of values.
    pub count: usize,
    /// The arithmetic mean.
    pub mean: f64,
    /// The lower median; see [`median`].
    pub median: f64,
    /// The smallest value.
    pub min: f64,
    /// The largest value.
    pub max: f64,
}

impl Distribution {
    /// Describes `xs`, or returns `None` if there is no data.
    pub fn of(xs: &[f64]) -> Option<Self> {
        let (min, max) = min_max(xs)?;
        Some(Self {
            count: xs.len(),
            mean: mean(xs),
            median: median(xs),
            min,
            max,
        })
    }
}

/// How many scores fell on one level of the persuasion intensity scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IntensityLevel {
    /// The level, from the fixed 0-5 scale.
    pub level: u8,
    /// The number of scores exactly equal to this level.
    pub count: usize,
    /// `count` over the total number of scores.
    pub rate: f64,
}

/// Counts how many scores fall on each level of the persuasion intensity scale.
///
/// Always returns one entry per level. Scores that aren't whole numbers on the scale are counted
/// in the total but not at any level.
pub fn intensity_histogram(scores: &[f64]) -> Vec<IntensityLevel> {
    INTENSITY_LEVELS
        .map(|level| {
            let count = scores.iter().filter(|&&s| s == f64::from(level)).count();
            IntensityLevel {
                level,
                count,
                rate: rate(count, scores.len()),
            }
        })
        .collect()
}
