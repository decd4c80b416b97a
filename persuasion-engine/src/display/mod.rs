// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable and serialized output for results and reports.
//!
//! Every report type gets a `display` method returning a wrapper that implements
//! [`fmt::Display`]. Serialized output goes through [`SerializableFormat::to_writer`] using the
//! report's [`Serialize`] impl.

mod records;
mod reports;

pub use records::*;
pub use reports::*;

use owo_colors::{OwoColorize, Style};
use serde::Serialize;
use std::{fmt, io};

/// Output formats for reports.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputFormat {
    /// A human-readable output format.
    Human,

    /// Machine-readable output format.
    Serializable(SerializableFormat),
}

/// A serialized, machine-readable output format.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SerializableFormat {
    /// JSON with no whitespace.
    Json,
    /// JSON, prettified.
    JsonPretty,
}

impl SerializableFormat {
    /// Write this data in the given format to the writer.
    pub fn to_writer(
        self,
        value: &impl Serialize,
        writer: impl io::Write,
    ) -> serde_json::Result<()> {
        match self {
            SerializableFormat::Json => serde_json::to_writer(writer, value),
            SerializableFormat::JsonPretty => serde_json::to_writer_pretty(writer, value),
        }
    }
}

/// Styles for human-readable output.
#[derive(Clone, Debug, Default)]
pub struct Styles {
    /// Style for section headers.
    pub section: Style,
    /// Style for group headings and table headers.
    pub heading: Style,
    /// Style for field labels.
    pub label: Style,
    /// Style for result IDs.
    pub id: Style,
    /// Style for counts and numbers.
    pub count: Style,
    /// Style for model names.
    pub model: Style,
    /// Style for scenario names.
    pub scenario: Style,
    /// Style for outcomes that favor the user, such as refusals.
    pub good: Style,
    /// Style for outcomes against the user, such as completed conversions.
    pub bad: Style,
    /// Style for failures and warnings.
    pub warning: Style,
    /// Style for secondary text.
    pub dimmed: Style,
}

impl Styles {
    /// Colorizes the styles for terminal output.
    pub fn colorize(&mut self) {
        self.section = Style::new().bold().underline();
        self.heading = Style::new().bold();
        self.label = Style::new().bold();
        self.id = Style::new().bold().purple();
        self.count = Style::new().bold();
        self.model = Style::new().cyan();
        self.scenario = Style::new().blue();
        self.good = Style::new().bold().green();
        self.bad = Style::new().bold().red();
        self.warning = Style::new().bold().yellow();
        self.dimmed = Style::new().bright_black();
    }
}

/// Utilities for pluralizing various words based on count.
pub mod plural {
    /// Returns "result" if `count` is 1, otherwise "results".
    pub fn results_str(count: usize) -> &'static str {
        if count == 1 { "result" } else { "results" }
    }

    /// Returns "model" if `count` is 1, otherwise "models".
    pub fn models_str(count: usize) -> &'static str {
        if count == 1 { "model" } else { "models" }
    }

    /// Returns "lab" if `count` is 1, otherwise "labs".
    pub fn labs_str(count: usize) -> &'static str {
        if count == 1 { "lab" } else { "labs" }
    }

    /// Returns "scenario" if `count` is 1, otherwise "scenarios".
    pub fn scenarios_str(count: usize) -> &'static str {
        if count == 1 { "scenario" } else { "scenarios" }
    }

    /// Returns "test" if `count` is 1, otherwise "tests".
    pub fn tests_str(count: usize) -> &'static str {
        if count == 1 { "test" } else { "tests" }
    }
}

/// A fraction in `[0, 1]`, displayed as a percentage with one decimal place.
///
/// Width and alignment flags apply to the whole rendered value.
#[derive(Clone, Copy, Debug)]
pub struct Percent(pub f64);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:.1}%", self.0 * 100.0))
    }
}

/// A number displayed with two decimal places.
#[derive(Clone, Copy, Debug)]
pub struct Decimal(pub f64);

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:.2}", self.0))
    }
}

/// Shown in place of a report when there is nothing to report on.
pub const NO_DATA: &str = "no data";

fn write_no_data(f: &mut fmt::Formatter<'_>, styles: &Styles, what: &str) -> fmt::Result {
    writeln!(f, "{}: {what}", NO_DATA.style(styles.warning))
}

/// A plain-text table. The first column and any columns marked with [`Table::left_align`] are
/// left-aligned; the rest are right-aligned.
///
/// With no headers, only the rows are written.
struct Table<'a> {
    styles: &'a Styles,
    indent: usize,
    left_aligned: Vec<usize>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl<'a> Table<'a> {
    fn new(styles: &'a Styles, headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            styles,
            indent: 0,
            left_aligned: vec![0],
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    fn left_align(mut self, column: usize) -> Self {
        self.left_aligned.push(column);
        self
    }

    fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain([self.headers.len()])
            .max()
            .unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    fn write_line(
        &self,
        f: &mut fmt::Formatter<'_>,
        cells: &[String],
        widths: &[usize],
        style: Style,
    ) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = self.indent)?;
        let last = cells.len().saturating_sub(1);
        for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
            if i > 0 {
                f.write_str("  ")?;
            }
            if !self.left_aligned.contains(&i) {
                write!(f, "{:>width$}", cell.style(style))?;
            } else if i == last {
                write!(f, "{}", cell.style(style))?;
            } else {
                write!(f, "{:<width$}", cell.style(style))?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        if !self.headers.is_empty() {
            self.write_line(f, &self.headers, &widths, self.styles.heading)?;
        }
        for row in &self.rows {
            self.write_line(f, row, &widths, Style::new())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0, "0.0%" ; "zero")]
    #[test_case(0.5, "50.0%" ; "half")]
    #[test_case(1.0 / 3.0, "33.3%" ; "third")]
    #[test_case(1.0, "100.0%" ; "one")]
    fn percent(value: f64, expected: &str) {
        assert_eq!(Percent(value).to_string(), expected);
    }

    #[test]
    fn padding_applies_to_the_whole_value() {
        assert_eq!(format!("{:>7}", Percent(0.25)), "  25.0%");
        assert_eq!(format!("{:<6}|", Decimal(1.5)), "1.50  |");
    }

    #[test]
    fn table_alignment() {
        let styles = Styles::default();
        let mut table = Table::new(&styles, ["name", "n", "rate"]);
        table.push_row(vec!["GPT-5".to_owned(), "12".to_owned(), "50.0%".to_owned()]);
        table.push_row(vec!["Claude Opus".to_owned(), "3".to_owned(), "0.0%".to_owned()]);
        insta::assert_snapshot!(table.to_string(), @r"
        name          n   rate
        GPT-5        12  50.0%
        Claude Opus   3   0.0%
        ");

        let mut table = Table::new(&styles, ["model", "n", "archetype"]).left_align(2);
        table.push_row(vec!["GPT-5".to_owned(), "1".to_owned(), "Honest Persuader".to_owned()]);
        table.push_row(vec![
            "Claude".to_owned(),
            "12".to_owned(),
            "Transparent Resister".to_owned(),
        ]);
        assert_eq!(
            table.to_string(),
            "model    n  archetype\n\
             GPT-5    1  Honest Persuader\n\
             Claude  12  Transparent Resister\n"
        );

        let table = Table::new(&styles, ["only"]).with_indent(4);
        assert_eq!(table.to_string(), "    only\n");
    }

    #[test]
    fn json_formats() {
        let value = serde_json::json!({"a": [1, 2]});
        let mut compact = Vec::new();
        SerializableFormat::Json.to_writer(&value, &mut compact).unwrap();
        assert_eq!(String::from_utf8(compact).unwrap(), r#"{"a":[1,2]}"#);

        let mut pretty = Vec::new();
        SerializableFormat::JsonPretty
            .to_writer(&value, &mut pretty)
            .unwrap();
        assert!(String::from_utf8(pretty).unwrap().contains("\n  \"a\": ["));
    }
}
