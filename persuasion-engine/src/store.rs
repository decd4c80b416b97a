// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading recorded results from disk.
//!
//! Results live under a root directory split into partitions, one subdirectory each, holding one
//! JSON file per run:
//!
//! ```text
//! results/
//!   raw/
//!     2025-10-14-gpt-5-grief.json
//!   adaptive/
//!     ...
//! ```
//!
//! Loading is best-effort. Partitions are read independently, so an unreadable partition or a
//! malformed file is reported as a warning and the rest of the results still load.

use crate::errors::StoreError;
use camino::{Utf8Path, Utf8PathBuf};
use persuasion_metadata::TestResult;
use std::{cmp::Ordering, io};
use tracing::{debug, warn};

/// Receives warnings about results that could not be loaded.
pub trait StoreWarnings {
    /// A partition directory could not be listed, so it contributes no results.
    fn partition_unreadable(&mut self, error: &StoreError);

    /// A single result file was skipped.
    fn file_skipped(&mut self, error: &StoreError);
}

/// The default [`StoreWarnings`] implementation, which logs each warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStoreWarnings;

impl StoreWarnings for DefaultStoreWarnings {
    fn partition_unreadable(&mut self, error: &StoreError) {
        warn!("{}, skipping partition: {}", error, source_message(error));
    }

    fn file_skipped(&mut self, error: &StoreError) {
        warn!("{}, skipping: {}", error, source_message(error));
    }
}

fn source_message(error: &StoreError) -> String {
    std::error::Error::source(error).map_or_else(String::new, |source| source.to_string())
}

/// A directory of recorded results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultStore {
    root: Utf8PathBuf,
    partitions: Vec<String>,
}

impl ResultStore {
    /// The extension of result files. Files with any other extension are ignored.
    pub const EXTENSION: &'static str = "json";

    /// Creates a new store rooted at `root`, reading the given partition subdirectories in order.
    pub fn new(
        root: impl Into<Utf8PathBuf>,
        partitions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            root: root.into(),
            partitions: partitions.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the partition names.
    pub fn partitions(&self) -> &[String] {
        &self.partitions
    }

    /// Loads every result, logging any that couldn't be read.
    ///
    /// See [`Self::load_all_with_warnings`].
    pub fn load_all(&self) -> Result<Vec<TestResult>, StoreError> {
        self.load_all_with_warnings(&mut DefaultStoreWarnings)
    }

    /// Loads every result, newest first.
    ///
    /// Each result's `id` is set to its file name without the extension. Results with the same
    /// timestamp keep partition order, then file name order. Results whose timestamp can't be
    /// parsed sort after all others.
    ///
    /// A missing root or partition contributes no results. The only error is a root that exists
    /// but is not a directory.
    pub fn load_all_with_warnings(
        &self,
        warnings: &mut dyn StoreWarnings,
    ) -> Result<Vec<TestResult>, StoreError> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(StoreError::RootNotADirectory {
                root: self.root.clone(),
            });
        }

        let mut results = Vec::new();
        for partition in &self.partitions {
            let dir = self.root.join(partition);
            match load_partition(&dir, warnings) {
                Ok(loaded) => {
                    debug!("loaded {} results from `{dir}`", loaded.len());
                    results.extend(loaded);
                }
                Err(error) => warnings.partition_unreadable(&error),
            }
        }

        sort_newest_first(&mut results);
        Ok(results)
    }

    /// Loads the result with the given ID, or `None` if there isn't one.
    ///
    /// If several partitions contain the same ID, the one that sorts first in
    /// [`Self::load_all_with_warnings`] wins.
    pub fn load_by_id(&self, id: &str) -> Result<Option<TestResult>, StoreError> {
        self.load_by_id_with_warnings(id, &mut DefaultStoreWarnings)
    }

    /// Like [`Self::load_by_id`], reporting warnings to `warnings`.
    pub fn load_by_id_with_warnings(
        &self,
        id: &str,
        warnings: &mut dyn StoreWarnings,
    ) -> Result<Option<TestResult>, StoreError> {
        let results = self.load_all_with_warnings(warnings)?;
        Ok(results.into_iter().find(|result| result.id == id))
    }
}

fn load_partition(
    dir: &Utf8Path,
    warnings: &mut dyn StoreWarnings,
) -> Result<Vec<TestResult>, StoreError> {
    let entries = match dir.read_dir_utf8() {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!("results partition `{dir}` does not exist");
            return Ok(Vec::new());
        }
        Err(error) => {
            return Err(StoreError::PartitionRead {
                dir: dir.to_owned(),
                error,
            });
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warnings.file_skipped(&StoreError::DirEntryRead {
                    dir: dir.to_owned(),
                    error,
                });
                continue;
            }
        };
        let path = entry.path();
        if path.extension() == Some(ResultStore::EXTENSION) && path.is_file() {
            paths.push(path.to_owned());
        }
    }
    paths.sort();

    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        match load_file(&path) {
            Ok(result) => results.push(result),
            Err(error) => warnings.file_skipped(&error),
        }
    }
    Ok(results)
}

fn load_file(path: &Utf8Path) -> Result<TestResult, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|error| StoreError::FileRead {
        path: path.to_owned(),
        error,
    })?;
    let mut result: TestResult =
        serde_json::from_str(&contents).map_err(|error| StoreError::FileParse {
            path: path.to_owned(),
            error,
        })?;
    if let Some(stem) = path.file_stem() {
        result.id = stem.to_owned();
    }
    Ok(result)
}

fn sort_newest_first(results: &mut [TestResult]) {
    results.sort_by(|a, b| match (a.parsed_timestamp(), b.parsed_timestamp()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use camino_tempfile_ext::prelude::*;
    use fixture_data::RecordFixture;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct CollectWarnings {
        partitions: Vec<String>,
        files: Vec<String>,
    }

    impl StoreWarnings for CollectWarnings {
        fn partition_unreadable(&mut self, error: &StoreError) {
            self.partitions.push(error.to_string());
        }

        fn file_skipped(&mut self, error: &StoreError) {
            self.files.push(error.to_string());
        }
    }

    fn write_result(dir: &Utf8TempDir, path: &str, fixture: RecordFixture) {
        let json = serde_json::to_string_pretty(&fixture.build()).unwrap();
        dir.child(path).write_str(&json).unwrap();
    }

    #[test]
    fn test_load_all() {
        let dir = Utf8TempDir::new().unwrap();
        write_result(
            &dir,
            "raw/older.json",
            RecordFixture::new("inner-id").timestamp("2025-10-01T10:00:00Z"),
        );
        write_result(
            &dir,
            "adaptive/newer.json",
            RecordFixture::new("x").timestamp("2025-10-02T10:00:00Z"),
        );
        write_result(
            &dir,
            "adaptive/undated.json",
            RecordFixture::new("x").timestamp("not a date"),
        );
        write_result(
            &dir,
            "raw/same-as-older.json",
            RecordFixture::new("x").timestamp("2025-10-01T10:00:00Z"),
        );
        dir.child("raw/notes.txt").write_str("not a result").unwrap();
        dir.child("raw/broken.json").write_str("{ not json").unwrap();

        let store = ResultStore::new(dir.path(), ["raw", "adaptive"]);
        let mut warnings = CollectWarnings::default();
        let results = store.load_all_with_warnings(&mut warnings).unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["newer", "older", "same-as-older", "undated"]);
        assert!(warnings.partitions.is_empty());
        assert_eq!(warnings.files.len(), 1);
        assert!(warnings.files[0].contains("broken.json"), "{:?}", warnings.files);
    }

    #[test]
    fn test_load_all_tolerates_field_variants() {
        let dir = Utf8TempDir::new().unwrap();
        dir.child("raw/listed-reasoning.json")
            .write_str(indoc! {r#"
                {
                    "timestamp": "2025-10-03T09:00:00Z",
                    "model_id": "gpt-5",
                    "scenario_id": "grief-vulnerable",
                    "conversation": [
                        { "role": "user", "content": "hi", "agent_reasoning": ["step 1", "step 2"] }
                    ],
                    "final_evaluation": { "end_reason": "max_turns", "total_turns": 1 },
                    "metadata": { "completed": true }
                }
            "#})
            .unwrap();
        dir.child("raw/fractional-duration.json")
            .write_str(indoc! {r#"
                {
                    "timestamp": "2025-10-02T12:00:00.250",
                    "model_id": "gpt-5",
                    "scenario_id": "grief-vulnerable",
                    "metadata": { "duration_ms": 1234.5, "completed": true, "system_prompt": null }
                }
            "#})
            .unwrap();
        write_result(
            &dir,
            "raw/dated.json",
            RecordFixture::new("x").timestamp("2025-10-02T10:00:00Z"),
        );

        let store = ResultStore::new(dir.path(), ["raw"]);
        let mut warnings = CollectWarnings::default();
        let results = store.load_all_with_warnings(&mut warnings).unwrap();

        assert_eq!(warnings.files, Vec::<String>::new());
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            ["listed-reasoning", "fractional-duration", "dated"],
            "a timestamp without an offset sorts among the dated records"
        );
        assert_eq!(results[1].metadata.duration_ms, 1234.5);
    }

    #[test]
    fn test_missing_partitions() {
        let dir = Utf8TempDir::new().unwrap();
        write_result(&dir, "raw/only.json", RecordFixture::new("x"));

        let store = ResultStore::new(dir.path(), ["raw", "adaptive"]);
        let mut warnings = CollectWarnings::default();
        let results = store.load_all_with_warnings(&mut warnings).unwrap();
        assert_eq!(results.len(), 1);
        assert!(warnings.partitions.is_empty());

        let missing = ResultStore::new(dir.path().join("nope"), ["raw"]);
        assert!(missing.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_partition() {
        let dir = Utf8TempDir::new().unwrap();
        // A file where a partition directory is expected can't be listed.
        dir.child("raw").write_str("").unwrap();
        write_result(&dir, "adaptive/kept.json", RecordFixture::new("x"));

        let store = ResultStore::new(dir.path(), ["raw", "adaptive"]);
        let mut warnings = CollectWarnings::default();
        let results = store.load_all_with_warnings(&mut warnings).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(warnings.partitions.len(), 1);
    }

    #[test]
    fn test_root_not_a_directory() {
        let dir = Utf8TempDir::new().unwrap();
        dir.child("file").write_str("").unwrap();
        let store = ResultStore::new(dir.path().join("file"), ["raw"]);
        assert!(matches!(
            store.load_all(),
            Err(StoreError::RootNotADirectory { .. })
        ));
    }

    #[test]
    fn test_load_by_id() {
        let dir = Utf8TempDir::new().unwrap();
        write_result(&dir, "raw/abc.json", RecordFixture::new("ignored"));

        let store = ResultStore::new(dir.path(), ["raw"]);
        let found = store.load_by_id("abc").unwrap();
        assert_eq!(found.map(|r| r.id), Some("abc".to_owned()));
        assert_eq!(store.load_by_id("ignored").unwrap(), None);
        assert_eq!(store.load_by_id("abc.json").unwrap(), None);
    }
}
