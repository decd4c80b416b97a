// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Aggregation and classification of recorded persuasion-test transcripts.
//!
//! Results are loaded from disk by [`store::ResultStore`], narrowed to evaluated runs by
//! [`select`], and then summarized: per group by [`aggregate`] and [`tables`], per model into
//! behavioral archetypes by [`archetype`], and per conversation turn by [`temporal`]. The
//! [`report`] module combines these into the study-level views, and [`display`] renders them.
//!
//! Nothing past loading fails. Empty inputs and zero denominators produce defined defaults.

pub mod aggregate;
pub mod archetype;
pub mod config;
pub mod display;
pub mod errors;
pub mod flags;
pub mod group;
pub mod report;
pub mod select;
pub mod stats;
pub mod store;
pub mod tables;
pub mod temporal;
