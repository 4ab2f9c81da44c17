//! Normalisation of mass-spectrometry batch tables.
//!
//! This crate provides tools for:
//! - Loading CSV, tab-separated and Excel exports into an in-memory table
//! - Normalising metadata, sequence and alkane tables to a canonical TSV layout
//! - Merging duplicate MS-DIAL alignments via transitive clustering
//!
//! # Example
//!
//! ```no_run
//! use rcx_tk::{core::read_table, processors::msdial::process_msdial, MsdialConfig};
//!
//! let raw = read_table("alignment.txt").unwrap();
//! let merged = process_msdial(&raw, &MsdialConfig::default()).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{AlkaneConfig, ColumnMapping, MetadataConfig, MsdialConfig, PipelineConfig};
pub use core::table::{Table, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
