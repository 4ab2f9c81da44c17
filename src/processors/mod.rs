//! Table processors, one per input kind.

pub mod alkanes;
pub mod clustering;
pub mod filenames;
pub mod metadata;
pub mod msdial;
pub mod sequence;

// Re-export key types for convenience
pub use alkanes::{process_alkanes, process_alkanes_file};
pub use clustering::{find_clusters, UnionFind};
pub use metadata::{process_metadata, process_metadata_file};
pub use msdial::{
    aggregations, find_all_duplicates, process_msdial, process_msdial_file, shape_table,
    Aggregation, MsdialError, ShapedTable,
};
pub use sequence::{process_sequence, process_sequence_file, validate_injection_order, SequenceError};
