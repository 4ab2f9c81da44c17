//! Core table model and I/O operations.

pub mod loaders;
pub mod table;
pub mod transforms;
pub mod writers;

pub use loaders::{read_table, LoaderError};
pub use table::{Column, Table, TableError, Value};
pub use writers::{write_tsv, WriteError};
