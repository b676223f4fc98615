//! # Trialkit Frame
//!
//! Dynamic-row normalization for trialkit: turns the schema-free data rows
//! returned by the experiment-data service into typed, analysis-ready
//! columnar tables.
//!
//! ## Overview
//!
//! Every experiment defines its own data schema, so the rows coming back
//! from the service share only a handful of identity and time fields. This
//! crate models one row as a fixed struct plus an open map of custom fields
//! ([`DataRow`]), and [`normalize`] folds a batch of such rows into a single
//! [`Table`]:
//!
//! - the column set is the union of every row's columns,
//! - rows missing a column carry the explicit absence marker
//!   [`CellValue::Absent`] (distinct from a server-supplied null),
//! - time columns are parsed into UTC timestamps,
//! - identity columns are dictionary-encoded ([`ColumnType::Categorical`]),
//! - everything else keeps its source type.
//!
//! ## Example
//!
//! ```rust,ignore
//! use trialkit_frame::{normalize, CellValue};
//!
//! let table = normalize(&rows)?;
//! for row in 0..table.len() {
//!     match table.cell(row, "reaction_time") {
//!         Some(CellValue::Float(rt)) => println!("{rt:.3}"),
//!         Some(CellValue::Absent) => println!("n/a"),
//!         _ => {}
//!     }
//! }
//! ```

mod error;
mod normalize;
mod row;
mod table;
mod timestamp;

pub use error::FrameError;
pub use normalize::{normalize, records_to_table};
pub use row::{is_reserved_column, DataRow, MANDATORY_COLUMNS};
pub use table::{CellValue, Column, ColumnType, Table};
pub use timestamp::UtcDateTime;
