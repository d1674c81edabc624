//! Biological Observation Matrix (BIOM) tables.
//!
//! This crate provides an in-memory BIOM table that stays valid under every
//! mutation:
//!
//! - **Table**: [`Biom`], built from a [`BiomInit`] record
//! - **Payload**: [`Matrix`] over a [`DenseData`] grid or [`SparseData`] triplets
//! - **Axes**: ordered [`AxisEntry`] lists with unique ids and free-form metadata
//! - **Codec**: JSON reading and writing, plus an injectable
//!   [`ConversionService`] for HDF5
//!
//! # Quick start
//!
//! ```
//! use biom_table::{Biom, Dimension, MatrixType, MetadataSource};
//! use biom_core::Summarizable;
//!
//! let mut table: Biom = r#"{
//!     "rows": [{"id": "otu1"}, {"id": "otu2"}],
//!     "columns": [{"id": "s1"}, {"id": "s2"}],
//!     "data": [[0, 0, 3], [1, 1, 8]]
//! }"#
//! .parse()
//! .unwrap();
//!
//! table.set_matrix_type(MatrixType::Dense);
//! table
//!     .add_metadata(Dimension::Columns, "site", MetadataSource::default_value("gut"))
//!     .unwrap();
//!
//! assert_eq!(table.nnz(), 2);
//! assert_eq!(table.summary(), "Biom OTU table: 2 rows \u{00d7} 2 columns, 2 nonzeros (dense)");
//! assert!(table.to_json_string().unwrap().contains("\"matrix_type\":\"dense\""));
//! ```

pub mod axis;
pub mod codec;
pub mod convert;
pub mod dense;
pub mod element;
pub mod matrix;
pub mod metadata;
pub mod sparse;
pub mod table;
pub mod vocab;

pub use axis::{Axis, AxisEntry};
pub use codec::{ParseOptions, WriteOptions, Written};
pub use convert::{ConversionRequest, ConversionResponse, ConversionService, Direction};
#[cfg(feature = "http")]
pub use convert::{HttpConversionConfig, HttpConversionService};
pub use dense::DenseData;
pub use element::Element;
pub use matrix::{Data, Matrix};
pub use metadata::{Dimension, Metadata, MetadataSource};
pub use sparse::SparseData;
pub use table::{Biom, BiomInit};
pub use vocab::{Field, MatrixElementType, MatrixType, TableType};
