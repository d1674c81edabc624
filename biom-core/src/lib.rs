//! Shared primitives for the BIOM table crates.
//!
//! - **Error types**: [`BiomError`], [`ErrorKind`] and [`Result`]
//! - **Traits**: [`Summarizable`] and [`NonZero`], implemented by the payload types
//!   and the table

pub mod error;
pub mod traits;

pub use error::{BiomError, ErrorKind, Result};
pub use traits::*;
