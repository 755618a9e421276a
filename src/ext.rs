//! Extension traits over standard library types.
//!
//! - [`StrExt`]: blank checks, char-safe slicing and display helpers for `str`
//! - [`IterExt`]: bagging, de-duplication and chunking for any iterator
//! - [`generate`] / [`generate_while`]: lazily generated sequences

mod iter;
mod string;

pub use iter::{generate, generate_while, Chunked, DistinctBy, Generate, IterExt};
pub use string::StrExt;
