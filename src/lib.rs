//! General-purpose building blocks for application code.
//!
//! This crate provides:
//! - **Undo/redo**: a command stack over a fixed execute/undo/redo action triple
//! - **Sorted multiset**: per-item occurrence counts iterated in item order
//! - **Instance registry**: at most one shared instance per type, owned by the caller
//! - **Comparison validators**: rules relating two named fields of a model
//! - **Extension traits**: helpers for strings and iterators
//!
//! # Core Types
//!
//! - [`CommandStack`]: Linear undo/redo history built with [`CommandStack::builder`]
//! - [`SortedBag<T>`]: Multiset backed by an ordered map
//! - [`Registry`]: Lazily created single instances keyed by type
//! - [`CompareFields`]: Validator comparing two fields with a [`Comparison`]
//! - [`ValidationReport`]: Collected failures of several validators
//!
//! # Logging
//!
//! Operations emit structured events through [`tracing`]. The crate never
//! installs a subscriber; applications choose where events go.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use nlib::{CommandStack, SortedBag};
//!
//! let i = Cell::new(1);
//! let mut stack = CommandStack::builder()
//!     .execute(|| i.set(i.get() + 1))
//!     .undo(|| i.set(i.get() - 1))
//!     .build()
//!     .expect("both actions supplied");
//!
//! stack.execute();
//! stack.undo().expect("one step to undo");
//! assert_eq!(i.get(), 1);
//!
//! let bag: SortedBag<i32> = [1, 2, 1].into_iter().collect();
//! assert_eq!(bag.len(), 3);
//! assert_eq!(bag.get_count(&1), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bag;
mod command;
mod compare;
mod error;
pub mod ext;
mod registry;
mod validation;

pub use bag::{Iter as BagIter, SortedBag};
pub use command::{Action, CommandStack, CommandStackBuilder, RedoPolicy};
pub use compare::{compare_values, CompareFields, Comparison, FieldValue};
pub use error::{Error, ErrorKind, Result};
pub use registry::Registry;
pub use validation::{ValidationError, ValidationErrorKind, ValidationReport, Validator};
