//! Dynamic order-statistics tree for Rust.
//!
//! This crate provides [`DosTree`], an ordered multimap backed by a red-black tree whose nodes
//! also record the size of their subtree. On top of the usual insert / delete / find it answers
//! two order-statistic queries in O(log n):
//!
//! - [`rank`](DosTree::rank) - the 1-based sorted position of a key
//! - [`select`](DosTree::select) - the key at a 1-based sorted position
//! - Indexing by [`Rank`] - e.g., `tree[Rank(1)]` for the smallest entry's value
//!
//! # Example
//!
//! ```
//! use dos_tree::{DosError, DosTree, Rank};
//!
//! let mut scores = DosTree::new();
//! scores.insert(100, "Alice");
//! scores.insert(85, "Bob");
//! scores.insert(92, "Carol");
//! scores.insert(85, "Dave");
//!
//! // Duplicate keys are kept, in insertion order.
//! assert_eq!(scores.len(), 4);
//!
//! // Order-statistic operations (O(log n))
//! assert_eq!(scores.select(3), Ok(&92));
//! assert_eq!(scores.rank(&100), Ok(4));
//! assert_eq!(scores[Rank(4)], "Alice");
//!
//! // Failures are ordinary results
//! assert_eq!(scores.rank(&70), Err(DosError::NotFound));
//! assert_eq!(scores.select(5), Err(DosError::OutOfRange { rank: 5, len: 4 }));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **O(log n) rank operations** - Subtree sizes are kept exact through every rotation
//! - **Self-checking** - [`DosTree::validate`] verifies every structural invariant; the
//!   `check-invariants` feature runs it after every mutation
//! - **`cli`** (default) - builds the `dost` binary, which drives a tree from a line-oriented
//!   command protocol (see [`command`])
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by index, so parent back-links carry no
//! ownership. Missing children point at a per-tree sentinel that reads as a black node of size
//! zero.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod command;
pub mod dos_tree;

pub use dos_tree::DosTree;
pub use error::{DosError, InvariantViolation};
pub use order_statistic::Rank;
