//! This crate provides a sliding-window rank-order filter: a running
//! minimum, maximum, median or any percentile in between over a sequence of
//! totally ordered values.
//!
//! Sorting every window from scratch costs O(w log w) per output for a window
//! of w samples. Here the window is held in an order-statistic tree and the
//! output position is carried from one window to the next, bringing the cost
//! down to O(log w) per output. Both ends of the sequence are extended by
//! reflection so that every output sees a full window.
//!
//! # Examples
//!
//! ```
//! use rank_filter::rank_order_filter_1d;
//!
//! let src = [1, 9, 2, 3, 8, 4];
//! let mut dst = [0; 6];
//! rank_order_filter_1d(&src, &mut dst, 1, 0.5).unwrap();
//! assert_eq!(dst, [9, 2, 3, 3, 4, 8]);
//! ```
#![deny(missing_docs, missing_copy_implementations, missing_debug_implementations,
        unstable_features, unused_import_braces)]

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[cfg(feature = "serde_support")]
#[macro_use]
extern crate serde_derive;

pub mod rank_filter;
pub mod util;

pub use crate::rank_filter::{rank_order_filter_1d, Error, RankFilter};
