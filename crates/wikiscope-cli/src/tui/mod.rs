//! Terminal user interface for wikiscope.
//!
//! ## Entry points
//!
//! - [`browse::run_browse`] — interactive group tree with search, refresh,
//!   and an inline wiki reader.

pub mod browse;
