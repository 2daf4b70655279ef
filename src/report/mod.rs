//! Run summaries and console recaps.

pub mod summary;

pub use summary::*;
