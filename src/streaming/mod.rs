//! Centralized streaming utilities for bedmean.
//!
//! Shared pieces of the single-pass pipeline:
//! - Zero-allocation field parsing
//! - Opt-in stream order validation
//! - Buffered result output
//!
//! The pass itself keeps O(k) transient state where k = max regions
//! overlapping any single position.

pub mod output;
pub mod parsing;
pub mod validation;

pub use output::{TsvWriter, MISSING_MARKER};
pub use parsing::{
    count_fields, is_missing_value, parse_u64_fast, parse_value, should_skip_line,
    split_row_prefix,
};
pub use validation::SortValidator;
