//! bedmean: per-sample averaging of position-level measurements over BED
//! regions.
//!
//! Given a chromosome/position-sorted measurement matrix (one row per
//! position, one column per sample) and a BED file of regions, bedmean
//! computes the per-sample mean of all measurements falling inside each
//! region, in a single streaming pass.
//!
//! # Example
//!
//! ```rust,no_run
//! use bedmean::commands::RegionMeanCommand;
//!
//! let cmd = RegionMeanCommand::new();
//! let mut stdout = std::io::stdout();
//! let stats = cmd.run("matrix.tsv", "regions.bed", &mut stdout).unwrap();
//! eprintln!("{}", stats);
//! ```

pub mod bed;
pub mod commands;
pub mod matrix;
pub mod policy;
pub mod region;
pub mod streaming;
pub mod sweep;

// Re-export commonly used types
pub use bed::{parse_regions, read_regions, BedError, BedReader, RegionRecord};
pub use matrix::{MatrixReader, PositionRecord};
pub use policy::{CoordinateMode, MatchPolicy};
pub use region::{Region, RegionTable, SampleStat};
pub use sweep::SweepEngine;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bed::{parse_regions, read_regions, BedReader, RegionRecord};
    pub use crate::commands::{MeanStats, RegionMeanCommand};
    pub use crate::matrix::{MatrixReader, PositionRecord};
    pub use crate::policy::{CoordinateMode, MatchPolicy};
    pub use crate::region::{Region, RegionTable, SampleStat};
    pub use crate::sweep::SweepEngine;
}
