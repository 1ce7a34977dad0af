//! Region mean command: one pass from inputs to the result table.
//!
//! Orchestrates the pipeline: load regions, build the sorted table, read
//! the matrix header, sweep the position stream, finalize and write. The
//! whole run is single-threaded and strictly sequential; per-chromosome
//! state lives in the sweep engine and is reset at every chromosome run.

use std::io::{Read, Write};
use std::path::Path;

use crate::bed::{read_regions, BedError, RegionRecord, Result};
use crate::matrix::MatrixReader;
use crate::policy::{CoordinateMode, MatchPolicy};
use crate::region::RegionTable;
use crate::streaming::{SortValidator, TsvWriter};
use crate::sweep::SweepEngine;

/// Region mean command configuration.
#[derive(Debug, Clone, Default)]
pub struct RegionMeanCommand {
    /// Treat regions as 1-based inclusive instead of BED half-open.
    pub one_based: bool,
    /// Force inclusive matching regardless of the selected mode.
    pub inclusive: bool,
    /// Validate matrix stream order inline, failing fast on violation.
    pub check_sorted: bool,
}

impl RegionMeanCommand {
    pub fn new() -> Self {
        Self::default()
    }

    fn policy(&self) -> MatchPolicy {
        let mode = if self.one_based {
            CoordinateMode::OneBasedInclusive
        } else {
            CoordinateMode::ZeroBasedHalfOpen
        };
        MatchPolicy::new(mode, self.inclusive)
    }

    /// Execute the pass over files.
    pub fn run<P: AsRef<Path>, W: Write>(
        &self,
        matrix_path: P,
        regions_path: P,
        output: &mut W,
    ) -> Result<MeanStats> {
        let regions = read_regions(&regions_path)?;
        if regions.is_empty() {
            return Err(BedError::InvalidFormat(format!(
                "No regions read from {}",
                regions_path.as_ref().display()
            )));
        }
        let matrix = MatrixReader::from_path(&matrix_path)?;
        self.run_streams(matrix, regions, output)
    }

    /// Execute the pass over already-opened inputs.
    pub fn run_streams<R: Read, W: Write>(
        &self,
        mut matrix: MatrixReader<R>,
        regions: Vec<RegionRecord>,
        output: &mut W,
    ) -> Result<MeanStats> {
        if regions.is_empty() {
            return Err(BedError::InvalidFormat(
                "Region list is empty".to_string(),
            ));
        }

        let mut table = RegionTable::from_records(regions);
        table.init_samples(matrix.n_samples());

        let mut engine = SweepEngine::new(self.policy(), matrix.n_samples());
        let mut validator = self.check_sorted.then(SortValidator::new);
        let mut records: u64 = 0;

        while let Some(record) = matrix.read_record()? {
            if let Some(v) = validator.as_mut() {
                v.validate(&String::from_utf8_lossy(record.chrom), record.pos)?;
            }
            records += 1;
            engine.step(&mut table, &record);
        }

        let mut writer = TsvWriter::new(output);
        writer.write_header(matrix.samples())?;
        for region in table.iter() {
            writer.write_region_row(region)?;
        }
        writer.flush()?;

        Ok(MeanStats {
            regions: table.len(),
            samples: matrix.n_samples(),
            records,
            skipped_rows: matrix.skipped_rows(),
            dropped_transitions: engine.dropped_transitions(),
            short_records: engine.short_records(),
            values_accumulated: engine.values_accumulated(),
            max_active: engine.max_active(),
        })
    }
}

/// Statistics from a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanStats {
    /// Number of regions in the output.
    pub regions: usize,
    /// Number of samples declared by the matrix header.
    pub samples: usize,
    /// Position records consumed.
    pub records: u64,
    /// Structurally unusable matrix rows dropped by the reader.
    pub skipped_rows: u64,
    /// Records dropped at chromosome transitions.
    pub dropped_transitions: u64,
    /// Overlapping records with too few value columns.
    pub short_records: u64,
    /// Total (region, sample) additions performed.
    pub values_accumulated: u64,
    /// Maximum size of the active region set.
    pub max_active: usize,
}

impl std::fmt::Display for MeanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Regions: {}, Samples: {}, Records: {}, Skipped rows: {}, Transition drops: {}, Short records: {}, Values accumulated: {}, Max active: {}",
            self.regions,
            self.samples,
            self.records,
            self.skipped_rows,
            self.dropped_transitions,
            self.short_records,
            self.values_accumulated,
            self.max_active
        )
    }
}
