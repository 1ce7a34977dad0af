//! Buffered TSV output for region averages.

use crate::bed::BedError;
use crate::region::Region;
use std::io::{BufWriter, Write};

/// Textual placeholder for a (region, sample) pair with no contributing
/// measurements.
pub const MISSING_MARKER: &str = ".";

/// Buffer size for TsvWriter (8MB default).
const DEFAULT_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Buffered writer for the result table.
///
/// One header row (`name` plus sample names), then one row per region in
/// table order. Averages are written with fixed 6-decimal precision.
pub struct TsvWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> TsvWriter<W> {
    /// Create a new writer with the default 8MB buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    /// Create a new writer with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
        }
    }

    /// Write the header row.
    pub fn write_header(&mut self, sample_names: &[String]) -> Result<(), BedError> {
        self.writer.write_all(b"name").map_err(BedError::Io)?;
        for name in sample_names {
            self.writer.write_all(b"\t").map_err(BedError::Io)?;
            self.writer.write_all(name.as_bytes()).map_err(BedError::Io)?;
        }
        self.writer.write_all(b"\n").map_err(BedError::Io)?;
        Ok(())
    }

    /// Write one finalized region row: name, then one cell per sample.
    pub fn write_region_row(&mut self, region: &Region) -> Result<(), BedError> {
        self.writer
            .write_all(region.name.as_bytes())
            .map_err(BedError::Io)?;
        for stat in &region.stats {
            self.writer.write_all(b"\t").map_err(BedError::Io)?;
            match stat.mean() {
                Some(mean) => write!(self.writer, "{:.6}", mean).map_err(BedError::Io)?,
                None => self
                    .writer
                    .write_all(MISSING_MARKER.as_bytes())
                    .map_err(BedError::Io)?,
            }
        }
        self.writer.write_all(b"\n").map_err(BedError::Io)?;
        Ok(())
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<(), BedError> {
        self.writer.flush().map_err(BedError::Io)?;
        Ok(())
    }
}
