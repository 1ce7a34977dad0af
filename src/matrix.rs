//! Streaming reader for the measurement matrix.
//!
//! The matrix is tab-separated text with a mandatory header row naming the
//! samples (`chromosome\tposition\tsample1...`), followed by one row per
//! measured position. Sample cells are handed through raw; interpretation
//! (missing markers, numeric parse) happens at accumulation time.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::bed::{BedError, Result};
use crate::streaming::parsing::{count_fields, parse_u64_fast, split_row_prefix};

/// One row of the measurement stream, borrowed from the reader's buffer.
///
/// `values` is the raw tail of the row after the position column; None when
/// the row carries no value columns at all.
#[derive(Debug, Clone, Copy)]
pub struct PositionRecord<'a> {
    pub chrom: &'a [u8],
    pub pos: u64,
    pub values: Option<&'a [u8]>,
}

impl<'a> PositionRecord<'a> {
    /// Number of value columns present on this row.
    #[inline]
    pub fn value_count(&self) -> usize {
        match self.values {
            Some(v) => count_fields(v),
            None => 0,
        }
    }

    /// Iterate the raw value cells in column order.
    pub fn values(&self) -> impl Iterator<Item = &'a [u8]> {
        self.values.into_iter().flat_map(|v| v.split(|&b| b == b'\t'))
    }
}

/// A streaming matrix reader.
///
/// Construction consumes and validates the header; a missing header or one
/// declaring no samples is fatal. Body rows that are blank or have fewer
/// than two columns are skipped, as are rows whose position fails integer
/// parse; skips are counted but never abort the run.
pub struct MatrixReader<R: Read> {
    reader: BufReader<R>,
    samples: Vec<String>,
    line_number: usize,
    skipped_rows: u64,
    buffer: String,
}

impl MatrixReader<File> {
    /// Open a matrix file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read> MatrixReader<R> {
    /// Create a reader from any readable source, consuming the header row.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        let mut header = String::with_capacity(1024);
        let bytes_read = reader.read_line(&mut header)?;
        if bytes_read == 0 {
            return Err(BedError::InvalidFormat(
                "Matrix is empty: missing header row".to_string(),
            ));
        }

        // Trim line terminators only: a trailing tab is an empty column.
        let fields: Vec<&str> = header.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 3 {
            return Err(BedError::InvalidFormat(format!(
                "Matrix header must declare chromosome, position and at least one sample; got {} column(s)",
                fields.len()
            )));
        }
        let samples = fields[2..].iter().map(|s| s.trim().to_string()).collect();

        Ok(Self {
            reader,
            samples,
            line_number: 1,
            skipped_rows: 0,
            buffer: String::with_capacity(1024),
        })
    }

    /// Sample names declared by the header, in column order.
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Number of declared samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Rows dropped so far for being structurally unusable.
    pub fn skipped_rows(&self) -> u64 {
        self.skipped_rows
    }

    /// Line number of the most recently read row (the header is line 1).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next position record.
    pub fn read_record(&mut self) -> Result<Option<PositionRecord<'_>>> {
        // The skip-and-retry loop carries byte offsets, not borrows, so the
        // buffer can be refilled between iterations; the record is sliced
        // out of the buffer once a usable row is found.
        let (line_len, chrom_len, pos, values_start) = loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim_end_matches(['\r', '\n']).as_bytes();
            if line.is_empty() {
                continue;
            }

            let Some((chrom, pos_bytes, values)) = split_row_prefix(line) else {
                // Fewer than two columns: nothing to anchor the row to.
                self.skipped_rows += 1;
                continue;
            };

            let Some(pos) = parse_u64_fast(pos_bytes) else {
                self.skipped_rows += 1;
                continue;
            };

            break (
                line.len(),
                chrom.len(),
                pos,
                values.map(|v| line.len() - v.len()),
            );
        };

        let line = &self.buffer.as_bytes()[..line_len];
        Ok(Some(PositionRecord {
            chrom: &line[..chrom_len],
            pos,
            values: values_start.map(|start| &line[start..]),
        }))
    }
}
