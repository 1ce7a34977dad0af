//! Streaming BED region parser.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading inputs or writing results.
#[derive(Error, Debug)]
pub enum BedError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, BedError>;

/// A raw region as read from a BED file: location plus a name.
///
/// The name is taken from the fourth column when present, otherwise
/// synthesized as `{chrom}-{start}-{end}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: String,
}

impl RegionRecord {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64, name: impl Into<String>) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            name: name.into(),
        }
    }
}

/// Synthesize the default name for an unnamed region.
pub fn default_region_name(chrom: &str, start: u64, end: u64) -> String {
    let mut itoa_buf = itoa::Buffer::new();
    let mut name = String::with_capacity(chrom.len() + 2 + 40);
    name.push_str(chrom);
    name.push('-');
    name.push_str(itoa_buf.format(start));
    name.push('-');
    name.push_str(itoa_buf.format(end));
    name
}

/// A streaming BED region reader.
///
/// Blank lines, `#` comments, and `track`/`browser` lines are skipped, as
/// are records with fewer than three fields. Extra columns beyond the name
/// are ignored.
pub struct BedReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: String,
}

impl BedReader<File> {
    /// Open a BED file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> BedReader<R> {
    /// Create a new BED reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            buffer: String::with_capacity(1024),
        }
    }

    /// Read the next region record.
    pub fn read_record(&mut self) -> Result<Option<RegionRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_line(&mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if crate::streaming::should_skip_line(line.as_bytes()) {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                // Short records carry no region; tolerated, not fatal.
                continue;
            }

            let chrom = fields[0].trim().to_string();
            let start = self.parse_position(fields[1].trim(), "start")?;
            let end = self.parse_position(fields[2].trim(), "end")?;

            let name = match fields.get(3) {
                Some(n) if !n.trim().is_empty() => n.trim().to_string(),
                _ => default_region_name(&chrom, start, end),
            };

            return Ok(Some(RegionRecord {
                chrom,
                start,
                end,
                name,
            }));
        }
    }

    fn parse_position(&self, s: &str, field_name: &str) -> Result<u64> {
        s.parse().map_err(|_| BedError::Parse {
            line: self.line_number,
            message: format!("Invalid {} position: '{}'", field_name, s),
        })
    }

    /// Get an iterator over all records.
    pub fn records(self) -> BedRecordIter<R> {
        BedRecordIter { reader: self }
    }
}

/// Iterator over BED region records.
pub struct BedRecordIter<R: Read> {
    reader: BedReader<R>,
}

impl<R: Read> Iterator for BedRecordIter<R> {
    type Item = Result<RegionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read all regions from a BED file.
pub fn read_regions<P: AsRef<Path>>(path: P) -> Result<Vec<RegionRecord>> {
    let reader = BedReader::from_path(path)?;
    reader.records().collect()
}

/// Parse regions from a string (useful for testing).
pub fn parse_regions(content: &str) -> Result<Vec<RegionRecord>> {
    let reader = BedReader::new(content.as_bytes());
    reader.records().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_region() {
        let content = "chr1\t100\t200\tpromoter1\n";
        let regions = parse_regions(content).unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].chrom, "chr1");
        assert_eq!(regions[0].start, 100);
        assert_eq!(regions[0].end, 200);
        assert_eq!(regions[0].name, "promoter1");
    }

    #[test]
    fn test_synthesized_name() {
        let content = "chr2\t5000\t6000\n";
        let regions = parse_regions(content).unwrap();

        assert_eq!(regions[0].name, "chr2-5000-6000");
    }

    #[test]
    fn test_skip_comments_and_blank_lines() {
        let content = "# header comment\n\nchr1\t100\t200\n";
        let regions = parse_regions(content).unwrap();

        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_skip_track_lines() {
        let content = "track name=test\nbrowser position chr1:1-1000\nchr1\t100\t200\n";
        let regions = parse_regions(content).unwrap();

        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_short_record_skipped() {
        let content = "chr1\t100\nchr1\t100\t200\n";
        let regions = parse_regions(content).unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].start, 100);
        assert_eq!(regions[0].end, 200);
    }

    #[test]
    fn test_invalid_coordinate() {
        let content = "chr1\t1e5\t200\n";
        let result = parse_regions(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_columns_ignored() {
        let content = "chr1\t100\t200\tr1\t960\t+\n";
        let regions = parse_regions(content).unwrap();

        assert_eq!(regions[0].name, "r1");
    }
}
