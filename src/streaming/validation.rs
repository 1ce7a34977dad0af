//! Opt-in sort validation for the measurement stream.
//!
//! The sweep assumes chromosome runs are contiguous and positions are
//! non-decreasing within a run; it performs no check of its own, and a
//! violating stream silently corrupts activation and eviction. This
//! validator makes the assumption checkable: wired to `--check-sorted`, it
//! runs inline and fails fast on the first violation.

use rustc_hash::FxHashSet;

use crate::bed::BedError;

/// Inline order validator for the position stream.
///
/// Validates that:
/// 1. All records for a chromosome are contiguous (no interleaving)
/// 2. Within a chromosome, positions are non-decreasing
///
/// Any consistent chromosome order is accepted; only revisiting a finished
/// chromosome is an error.
#[derive(Debug, Default)]
pub struct SortValidator {
    prev_chrom: Option<String>,
    prev_pos: u64,
    seen_chroms: FxHashSet<String>,
    record_count: usize,
}

impl SortValidator {
    /// Create a new sort validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate that the given record maintains stream order.
    ///
    /// Returns Ok(()) if valid, Err if out of order.
    #[inline]
    pub fn validate(&mut self, chrom: &str, pos: u64) -> Result<(), BedError> {
        self.record_count += 1;

        if let Some(ref pc) = self.prev_chrom {
            if chrom != pc {
                if self.seen_chroms.contains(chrom) {
                    return Err(BedError::InvalidFormat(format!(
                        "Stream not sorted: chromosome '{}' at record {} was seen earlier (chromosomes must be contiguous)",
                        chrom, self.record_count
                    )));
                }
                self.seen_chroms.insert(pc.clone());
            } else if pos < self.prev_pos {
                return Err(BedError::InvalidFormat(format!(
                    "Stream not sorted: position {} at record {} comes after {} on {}",
                    pos, self.record_count, self.prev_pos, chrom
                )));
            }
        }

        if self.prev_chrom.as_deref() != Some(chrom) {
            self.prev_chrom = Some(chrom.to_string());
        }
        self.prev_pos = pos;

        Ok(())
    }

    /// Get the number of records validated.
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_stream() {
        let mut validator = SortValidator::new();
        assert!(validator.validate("chr1", 100).is_ok());
        assert!(validator.validate("chr1", 100).is_ok());
        assert!(validator.validate("chr1", 200).is_ok());
        assert!(validator.validate("chr2", 50).is_ok());
        assert_eq!(validator.record_count(), 4);
    }

    #[test]
    fn test_decreasing_position_fails() {
        let mut validator = SortValidator::new();
        assert!(validator.validate("chr1", 200).is_ok());
        assert!(validator.validate("chr1", 100).is_err());
    }

    #[test]
    fn test_interleaved_chromosome_fails() {
        let mut validator = SortValidator::new();
        assert!(validator.validate("chr1", 100).is_ok());
        assert!(validator.validate("chr2", 100).is_ok());
        let err = validator.validate("chr1", 300).unwrap_err();
        assert!(err.to_string().contains("contiguous"));
    }

    #[test]
    fn test_any_chromosome_order_accepted() {
        // chr2 before chr1 is fine as long as runs are contiguous.
        let mut validator = SortValidator::new();
        assert!(validator.validate("chr2", 100).is_ok());
        assert!(validator.validate("chr1", 100).is_ok());
    }

    #[test]
    fn test_position_resets_across_chromosomes() {
        let mut validator = SortValidator::new();
        assert!(validator.validate("chr1", 5000).is_ok());
        assert!(validator.validate("chr2", 10).is_ok());
    }
}
