//! Named genomic intervals used to scope range queries.

use std::cmp::Ordering;
use std::fmt;

use crate::config::region_start_offset;
use crate::error::{RegionError, Result};
use crate::genome::Genome;

/// A half-open interval `[start, end)` on a chromosome of a [`Genome`],
/// with an optional label.
///
/// Intervals order by `(chrom_id, start, end)`; the name only breaks ties
/// so that ordering stays consistent with equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedInterval {
    pub chrom_id: u32,
    pub start: u64,
    pub end: u64,
    pub name: Option<String>,
}

impl NamedInterval {
    /// Create a new unnamed interval. Fails if `start > end`.
    pub fn new(chrom_id: u32, start: u64, end: u64) -> Result<Self> {
        if start > end {
            return Err(RegionError::Parse(format!(
                "Start ({}) > end ({})",
                start, end
            )));
        }
        Ok(Self {
            chrom_id,
            start,
            end,
            name: None,
        })
    }

    /// Attach a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse a `chrom:start-end` region string.
    ///
    /// Coordinates follow [`crate::config`]: 1-based inclusive by default, so
    /// `chr1:101-200` is `[100, 200)`. Thousands separators are ignored and the
    /// chromosome is everything before the last `:`. The written start may
    /// not exceed the written end in either convention.
    pub fn parse(text: &str, genome: &Genome) -> Result<Self> {
        let text = text.trim();
        let (chrom, range) = text.rsplit_once(':').ok_or_else(|| {
            RegionError::Parse(format!("Expected chrom:start-end, got '{}'", text))
        })?;

        let range = range.replace(',', "");
        let (start, end) = range.split_once('-').ok_or_else(|| {
            RegionError::Parse(format!("Expected start-end range in '{}'", text))
        })?;
        let start = parse_coord(start, "start", text)?;
        let end = parse_coord(end, "end", text)?;

        if start > end {
            return Err(RegionError::Parse(format!(
                "Region '{}' has start > end",
                text
            )));
        }

        let offset = region_start_offset();
        if start < offset {
            return Err(RegionError::Parse(format!(
                "Region '{}' starts before the chromosome",
                text
            )));
        }

        let chrom_id = genome.chrom_id(chrom)?;
        Self::new(chrom_id, start - offset, end)
    }

    /// Interval spanning the entire chromosome.
    pub fn from_chromosome(chrom_id: u32, genome: &Genome) -> Self {
        Self {
            chrom_id,
            start: 0,
            end: genome.chrom_len(chrom_id),
            name: None,
        }
    }

    /// Build an interval from region-file fields `[chrom, start, end, name?]`.
    ///
    /// Coordinates are 0-based half-open (BED). Comment lines must be skipped
    /// by the caller.
    pub fn from_region_file_line(fields: &[&str], genome: &Genome) -> Result<Self> {
        if fields.len() < 3 {
            return Err(RegionError::Parse(format!(
                "Expected at least 3 fields, got {}",
                fields.len()
            )));
        }

        let chrom_id = genome.chrom_id(fields[0])?;
        let start: u64 = fields[1].trim().parse().map_err(|_| {
            RegionError::Parse(format!("Invalid start position: '{}'", fields[1]))
        })?;
        let end: u64 = fields[2].trim().parse().map_err(|_| {
            RegionError::Parse(format!("Invalid end position: '{}'", fields[2]))
        })?;

        let interval = Self::new(chrom_id, start, end)?;
        Ok(match fields.get(3).map(|s| s.trim()) {
            Some(name) if !name.is_empty() => interval.with_name(name),
            _ => interval,
        })
    }

    /// Clamp the interval to the chromosome bounds. Idempotent.
    pub fn trim(&mut self, genome: &Genome) {
        self.end = self.end.min(genome.chrom_len(self.chrom_id));
        self.start = self.start.min(self.end);
    }

    /// Functional form of [`NamedInterval::trim`].
    pub fn trimmed(mut self, genome: &Genome) -> Self {
        self.trim(genome);
        self
    }

    /// Returns the length of the interval.
    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns true if the interval has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this interval overlaps with another.
    #[inline]
    pub fn overlaps(&self, other: &NamedInterval) -> bool {
        self.chrom_id == other.chrom_id && self.start < other.end && other.start < self.end
    }

    /// Name of the chromosome this interval lies on.
    #[inline]
    pub fn chrom_name<'a>(&self, genome: &'a Genome) -> &'a str {
        genome.chrom_name(self.chrom_id)
    }

    /// Render as a `chrom:start-end` region string that parses back to `self`.
    pub fn display<'a>(&'a self, genome: &'a Genome) -> RegionDisplay<'a> {
        RegionDisplay {
            interval: self,
            genome,
        }
    }

    /// Render as a BED line (without newline).
    pub fn to_bed(&self, genome: &Genome) -> String {
        let mut line = format!("{}\t{}\t{}", self.chrom_name(genome), self.start, self.end);
        if let Some(ref name) = self.name {
            line.push('\t');
            line.push_str(name);
        }
        line
    }
}

fn parse_coord(value: &str, field_name: &str, text: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        RegionError::Parse(format!(
            "Invalid {} position '{}' in region '{}'",
            field_name, value, text
        ))
    })
}

impl Ord for NamedInterval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chrom_id
            .cmp(&other.chrom_id)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for NamedInterval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Display adapter returned by [`NamedInterval::display`].
pub struct RegionDisplay<'a> {
    interval: &'a NamedInterval,
    genome: &'a Genome,
}

impl fmt::Display for RegionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}",
            self.interval.chrom_name(self.genome),
            self.interval.start + region_start_offset(),
            self.interval.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::set_zero_based_regions;
    use serial_test::serial;

    fn genome() -> Genome {
        let mut genome = Genome::new();
        genome.push("chr1", 1000);
        genome.push("chr2", 500);
        genome.push("HLA-A*01:01", 300);
        genome
    }

    #[test]
    #[serial]
    fn test_parse_one_based() {
        set_zero_based_regions(false);
        let g = genome();
        let interval = NamedInterval::parse("chr2:101-200", &g).unwrap();
        assert_eq!(interval.chrom_id, 1);
        assert_eq!(interval.start, 100);
        assert_eq!(interval.end, 200);
        assert_eq!(interval.name, None);
    }

    #[test]
    #[serial]
    fn test_parse_zero_based() {
        set_zero_based_regions(true);
        let g = genome();
        let interval = NamedInterval::parse("chr1:0-50", &g).unwrap();
        assert_eq!((interval.start, interval.end), (0, 50));
        set_zero_based_regions(false);
    }

    #[test]
    #[serial]
    fn test_parse_commas_and_colon_names() {
        set_zero_based_regions(false);
        let g = genome();
        let interval = NamedInterval::parse("chr1:1-1,000", &g).unwrap();
        assert_eq!((interval.start, interval.end), (0, 1000));

        let hla = NamedInterval::parse("HLA-A*01:01:11-20", &g).unwrap();
        assert_eq!(hla.chrom_id, 2);
        assert_eq!((hla.start, hla.end), (10, 20));
    }

    #[test]
    #[serial]
    fn test_parse_errors() {
        set_zero_based_regions(false);
        let g = genome();
        assert!(matches!(
            NamedInterval::parse("chrZ:1-10", &g),
            Err(RegionError::UnknownChromosome(_))
        ));
        assert!(matches!(
            NamedInterval::parse("chr1:a-10", &g),
            Err(RegionError::Parse(_))
        ));
        assert!(matches!(
            NamedInterval::parse("chr1:50-10", &g),
            Err(RegionError::Parse(_))
        ));
        assert!(matches!(
            NamedInterval::parse("chr1:0-10", &g),
            Err(RegionError::Parse(_))
        ));
        assert!(matches!(
            NamedInterval::parse("chr1:-5-10", &g),
            Err(RegionError::Parse(_))
        ));
        assert!(matches!(
            NamedInterval::parse("chr1:101-100", &g),
            Err(RegionError::Parse(_))
        ));
        assert!(matches!(
            NamedInterval::parse("chr1:100", &g),
            Err(RegionError::Parse(_))
        ));
    }

    #[test]
    #[serial]
    fn test_display_round_trip() {
        set_zero_based_regions(false);
        let g = genome();
        let interval = NamedInterval::new(0, 99, 200).unwrap();
        let text = interval.display(&g).to_string();
        assert_eq!(text, "chr1:100-200");
        assert_eq!(NamedInterval::parse(&text, &g).unwrap(), interval);

        // An empty interval has no 1-based spelling
        let empty = NamedInterval::new(0, 30, 30).unwrap();
        let text = empty.display(&g).to_string();
        assert_eq!(text, "chr1:31-30");
        assert!(matches!(
            NamedInterval::parse(&text, &g),
            Err(RegionError::Parse(_))
        ));

        set_zero_based_regions(true);
        let text = empty.display(&g).to_string();
        assert_eq!(text, "chr1:30-30");
        assert_eq!(NamedInterval::parse(&text, &g).unwrap(), empty);
        set_zero_based_regions(false);
    }

    #[test]
    fn test_from_region_file_line() {
        let g = genome();
        let interval = NamedInterval::from_region_file_line(&["chr2", "10", "20", "exon1"], &g)
            .unwrap();
        assert_eq!(interval.chrom_id, 1);
        assert_eq!((interval.start, interval.end), (10, 20));
        assert_eq!(interval.name.as_deref(), Some("exon1"));

        let unnamed = NamedInterval::from_region_file_line(&["chr1", "0", "5"], &g).unwrap();
        assert_eq!(unnamed.name, None);

        assert!(NamedInterval::from_region_file_line(&["chr1", "x", "5"], &g).is_err());
        assert!(NamedInterval::from_region_file_line(&["chr1", "0"], &g).is_err());
        assert!(matches!(
            NamedInterval::from_region_file_line(&["chr9", "0", "5"], &g),
            Err(RegionError::UnknownChromosome(_))
        ));
    }

    #[test]
    fn test_from_chromosome() {
        let g = genome();
        let interval = NamedInterval::from_chromosome(1, &g);
        assert_eq!((interval.start, interval.end), (0, 500));
    }

    #[test]
    fn test_trim_idempotent() {
        let g = genome();
        let mut interval = NamedInterval::new(1, 450, 900).unwrap();
        interval.trim(&g);
        assert_eq!((interval.start, interval.end), (450, 500));

        let again = interval.clone().trimmed(&g);
        assert_eq!(again, interval);

        let beyond = NamedInterval::new(1, 700, 900).unwrap().trimmed(&g);
        assert_eq!((beyond.start, beyond.end), (500, 500));
        assert!(beyond.is_empty());
    }

    #[test]
    fn test_interval_ordering() {
        let mut intervals = [
            NamedInterval::new(1, 100, 200).unwrap(),
            NamedInterval::new(0, 200, 300).unwrap(),
            NamedInterval::new(0, 100, 250).unwrap(),
            NamedInterval::new(0, 100, 200).unwrap(),
        ];
        intervals.sort();

        assert_eq!((intervals[0].chrom_id, intervals[0].end), (0, 200));
        assert_eq!(intervals[1].end, 250);
        assert_eq!(intervals[2].start, 200);
        assert_eq!(intervals[3].chrom_id, 1);
    }

    #[test]
    fn test_overlap_and_bed() {
        let g = genome();
        let a = NamedInterval::new(0, 100, 200).unwrap().with_name("a");
        let b = NamedInterval::new(0, 200, 300).unwrap();
        let c = NamedInterval::new(0, 150, 250).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert_eq!(a.to_bed(&g), "chr1\t100\t200\ta");
        assert_eq!(a.len(), 100);
    }
}
