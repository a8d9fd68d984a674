//! Region set construction.
//!
//! A region set comes from exactly one source: explicit region strings, a
//! region file, or the whole genome. The first non-empty source wins.
//!
//! Region files are tab-delimited `chrom  start  end  [name]` with 0-based
//! half-open coordinates and `#` comment lines. Overlap handling downstream
//! assumes the set is ordered by `(chrom_id, start)` in genome order; build
//! with `sort = true` unless the file is already known to be in that order.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::genome::Genome;
use crate::interval::NamedInterval;
use crate::io::open_possible_gzip;

/// Where a region set comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSelection {
    /// Region strings: `chrom:start-end` or a bare chromosome name.
    Explicit(Vec<String>),
    /// Path to a region file.
    File(PathBuf),
    /// One interval per chromosome.
    WholeGenome,
}

impl RegionSelection {
    /// Pick the selection from optional command-line style inputs.
    ///
    /// A non-empty explicit list takes precedence over a file; the two are
    /// never merged.
    pub fn from_args(regions: Option<Vec<String>>, regions_file: Option<PathBuf>) -> Self {
        match (regions, regions_file) {
            (Some(regions), _) if !regions.is_empty() => RegionSelection::Explicit(regions),
            (_, Some(path)) => RegionSelection::File(path),
            _ => RegionSelection::WholeGenome,
        }
    }

    /// True when no regions were requested: whole genome, or an empty
    /// explicit list.
    pub fn is_whole_genome(&self) -> bool {
        match self {
            RegionSelection::WholeGenome => true,
            RegionSelection::Explicit(regions) => regions.is_empty(),
            RegionSelection::File(_) => false,
        }
    }
}

fn whole_genome(genome: &Genome) -> Vec<NamedInterval> {
    genome
        .chromosomes()
        .map(|(id, name, _)| NamedInterval::from_chromosome(id, genome).with_name(name))
        .collect()
}

/// Build the region set for `selection`, trimmed to chromosome bounds.
///
/// Duplicate and overlapping intervals are kept. Any parse failure aborts
/// the whole build.
pub fn build_regions(
    selection: &RegionSelection,
    genome: &Genome,
    sort: bool,
) -> Result<Vec<NamedInterval>> {
    let mut intervals = match selection {
        _ if selection.is_whole_genome() => whole_genome(genome),
        RegionSelection::Explicit(regions) => regions
            .iter()
            .map(|region| parse_region_arg(region, genome))
            .collect::<Result<Vec<_>>>()?,
        RegionSelection::File(path) => read_region_file(path, genome)?,
        RegionSelection::WholeGenome => whole_genome(genome),
    };

    if sort {
        intervals.sort();
    }
    log::debug!("Built {} regions", intervals.len());
    Ok(intervals)
}

/// Parse one region argument: a range if it contains `:`, else a whole chromosome.
pub fn parse_region_arg(region: &str, genome: &Genome) -> Result<NamedInterval> {
    let interval = if region.contains(':') {
        NamedInterval::parse(region, genome)?
    } else {
        NamedInterval::from_chromosome(genome.chrom_id(region.trim())?, genome)
    };
    Ok(interval.trimmed(genome))
}

/// Read all intervals from a region file (`.gz` allowed), in file order.
pub fn read_region_file<P: AsRef<Path>>(path: P, genome: &Genome) -> Result<Vec<NamedInterval>> {
    let reader = open_possible_gzip(path)?;
    read_regions(reader, genome)
}

/// Read intervals from region-file content.
pub fn read_regions<R: BufRead>(reader: R, genome: &Genome) -> Result<Vec<NamedInterval>> {
    let mut intervals = Vec::new();
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        let interval = NamedInterval::from_region_file_line(&fields, genome)
            .map_err(|e| e.at_line(line_num + 1))?;
        intervals.push(interval.trimmed(genome));
    }
    Ok(intervals)
}

/// Parse region-file content from a string (useful for testing).
pub fn parse_regions(content: &str, genome: &Genome) -> Result<Vec<NamedInterval>> {
    read_regions(content.as_bytes(), genome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::set_zero_based_regions;
    use crate::error::RegionError;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn genome() -> Genome {
        let mut genome = Genome::new();
        genome.push("chr1", 1000);
        genome.push("chr2", 500);
        genome
    }

    #[test]
    fn test_selection_precedence() {
        let regions = Some(vec!["chr1".to_string()]);
        let file = Some(PathBuf::from("regions.bed"));

        assert_eq!(
            RegionSelection::from_args(regions.clone(), file.clone()),
            RegionSelection::Explicit(vec!["chr1".to_string()])
        );
        assert_eq!(
            RegionSelection::from_args(Some(Vec::new()), file.clone()),
            RegionSelection::File(PathBuf::from("regions.bed"))
        );
        assert!(RegionSelection::from_args(None, None).is_whole_genome());
    }

    #[test]
    #[serial]
    fn test_explicit_regions_sorted_and_trimmed() {
        set_zero_based_regions(false);
        let g = genome();
        let selection = RegionSelection::Explicit(vec![
            "chr2:401-900".to_string(),
            "chr1".to_string(),
            "chr1:11-20".to_string(),
        ]);
        let regions = build_regions(&selection, &g, true).unwrap();

        assert_eq!(regions.len(), 3);
        assert_eq!((regions[0].chrom_id, regions[0].start, regions[0].end), (0, 0, 1000));
        assert_eq!((regions[1].chrom_id, regions[1].start, regions[1].end), (0, 10, 20));
        assert_eq!((regions[2].chrom_id, regions[2].start, regions[2].end), (1, 400, 500));
    }

    #[test]
    #[serial]
    fn test_unsorted_keeps_input_order() {
        set_zero_based_regions(false);
        let g = genome();
        let selection =
            RegionSelection::Explicit(vec!["chr2".to_string(), "chr1".to_string()]);
        let regions = build_regions(&selection, &g, false).unwrap();
        assert_eq!(regions[0].chrom_id, 1);
        assert_eq!(regions[1].chrom_id, 0);
    }

    #[test]
    #[serial]
    fn test_explicit_fail_fast() {
        set_zero_based_regions(false);
        let g = genome();
        let selection = RegionSelection::Explicit(vec!["chr1".to_string(), "chr7".to_string()]);
        assert!(matches!(
            build_regions(&selection, &g, true),
            Err(RegionError::UnknownChromosome(_))
        ));
    }

    #[test]
    fn test_whole_genome() {
        let g = genome();
        let regions = build_regions(&RegionSelection::WholeGenome, &g, true).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].end, 500);
        assert_eq!(regions[1].name.as_deref(), Some("chr2"));
    }

    #[test]
    fn test_empty_explicit_list_is_whole_genome() {
        let g = genome();
        let empty = RegionSelection::Explicit(Vec::new());
        assert!(empty.is_whole_genome());
        assert!(!RegionSelection::File(PathBuf::from("regions.bed")).is_whole_genome());
        assert_eq!(
            build_regions(&empty, &g, true).unwrap(),
            build_regions(&RegionSelection::WholeGenome, &g, true).unwrap()
        );
    }

    #[test]
    fn test_region_file() {
        let g = genome();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# header comment").unwrap();
        writeln!(file, "chr2\t10\t600\tgeneB").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "chr1\t50\t60").unwrap();
        writeln!(file, "chr1\t50\t60").unwrap();

        let selection = RegionSelection::File(file.path().to_path_buf());
        let regions = build_regions(&selection, &g, true).unwrap();

        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0], regions[1]);
        assert_eq!(regions[2].end, 500);
        assert_eq!(regions[2].name.as_deref(), Some("geneB"));
    }

    #[test]
    fn test_region_file_error_line() {
        let g = genome();
        let err = parse_regions("chr1\t0\t10\nchr1\tabc\t10\n", &g).unwrap_err();
        assert!(matches!(err, RegionError::ParseLine { line: 2, .. }));
    }
}
