//! Genome reference: chromosome names, ids and lengths.
//!
//! Parses `.genome` / `.fai` style files (tab-delimited: chrom\tlength[\t...]).
//! Chromosome ids are assigned in file order and are stable for the run.

use std::io::BufRead;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{RegionError, Result};
use crate::io::open_possible_gzip;

/// Ordered collection of chromosomes.
#[derive(Debug, Clone, Default)]
pub struct Genome {
    /// Chromosome name to id
    ids: FxHashMap<String, u32>,
    /// Names indexed by id
    names: Vec<String>,
    /// Lengths indexed by id
    lengths: Vec<u64>,
}

impl Genome {
    /// Create an empty genome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a genome from a file (`-` reads stdin, `.gz` is decompressed).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = open_possible_gzip(path)?;
        Self::from_reader(reader)
    }

    /// Load a genome from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut genome = Self::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split('\t');
            let (Some(chrom), Some(size)) = (fields.next(), fields.next()) else {
                return Err(RegionError::ParseLine {
                    line: line_num + 1,
                    message: "Genome file requires two columns: chrom and length".to_string(),
                });
            };

            let size: u64 = size.parse().map_err(|_| RegionError::ParseLine {
                line: line_num + 1,
                message: format!("Invalid chromosome length: {}", size),
            })?;

            if genome.has_chrom(chrom) {
                return Err(RegionError::ParseLine {
                    line: line_num + 1,
                    message: format!("Duplicate chromosome '{}'", chrom),
                });
            }
            genome.push(chrom, size);
        }

        log::debug!("Loaded genome with {} chromosomes", genome.len());
        Ok(genome)
    }

    /// Append a chromosome and return its id. Re-adding a name updates its length.
    pub fn push(&mut self, chrom: impl Into<String>, length: u64) -> u32 {
        let chrom = chrom.into();
        if let Some(&id) = self.ids.get(&chrom) {
            self.lengths[id as usize] = length;
            return id;
        }
        let id = self.names.len() as u32;
        self.ids.insert(chrom.clone(), id);
        self.names.push(chrom);
        self.lengths.push(length);
        id
    }

    /// Look up a chromosome id by name.
    #[inline]
    pub fn chrom_id(&self, chrom: &str) -> Result<u32> {
        self.ids
            .get(chrom)
            .copied()
            .ok_or_else(|| RegionError::UnknownChromosome(chrom.to_string()))
    }

    /// Length of a chromosome. Panics on an id not produced by this genome.
    #[inline]
    pub fn chrom_len(&self, chrom_id: u32) -> u64 {
        self.lengths[chrom_id as usize]
    }

    /// Name of a chromosome. Panics on an id not produced by this genome.
    #[inline]
    pub fn chrom_name(&self, chrom_id: u32) -> &str {
        &self.names[chrom_id as usize]
    }

    /// Name of a chromosome, `None` for an unknown id.
    #[inline]
    pub fn get_chrom_name(&self, chrom_id: u32) -> Option<&str> {
        self.names.get(chrom_id as usize).map(String::as_str)
    }

    /// Check if a chromosome exists.
    #[inline]
    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.ids.contains_key(chrom)
    }

    /// Chromosome lengths in id order.
    pub fn chrom_lengths(&self) -> &[u64] {
        &self.lengths
    }

    /// Iterate `(id, name, length)` in id order.
    pub fn chromosomes(&self) -> impl Iterator<Item = (u32, &str, u64)> {
        self.names
            .iter()
            .zip(self.lengths.iter())
            .enumerate()
            .map(|(id, (name, &len))| (id as u32, name.as_str(), len))
    }

    /// Get number of chromosomes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_genome_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chr1\t1000000").unwrap();
        writeln!(file, "chr2\t500000").unwrap();
        writeln!(file, "# comment line").unwrap();
        writeln!(file, "chr3\t250000\t112\t60\t61").unwrap();

        let genome = Genome::from_file(file.path()).unwrap();

        assert_eq!(genome.len(), 3);
        assert_eq!(genome.chrom_id("chr2").unwrap(), 1);
        assert_eq!(genome.chrom_len(0), 1000000);
        assert_eq!(genome.chrom_len(2), 250000);
        assert_eq!(genome.chrom_name(2), "chr3");
        assert_eq!(genome.get_chrom_name(2), Some("chr3"));
        assert_eq!(genome.get_chrom_name(3), None);
        assert!(matches!(
            genome.chrom_id("chr4"),
            Err(RegionError::UnknownChromosome(_))
        ));
    }

    #[test]
    fn test_genome_order_preserved() {
        let genome = Genome::from_reader("chrX\t10\nchr1\t20\n".as_bytes()).unwrap();
        let names: Vec<_> = genome.chromosomes().map(|(_, name, _)| name).collect();
        assert_eq!(names, vec!["chrX", "chr1"]);
        assert_eq!(genome.chrom_lengths(), &[10, 20]);
    }

    #[test]
    fn test_genome_rejects_bad_lines() {
        assert!(Genome::from_reader("chr1\n".as_bytes()).is_err());
        assert!(Genome::from_reader("chr1\tabc\n".as_bytes()).is_err());
        assert!(Genome::from_reader("chr1\t10\nchr1\t20\n".as_bytes()).is_err());
    }

    #[test]
    fn test_push_existing_updates_length() {
        let mut genome = Genome::new();
        assert_eq!(genome.push("chr1", 100), 0);
        assert_eq!(genome.push("chr2", 50), 1);
        assert_eq!(genome.push("chr1", 200), 0);
        assert_eq!(genome.chrom_len(0), 200);
        assert!(genome.has_chrom("chr2"));
        assert!(!genome.has_chrom("chr3"));
    }
}
