//! Region-ordered, duplicate-free fetching from an indexed source.
//!
//! Regions are fetched one at a time, in order, and each region's records are
//! drained before the next range query is issued. When regions on the same
//! chromosome overlap, a record may be returned by more than one query; the
//! [`DedupCursor`] keeps the highest start seen on the current chromosome and
//! suppresses anything at or before it.
//!
//! Preconditions:
//! - regions are sorted by `(chrom_id, start, end)` (see [`crate::regions`]);
//! - each range query returns records with non-decreasing starts.
//!
//! Violating either never panics; the output is then only partially ordered
//! and suppression may be imprecise.

use std::fmt;

use crate::error::{RegionError, Result};
use crate::genome::Genome;
use crate::interval::NamedInterval;
use crate::regions::{build_regions, RegionSelection};

/// A data provider supporting range queries by chromosome and span.
pub trait IndexedSource {
    type Record;

    /// Records returned by one range query.
    type Records<'a>: Iterator<Item = Result<Self::Record>>
    where
        Self: 'a;

    /// Records returned by an unrestricted query.
    type AllRecords<'a>: Iterator<Item = Result<Self::Record>>
    where
        Self: 'a;

    /// Records overlapping `[start, end)` on `chrom`.
    fn fetch<'a>(&'a self, chrom: &str, start: u64, end: u64) -> Result<Self::Records<'a>>;

    /// Every record in the source.
    fn fetch_all<'a>(&'a self) -> Result<Self::AllRecords<'a>>;
}

/// Typed records exposing their 0-based start directly.
pub trait HasStart {
    fn start(&self) -> u64;
}

/// Text-derived records exposing an ordered sequence of fields.
pub trait Fields {
    fn field(&self, index: usize) -> Option<&str>;
}

impl Fields for Vec<String> {
    fn field(&self, index: usize) -> Option<&str> {
        self.get(index).map(String::as_str)
    }
}

impl Fields for Vec<&str> {
    fn field(&self, index: usize) -> Option<&str> {
        self.get(index).copied()
    }
}

/// How the start coordinate is read from a record. Chosen once per iterator.
pub trait StartKey<R> {
    fn start_of(&self, record: &R) -> Result<u64>;
}

/// Read the start from [`HasStart::start`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StartAttr;

impl<R: HasStart> StartKey<R> for StartAttr {
    #[inline]
    fn start_of(&self, record: &R) -> Result<u64> {
        Ok(record.start())
    }
}

/// Read the start from the second field of a [`Fields`] record.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartField;

impl<R: Fields> StartKey<R> for StartField {
    #[inline]
    fn start_of(&self, record: &R) -> Result<u64> {
        let field = record
            .field(1)
            .ok_or_else(|| RegionError::Parse("Record has no start field".to_string()))?;
        field
            .trim()
            .parse()
            .map_err(|_| RegionError::Parse(format!("Invalid record start: '{}'", field)))
    }
}

/// Whether overlapping regions are deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Suppress records already returned by an earlier region on the same chromosome.
    #[default]
    Deduplicate,
    /// Plain concatenation of every region's records.
    Concatenate,
}

/// Per-iteration high-water mark used to suppress re-fetched records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupCursor {
    prev_chrom_id: Option<u32>,
    prev_start: Option<u64>,
}

impl DedupCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a region on `chrom_id`. Returns true if it continues the previous
    /// chromosome run; otherwise the high-water mark is cleared.
    #[inline]
    pub fn enter(&mut self, chrom_id: u32) -> bool {
        let same_chrom = self.prev_chrom_id == Some(chrom_id);
        if !same_chrom {
            self.prev_start = None;
        }
        same_chrom
    }

    /// A record starting at `start` was already seen on this chromosome.
    #[inline]
    pub fn is_duplicate(&self, start: u64) -> bool {
        matches!(self.prev_start, Some(prev) if start <= prev)
    }

    /// Close a region. `last_start` is the start of the last record the query
    /// returned, whether or not it was yielded.
    #[inline]
    pub fn finish(&mut self, chrom_id: u32, last_start: Option<u64>) {
        if let Some(start) = last_start {
            self.prev_start = Some(self.prev_start.map_or(start, |prev| prev.max(start)));
        }
        self.prev_chrom_id = Some(chrom_id);
    }

    pub fn prev_chrom_id(&self) -> Option<u32> {
        self.prev_chrom_id
    }

    pub fn prev_start(&self) -> Option<u64> {
        self.prev_start
    }
}

/// Counters collected while iterating regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Range queries issued
    pub regions_fetched: usize,
    /// Zero-length regions skipped without a query
    pub empty_regions: usize,
    /// Records returned to the caller
    pub records_yielded: usize,
    /// Records dropped as duplicates
    pub records_suppressed: usize,
}

impl fmt::Display for FetchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "regions={} empty={} yielded={} suppressed={}",
            self.regions_fetched, self.empty_regions, self.records_yielded, self.records_suppressed
        )
    }
}

/// Chromosome name of a region, or a fetch error for an id the genome does not know.
fn region_chrom<'g>(genome: &'g Genome, region: &NamedInterval) -> Result<&'g str> {
    genome
        .get_chrom_name(region.chrom_id)
        .ok_or_else(|| RegionError::Fetch {
            region: format!("chrom #{}:{}-{}", region.chrom_id, region.start, region.end),
            message: format!("chromosome id out of range ({} known)", genome.len()),
        })
}

struct ActiveRegion<'a, S: IndexedSource + 'a> {
    chrom_id: u32,
    records: S::Records<'a>,
    last_start: Option<u64>,
}

/// Lazy iterator over the records of sorted regions with overlap duplicates removed.
///
/// Zero-length regions are skipped without a query and leave the cursor untouched.
/// Iteration stops after the first error.
pub struct DedupFetch<'a, S: IndexedSource + 'a, K> {
    source: &'a S,
    genome: &'a Genome,
    key: K,
    regions: std::vec::IntoIter<NamedInterval>,
    current: Option<ActiveRegion<'a, S>>,
    cursor: DedupCursor,
    stats: FetchStats,
    finished: bool,
}

impl<'a, S: IndexedSource + 'a, K: StartKey<S::Record>> DedupFetch<'a, S, K> {
    pub fn new(source: &'a S, regions: Vec<NamedInterval>, genome: &'a Genome, key: K) -> Self {
        Self {
            source,
            genome,
            key,
            regions: regions.into_iter(),
            current: None,
            cursor: DedupCursor::new(),
            stats: FetchStats::default(),
            finished: false,
        }
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    pub fn cursor(&self) -> DedupCursor {
        self.cursor
    }

    fn fail(&mut self, err: RegionError) -> Option<Result<S::Record>> {
        self.finished = true;
        self.current = None;
        Some(Err(err))
    }
}

impl<'a, S: IndexedSource + 'a, K: StartKey<S::Record>> Iterator for DedupFetch<'a, S, K> {
    type Item = Result<S::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(active) = self.current.as_mut() {
                match active.records.next() {
                    Some(Ok(record)) => {
                        let start = match self.key.start_of(&record) {
                            Ok(start) => start,
                            Err(e) => return self.fail(e),
                        };
                        active.last_start = Some(start);
                        if self.cursor.is_duplicate(start) {
                            self.stats.records_suppressed += 1;
                            continue;
                        }
                        self.stats.records_yielded += 1;
                        return Some(Ok(record));
                    }
                    Some(Err(e)) => return self.fail(e),
                    None => {
                        let (chrom_id, last_start) = (active.chrom_id, active.last_start);
                        self.cursor.finish(chrom_id, last_start);
                        self.current = None;
                    }
                }
            }

            let Some(region) = self.regions.next() else {
                self.finished = true;
                log::debug!("Deduplicating fetch finished: {}", self.stats);
                return None;
            };
            if region.is_empty() {
                self.stats.empty_regions += 1;
                continue;
            }

            let chrom = match region_chrom(self.genome, &region) {
                Ok(chrom) => chrom,
                Err(e) => return self.fail(e),
            };
            self.cursor.enter(region.chrom_id);
            match self.source.fetch(chrom, region.start, region.end) {
                Ok(records) => {
                    self.stats.regions_fetched += 1;
                    self.current = Some(ActiveRegion {
                        chrom_id: region.chrom_id,
                        records,
                        last_start: None,
                    });
                }
                Err(e) => return self.fail(e),
            }
        }
    }
}

/// Lazy concatenation of every region's records, without suppression.
///
/// Zero-length regions are skipped. Iteration stops after the first error.
pub struct ConcatFetch<'a, S: IndexedSource + 'a> {
    source: &'a S,
    genome: &'a Genome,
    regions: std::vec::IntoIter<NamedInterval>,
    current: Option<S::Records<'a>>,
    stats: FetchStats,
    finished: bool,
}

impl<'a, S: IndexedSource + 'a> ConcatFetch<'a, S> {
    pub fn new(source: &'a S, regions: Vec<NamedInterval>, genome: &'a Genome) -> Self {
        Self {
            source,
            genome,
            regions: regions.into_iter(),
            current: None,
            stats: FetchStats::default(),
            finished: false,
        }
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }
}

impl<'a, S: IndexedSource + 'a> Iterator for ConcatFetch<'a, S> {
    type Item = Result<S::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            if let Some(records) = self.current.as_mut() {
                match records.next() {
                    Some(Ok(record)) => {
                        self.stats.records_yielded += 1;
                        return Some(Ok(record));
                    }
                    Some(Err(e)) => {
                        self.finished = true;
                        self.current = None;
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }

            let Some(region) = self.regions.next() else {
                self.finished = true;
                log::debug!("Concatenating fetch finished: {}", self.stats);
                return None;
            };
            if region.is_empty() {
                self.stats.empty_regions += 1;
                continue;
            }

            let chrom = match region_chrom(self.genome, &region) {
                Ok(chrom) => chrom,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };
            match self.source.fetch(chrom, region.start, region.end) {
                Ok(records) => {
                    self.stats.regions_fetched += 1;
                    self.current = Some(records);
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Record stream returned by [`fetch_iterator`] and [`fetch_regions`].
pub enum FetchIter<'a, S: IndexedSource + 'a, K> {
    /// Unrestricted query, no region machinery.
    All(S::AllRecords<'a>),
    Concat(ConcatFetch<'a, S>),
    Dedup(DedupFetch<'a, S, K>),
}

impl<'a, S: IndexedSource + 'a, K: StartKey<S::Record>> FetchIter<'a, S, K> {
    fn over_regions(
        source: &'a S,
        regions: Vec<NamedInterval>,
        genome: &'a Genome,
        mode: FetchMode,
        key: K,
    ) -> Self {
        match mode {
            FetchMode::Deduplicate => FetchIter::Dedup(DedupFetch::new(source, regions, genome, key)),
            FetchMode::Concatenate => FetchIter::Concat(ConcatFetch::new(source, regions, genome)),
        }
    }

    /// Counters for region-based iteration; `None` for an unrestricted fetch.
    pub fn stats(&self) -> Option<FetchStats> {
        match self {
            FetchIter::All(_) => None,
            FetchIter::Concat(iter) => Some(iter.stats()),
            FetchIter::Dedup(iter) => Some(iter.stats()),
        }
    }
}

impl<'a, S: IndexedSource + 'a, K: StartKey<S::Record>> Iterator for FetchIter<'a, S, K> {
    type Item = Result<S::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            FetchIter::All(iter) => iter.next(),
            FetchIter::Concat(iter) => iter.next(),
            FetchIter::Dedup(iter) => iter.next(),
        }
    }
}

/// Fetch records for an already sorted region list.
///
/// An empty list means "fetch everything" and is answered by a single
/// unrestricted query.
pub fn fetch_regions<'a, S, K>(
    source: &'a S,
    regions: Vec<NamedInterval>,
    genome: &'a Genome,
    mode: FetchMode,
    key: K,
) -> Result<FetchIter<'a, S, K>>
where
    S: IndexedSource + 'a,
    K: StartKey<S::Record>,
{
    if regions.is_empty() {
        return Ok(FetchIter::All(source.fetch_all()?));
    }
    Ok(FetchIter::over_regions(source, regions, genome, mode, key))
}

/// Fetch records for a region selection.
///
/// With no selection the whole source is returned as-is. Otherwise the
/// region set is built and sorted first; a build failure is returned before
/// any query is issued.
pub fn fetch_iterator<'a, S, K>(
    source: &'a S,
    selection: &RegionSelection,
    genome: &'a Genome,
    mode: FetchMode,
    key: K,
) -> Result<FetchIter<'a, S, K>>
where
    S: IndexedSource + 'a,
    K: StartKey<S::Record>,
{
    if selection.is_whole_genome() {
        return Ok(FetchIter::All(source.fetch_all()?));
    }
    let regions = build_regions(selection, genome, true)?;
    log::debug!("Fetching {} regions ({:?})", regions.len(), mode);
    Ok(FetchIter::over_regions(source, regions, genome, mode, key))
}
