//! In-memory indexed sources and the two record shapes they serve.
//!
//! [`MemorySource`] keeps records grouped by chromosome and sorted by start,
//! answering overlap queries with a binary search plus a forward scan.
//! [`TextRecord`] is a tab-delimited line (start read from field 2);
//! [`Feature`] is a typed interval record (start read directly).

use std::io::BufRead;
use std::path::Path;

use memchr::memchr_iter;
use rustc_hash::FxHashMap;

use crate::error::{RegionError, Result};
use crate::fetch::{Fields, HasStart, IndexedSource};
use crate::io::open_possible_gzip;

/// A tab-delimited text line with pre-computed field boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    line: String,
    /// `(start, end)` byte offsets of each field
    bounds: Vec<(usize, usize)>,
}

impl TextRecord {
    pub fn new(line: impl Into<String>) -> Self {
        let line = line.into();
        let bytes = line.as_bytes();
        let mut bounds = Vec::with_capacity(8);
        let mut field_start = 0;
        for tab in memchr_iter(b'\t', bytes) {
            bounds.push((field_start, tab));
            field_start = tab + 1;
        }
        bounds.push((field_start, bytes.len()));
        Self { line, bounds }
    }

    /// The original line.
    #[inline]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.bounds.iter().map(|&(s, e)| &self.line[s..e])
    }
}

impl Fields for TextRecord {
    #[inline]
    fn field(&self, index: usize) -> Option<&str> {
        self.bounds.get(index).map(|&(s, e)| &self.line[s..e])
    }
}

/// A typed genomic feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: Option<String>,
}

impl Feature {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            name: None,
        }
    }

    /// Build from BED-like fields `[chrom, start, end, name?, ...]`.
    pub fn from_fields<F: Fields>(record: &F) -> Result<Self> {
        let (chrom, start, end) = bed3_fields(record)?;
        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
            name: record
                .field(3)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
    }
}

impl HasStart for Feature {
    #[inline]
    fn start(&self) -> u64 {
        self.start
    }
}

/// Parse `(chrom, start, end)` from the first three fields.
fn bed3_fields<F: Fields>(record: &F) -> Result<(&str, u64, u64)> {
    let chrom = record
        .field(0)
        .ok_or_else(|| RegionError::Parse("Missing chromosome field".to_string()))?;
    let parse = |idx: usize, what: &str| -> Result<u64> {
        let value = record
            .field(idx)
            .ok_or_else(|| RegionError::Parse(format!("Missing {} field", what)))?;
        value
            .trim()
            .parse()
            .map_err(|_| RegionError::Parse(format!("Invalid {} position: '{}'", what, value)))
    };
    let start = parse(1, "start")?;
    let end = parse(2, "end")?;
    if start > end {
        return Err(RegionError::Parse(format!("Start ({}) > end ({})", start, end)));
    }
    Ok((chrom, start, end))
}

#[derive(Debug, Clone)]
struct Entry<R> {
    start: u64,
    /// End used for overlap tests; zero-length records count as 1bp
    end: u64,
    record: R,
}

#[derive(Debug, Clone, Default)]
struct ChromIndex {
    /// Entry indices sorted by (start, end)
    order: Vec<usize>,
    /// Longest entry on this chromosome
    max_len: u64,
}

/// An in-memory indexed collection of records.
///
/// Range queries return records overlapping `[start, end)` ordered by start;
/// `fetch_all` returns records in insertion order.
#[derive(Debug, Clone)]
pub struct MemorySource<R> {
    entries: Vec<Entry<R>>,
    by_chrom: FxHashMap<String, ChromIndex>,
}

impl<R> MemorySource<R> {
    /// Build an index from `(chrom, start, end, record)` tuples.
    pub fn from_records<I, C>(records: I) -> Self
    where
        I: IntoIterator<Item = (C, u64, u64, R)>,
        C: Into<String>,
    {
        let mut entries = Vec::new();
        let mut by_chrom: FxHashMap<String, ChromIndex> = FxHashMap::default();

        for (chrom, start, end, record) in records {
            let end = end.max(start.saturating_add(1));
            let index = by_chrom.entry(chrom.into()).or_default();
            index.order.push(entries.len());
            index.max_len = index.max_len.max(end - start);
            entries.push(Entry { start, end, record });
        }

        // Stable sort keeps insertion order for ties
        for index in by_chrom.values_mut() {
            index
                .order
                .sort_by_key(|&i| (entries[i].start, entries[i].end));
        }

        Self { entries, by_chrom }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chromosomes with at least one record.
    pub fn chromosomes(&self) -> impl Iterator<Item = &String> {
        self.by_chrom.keys()
    }
}

impl MemorySource<Feature> {
    /// Index typed features.
    pub fn from_features(features: Vec<Feature>) -> Self {
        Self::from_records(
            features
                .into_iter()
                .map(|f| (f.chrom.clone(), f.start, f.end, f)),
        )
    }
}

impl MemorySource<TextRecord> {
    /// Load a tab-delimited file (`.gz` allowed) with chrom/start/end in the first three columns.
    pub fn from_text_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = open_possible_gzip(path)?;
        Self::from_text_reader(reader)
    }

    /// Load tab-delimited text; `#` lines and blank lines are skipped.
    pub fn from_text_reader<B: BufRead>(reader: B) -> Result<Self> {
        let mut records = Vec::new();
        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let record = TextRecord::new(line);
            let (chrom, start, end) =
                bed3_fields(&record).map_err(|e| e.at_line(line_num + 1))?;
            let chrom = chrom.to_string();
            records.push((chrom, start, end, record));
        }
        let source = Self::from_records(records);
        log::debug!("Indexed {} text records", source.len());
        Ok(source)
    }
}

/// Iterator over the records of one range query.
pub struct MemoryRecords<'a, R> {
    entries: &'a [Entry<R>],
    ids: std::slice::Iter<'a, usize>,
    start: u64,
    end: u64,
}

impl<R: Clone> Iterator for MemoryRecords<'_, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&i) = self.ids.next() {
            let entry = &self.entries[i];
            if entry.start >= self.end {
                self.ids = Default::default();
                return None;
            }
            if entry.end > self.start {
                return Some(Ok(entry.record.clone()));
            }
        }
        None
    }
}

/// Iterator over every record in insertion order.
pub struct MemoryAll<'a, R> {
    inner: std::slice::Iter<'a, Entry<R>>,
}

impl<R: Clone> Iterator for MemoryAll<'_, R> {
    type Item = Result<R>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| Ok(e.record.clone()))
    }
}

impl<R: Clone> IndexedSource for MemorySource<R> {
    type Record = R;
    type Records<'a>
        = MemoryRecords<'a, R>
    where
        Self: 'a;
    type AllRecords<'a>
        = MemoryAll<'a, R>
    where
        Self: 'a;

    fn fetch<'a>(&'a self, chrom: &str, start: u64, end: u64) -> Result<Self::Records<'a>> {
        let ids: &[usize] = match self.by_chrom.get(chrom) {
            Some(index) => {
                // Entries starting max_len or more before `start` cannot overlap
                let first = index
                    .order
                    .partition_point(|&i| self.entries[i].start.saturating_add(index.max_len) <= start);
                &index.order[first..]
            }
            None => &[],
        };
        Ok(MemoryRecords {
            entries: &self.entries,
            ids: ids.iter(),
            start,
            end,
        })
    }

    fn fetch_all<'a>(&'a self) -> Result<Self::AllRecords<'a>> {
        Ok(MemoryAll {
            inner: self.entries.iter(),
        })
    }
}
