//! Buffered tab-delimited output.
//!
//! Uses itoa for coordinate formatting to avoid allocation per line.

use std::io::{self, BufWriter, Write};

use crate::genome::Genome;
use crate::interval::NamedInterval;
use crate::source::{Feature, TextRecord};

/// Buffer size for RecordWriter (1MB default).
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Writer for regions and fetched records, one per line.
pub struct RecordWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    lines: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            lines: 0,
        }
    }

    #[inline]
    fn write_bed3(&mut self, chrom: &str, start: u64, end: u64) -> io::Result<()> {
        self.writer.write_all(chrom.as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(self.itoa_buf.format(start).as_bytes())?;
        self.writer.write_all(b"\t")?;
        self.writer.write_all(self.itoa_buf.format(end).as_bytes())
    }

    #[inline]
    fn end_line(&mut self) -> io::Result<()> {
        self.lines += 1;
        self.writer.write_all(b"\n")
    }

    /// Write a region as a BED line, with its name when present.
    pub fn write_region(&mut self, region: &NamedInterval, genome: &Genome) -> io::Result<()> {
        self.write_bed3(region.chrom_name(genome), region.start, region.end)?;
        if let Some(ref name) = region.name {
            self.writer.write_all(b"\t")?;
            self.writer.write_all(name.as_bytes())?;
        }
        self.end_line()
    }

    /// Write a text record verbatim.
    pub fn write_text(&mut self, record: &TextRecord) -> io::Result<()> {
        self.writer.write_all(record.line().as_bytes())?;
        self.end_line()
    }

    /// Write a feature as a BED line.
    pub fn write_feature(&mut self, feature: &Feature) -> io::Result<()> {
        self.write_bed3(&feature.chrom, feature.start, feature.end)?;
        if let Some(ref name) = feature.name {
            self.writer.write_all(b"\t")?;
            self.writer.write_all(name.as_bytes())?;
        }
        self.end_line()
    }

    /// Lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flush the buffer and hand back the underlying output.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}
