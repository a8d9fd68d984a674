//! File helpers: transparent gzip, stdin/stdout via `-`, and directory setup.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Read buffer size for input files.
const READ_BUFFER_SIZE: usize = 256 * 1024;

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz" || ext == "bgz")
}

/// Open a file for reading, decompressing `.gz` (including bgzip) and mapping `-` to stdin.
pub fn open_possible_gzip<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    if is_stdio(path) {
        return Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, io::stdin())));
    }

    let file = File::open(path)?;
    if is_gzipped(path) {
        // bgzip files are a series of gzip members
        Ok(Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            MultiGzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

/// Output opened by [`create_possible_gzip`].
///
/// Call [`OutputFile::finish`] when done: it writes the gzip trailer and
/// reports errors that dropping the writer would swallow.
pub enum OutputFile {
    Stdout(BufWriter<io::Stdout>),
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputFile {
    /// Flush everything, completing the gzip stream if there is one.
    pub fn finish(self) -> io::Result<()> {
        match self {
            OutputFile::Stdout(mut out) => out.flush(),
            OutputFile::Plain(mut out) => out.flush(),
            OutputFile::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputFile::Stdout(out) => out.write(buf),
            OutputFile::Plain(out) => out.write(buf),
            OutputFile::Gzip(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputFile::Stdout(out) => out.flush(),
            OutputFile::Plain(out) => out.flush(),
            OutputFile::Gzip(out) => out.flush(),
        }
    }
}

/// Create a file for writing, compressing `.gz` and mapping `-` to stdout.
pub fn create_possible_gzip<P: AsRef<Path>>(path: P) -> io::Result<OutputFile> {
    let path = path.as_ref();
    if is_stdio(path) {
        return Ok(OutputFile::Stdout(BufWriter::new(io::stdout())));
    }

    let file = File::create(path)?;
    if is_gzipped(path) {
        Ok(OutputFile::Gzip(GzEncoder::new(
            BufWriter::new(file),
            Compression::default(),
        )))
    } else {
        Ok(OutputFile::Plain(BufWriter::new(file)))
    }
}

/// Returns true if `path` can be written: an existing writable file, or a
/// missing file inside a writable directory.
pub fn check_writable<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if path.exists() {
        return match fs::metadata(path) {
            Ok(meta) => meta.is_file() && !meta.permissions().readonly(),
            Err(_) => false,
        };
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match fs::metadata(parent) {
        Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
        Err(_) => false,
    }
}

/// Create a directory, ignoring an existing one.
pub fn mkdir<P: AsRef<Path>>(path: P) -> io::Result<()> {
    match fs::create_dir(path) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        other => other,
    }
}

/// Create a directory, first removing it and its contents when `rewrite` is set.
pub fn mkdir_clear<P: AsRef<Path>>(path: P, rewrite: bool) -> io::Result<()> {
    let path = path.as_ref();
    if rewrite && path.exists() {
        log::info!("Cleaning directory \"{}\"", path.display());
        fs::remove_dir_all(path)?;
    }
    mkdir(path)
}
