//! Error types shared by region building, fetching and the I/O helpers.

use std::io;
use thiserror::Error;

/// Errors that can occur while building regions or fetching records.
#[derive(Error, Debug)]
pub enum RegionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Parse error at line {line}: {message}")]
    ParseLine { line: usize, message: String },

    #[error("Unknown chromosome '{0}'")]
    UnknownChromosome(String),

    #[error("Fetch failed for {region}: {message}")]
    Fetch { region: String, message: String },

    #[error("Process error: {0}")]
    Process(String),
}

impl RegionError {
    /// Attach a region-file line number to a parse failure.
    ///
    /// Unknown chromosomes keep their own variant so callers can still match on them.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            RegionError::Parse(message) => RegionError::ParseLine { line, message },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_wraps_parse_errors() {
        let err = RegionError::Parse("bad start".to_string()).at_line(7);
        assert_eq!(err.to_string(), "Parse error at line 7: bad start");
    }

    #[test]
    fn test_at_line_keeps_unknown_chromosome() {
        let err = RegionError::UnknownChromosome("chrZ".to_string()).at_line(3);
        assert!(matches!(err, RegionError::UnknownChromosome(ref c) if c == "chrZ"));
    }
}
