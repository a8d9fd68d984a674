//! regfetch: region-ordered, duplicate-free record fetching.
//!
//! Builds a sorted region set from region strings, a region file or the whole
//! genome, then streams records from an indexed source one region at a time.
//! Records that an earlier, overlapping region on the same chromosome already
//! returned are suppressed.
//!
//! # Example
//!
//! ```rust
//! use regfetch::fetch::{fetch_iterator, FetchMode, StartAttr};
//! use regfetch::genome::Genome;
//! use regfetch::regions::RegionSelection;
//! use regfetch::source::{Feature, MemorySource};
//!
//! let mut genome = Genome::new();
//! genome.push("chr1", 1000);
//!
//! let source = MemorySource::from_features(vec![
//!     Feature::new("chr1", 10, 20),
//!     Feature::new("chr1", 60, 70),
//! ]);
//! let selection = RegionSelection::Explicit(vec![
//!     "chr1:1-65".to_string(),
//!     "chr1:50-100".to_string(),
//! ]);
//!
//! let records = fetch_iterator(&source, &selection, &genome, FetchMode::Deduplicate, StartAttr)
//!     .unwrap()
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! assert_eq!(records.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod genome;
pub mod interval;
pub mod io;
pub mod logging;
pub mod output;
pub mod process;
pub mod regions;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use error::{RegionError, Result};
pub use fetch::{
    fetch_iterator, fetch_regions, DedupCursor, FetchIter, FetchMode, IndexedSource, StartAttr,
    StartField,
};
pub use genome::Genome;
pub use interval::NamedInterval;
pub use regions::{build_regions, RegionSelection};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
