//! Global configuration for region-string coordinates.
//!
//! Region strings (`chrom:start-end`) are 1-based and inclusive by default,
//! matching samtools/tabix. The flag is set once at startup and read by both
//! the parser and the renderer so the two always agree.

use std::sync::atomic::{AtomicBool, Ordering};

/// When set, region strings are read and written as 0-based half-open.
static ZERO_BASED_REGIONS: AtomicBool = AtomicBool::new(false);

/// Switch region strings to 0-based half-open coordinates.
///
/// # Example
///
/// ```
/// use regfetch::config;
///
/// config::set_zero_based_regions(true);
/// // "chr1:100-200" now means [100, 200)
/// config::set_zero_based_regions(false);
/// ```
#[inline]
pub fn set_zero_based_regions(enabled: bool) {
    ZERO_BASED_REGIONS.store(enabled, Ordering::Release);
}

/// Check whether region strings use 0-based coordinates.
#[inline]
pub fn is_zero_based_regions() -> bool {
    ZERO_BASED_REGIONS.load(Ordering::Acquire)
}

/// Offset subtracted from a region-string start to get the internal 0-based start.
#[inline]
pub fn region_start_offset() -> u64 {
    if is_zero_based_regions() {
        0
    } else {
        1
    }
}
