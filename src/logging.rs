//! Logger setup for the command-line tool.

use log::LevelFilter;

/// Map `-v`/`-q` counts to a level: warn < info (default) < debug < trace.
pub fn level_from_verbosity(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialise a timestamped logger on stderr. `RUST_LOG`, when set, overrides `level`.
///
/// Calling this more than once is harmless.
pub fn init_logging(level: LevelFilter) {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A logger may already be installed (tests, embedding applications)
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from_verbosity(0, false), LevelFilter::Info);
        assert_eq!(level_from_verbosity(1, false), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(3, false), LevelFilter::Trace);
        assert_eq!(level_from_verbosity(2, true), LevelFilter::Warn);
    }

    #[test]
    fn test_init_twice() {
        init_logging(LevelFilter::Info);
        init_logging(LevelFilter::Debug);
        log::debug!("logger initialised");
    }
}
