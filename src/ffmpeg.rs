//! FFmpeg log level control.
//!
//! FFmpeg prints its own diagnostics to stderr, separately from the Rust
//! [`log`](https://crates.io/crates/log) facade used by this crate. A contact
//! sheet run seeks many times and FFmpeg tends to complain loudly about
//! partial GOPs after each seek, so the binary keeps FFmpeg one step quieter
//! than the Rust side.
//!
//! # Example
//!
//! ```no_run
//! vidsheet::sync_ffmpeg_log_level(log::LevelFilter::Warn);
//! ```

use ffmpeg_next::util::log::Level;
use log::LevelFilter;

/// Map a Rust log level to the FFmpeg level that should accompany it.
///
/// Anything below `Debug` keeps FFmpeg at `Error` or quieter; FFmpeg's
/// own warnings only show up once the user asked for debug output.
pub fn ffmpeg_level_for(filter: LevelFilter) -> Level {
    match filter {
        LevelFilter::Off => Level::Quiet,
        LevelFilter::Error => Level::Fatal,
        LevelFilter::Warn | LevelFilter::Info => Level::Error,
        LevelFilter::Debug => Level::Warning,
        LevelFilter::Trace => Level::Debug,
    }
}

/// Set FFmpeg's internal verbosity to match the given Rust log level.
pub fn sync_ffmpeg_log_level(filter: LevelFilter) {
    let level = ffmpeg_level_for(filter);
    log::trace!("Setting FFmpeg log level to {level:?}");
    ffmpeg_next::util::log::set_level(level);
}
