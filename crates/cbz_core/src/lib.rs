//! Archiver core: configuration, ordering keys, page stages and run statistics.
//!
//! Everything here is IO-free; the engine crate drives these types.
mod config;
mod sequence;
mod state;
mod stats;
mod url_list;

pub use config::{
    ConfigError, RunConfig, DEFAULT_QUALITY, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY,
    DEFAULT_WORKERS,
};
pub use sequence::{pad_width, SequenceNumber, MIN_PAD_WIDTH};
pub use state::Stage;
pub use stats::{FailureReason, PageOutcome, PageReport, PageTally, RunStatistics};
pub use url_list::parse_url_list;
