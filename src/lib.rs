//! Empirical distributions of structural hash features.
//!
//! A run draws N random B-bit values, extracts an evenness ratio, a passage
//! count and a crown signature from each, tallies them into histograms and
//! renders the histograms as percentage tables.

pub mod config;
pub mod driver;
pub mod error;
pub mod features;
pub mod histogram;
pub mod progress;
pub mod report;
pub mod source;

mod rng;
mod sfmt;
mod state;

pub use config::{BitWidth, ProgressMode, RngMode, RunConfig};
pub use error::{Error, Result};
pub use features::{BitAnalyzer, FeatureAnalyzer};
pub use histogram::{CrownKey, Histogram, Tally};
pub use progress::{ProgressOptions, ProgressReporter, StatusLine, SystemClock, TerminalLine};
pub use report::Report;
pub use rng::FastRng;
pub use source::{BitSource, HexSource, Sample};
