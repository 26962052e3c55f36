//! Command-line argument parsing for traits-distribution

use clap::Parser;
use hashtraits::config::{
    parse_decimals_or, parse_nonzero_or, parse_seed, DEFAULT_EVEN_DEC, DEFAULT_PCT_DEC,
    DEFAULT_PROGRESS_INTERVAL_MS, DEFAULT_SAMPLES,
};
use hashtraits::{BitWidth, ProgressMode, RngMode, RunConfig};
use std::time::Duration;

/// Sample random hashes and print the distribution of their evenness,
/// passages and crown features.
///
/// Numeric values are taken leniently: anything malformed falls back to the
/// default instead of aborting the run. A flag given without a value keeps its
/// default, and unrecognized arguments are ignored.
#[derive(Parser, Debug)]
#[command(name = "traits-distribution")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Hash width, 160 or 256 (anything else means 256)
    #[arg(
        long,
        allow_hyphen_values = true,
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "BITS",
        default_value = "256"
    )]
    pub bits: String,

    /// Number of hashes to sample
    #[arg(
        long = "N",
        allow_hyphen_values = true,
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "COUNT",
        default_value_t = DEFAULT_SAMPLES.to_string()
    )]
    pub samples: String,

    /// Decimal places of the evenness buckets
    #[arg(
        long = "evenDec",
        allow_hyphen_values = true,
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "DIGITS",
        default_value_t = DEFAULT_EVEN_DEC.to_string()
    )]
    pub even_dec: String,

    /// Decimal places of the percentages
    #[arg(
        long = "pctDec",
        allow_hyphen_values = true,
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "DIGITS",
        default_value_t = DEFAULT_PCT_DEC.to_string()
    )]
    pub pct_dec: String,

    /// Randomness source: `crypto`, or `js` for the fast non-cryptographic generator
    #[arg(long, num_args = 0..=1, default_missing_value = "", value_name = "MODE", default_value = "crypto")]
    pub rng: String,

    /// Progress display: `auto` (only on a terminal) or `off`
    #[arg(long, num_args = 0..=1, default_missing_value = "", value_name = "MODE", default_value = "auto")]
    pub progress: String,

    /// Minimum milliseconds between progress redraws
    #[arg(
        long = "progressInterval",
        allow_hyphen_values = true,
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "MS",
        default_value_t = DEFAULT_PROGRESS_INTERVAL_MS.to_string()
    )]
    pub progress_interval: String,

    /// Seed for the fast generator, for reproducible `--rng js` runs
    #[arg(
        long,
        allow_hyphen_values = true,
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "SEED"
    )]
    pub seed: Option<String>,

    /// Enable verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Unrecognized arguments, ignored
    #[arg(hide = true, num_args = 0.., allow_hyphen_values = true)]
    pub ignored: Vec<String>,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        use tracing_subscriber::{fmt, EnvFilter};

        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Normalizes the raw flag values into a run configuration.
    pub fn to_config(&self) -> RunConfig {
        if !self.ignored.is_empty() {
            tracing::warn!(args = ?self.ignored, "ignoring unrecognized arguments");
        }

        let samples = parse_nonzero_or("--N", Some(&self.samples), DEFAULT_SAMPLES);
        let interval = parse_nonzero_or(
            "--progressInterval",
            Some(&self.progress_interval),
            DEFAULT_PROGRESS_INTERVAL_MS,
        );

        RunConfig {
            bits: BitWidth::from_arg(&self.bits),
            samples,
            even_dec: parse_decimals_or("--evenDec", Some(&self.even_dec), DEFAULT_EVEN_DEC),
            pct_dec: parse_decimals_or("--pctDec", Some(&self.pct_dec), DEFAULT_PCT_DEC),
            rng: RngMode::from_arg(&self.rng),
            progress: ProgressMode::from_arg(&self.progress),
            progress_interval: Duration::from_millis(interval),
            seed: parse_seed(self.seed.as_deref()),
        }
    }
}
