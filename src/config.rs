//! Run configuration and the lenient normalization of raw flag values.
//!
//! Nothing here fails: malformed values fall back to their defaults, an
//! unknown bit width becomes 256, and unknown mode tokens select the default
//! mode.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SAMPLES: u64 = 8192;
pub const DEFAULT_EVEN_DEC: usize = 2;
pub const DEFAULT_PCT_DEC: usize = 2;
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 200;

/// Largest accepted `--evenDec`/`--pctDec`. Formatting precision beyond this
/// is clamped.
pub const MAX_DECIMALS: usize = 100;

/// Width of a sampled hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitWidth {
    B160,
    #[default]
    B256,
}

impl BitWidth {
    /// Anything that is not exactly 160 normalizes to 256.
    pub fn from_arg(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return BitWidth::default();
        }

        match raw.trim().parse::<i64>() {
            Ok(160) => BitWidth::B160,
            Ok(256) => BitWidth::B256,
            _ => {
                tracing::warn!(value = raw, "unsupported bit width, using 256");
                BitWidth::B256
            }
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            BitWidth::B160 => 160,
            BitWidth::B256 => 256,
        }
    }

    #[inline]
    pub const fn bytes(self) -> usize {
        self.bits().div_ceil(8) as usize
    }

    #[inline]
    pub const fn hex_digits(self) -> usize {
        (self.bits() / 4) as usize
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Where sample bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RngMode {
    /// OS-backed cryptographically secure generator.
    #[default]
    Crypto,
    /// SFMT, drawn hex digit by hex digit. Selected with the `js` token.
    Fast,
}

impl RngMode {
    pub const FAST_TOKEN: &'static str = "js";

    pub fn from_arg(raw: &str) -> Self {
        if raw == Self::FAST_TOKEN {
            RngMode::Fast
        } else {
            RngMode::Crypto
        }
    }

    /// Label echoed in the run summary.
    pub const fn label(self) -> &'static str {
        match self {
            RngMode::Crypto => "crypto",
            RngMode::Fast => Self::FAST_TOKEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    Auto,
    Off,
}

impl ProgressMode {
    pub fn from_arg(raw: &str) -> Self {
        if raw == "off" {
            ProgressMode::Off
        } else {
            ProgressMode::Auto
        }
    }

    /// `auto` only shows progress when the status stream is a terminal.
    pub const fn enabled(self, stream_is_terminal: bool) -> bool {
        matches!(self, ProgressMode::Auto) && stream_is_terminal
    }
}

/// Immutable parameters of one sampling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub bits: BitWidth,
    pub samples: u64,
    pub even_dec: usize,
    pub pct_dec: usize,
    pub rng: RngMode,
    pub progress: ProgressMode,
    pub progress_interval: Duration,
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bits: BitWidth::default(),
            samples: DEFAULT_SAMPLES,
            even_dec: DEFAULT_EVEN_DEC,
            pct_dec: DEFAULT_PCT_DEC,
            rng: RngMode::default(),
            progress: ProgressMode::default(),
            progress_interval: Duration::from_millis(DEFAULT_PROGRESS_INTERVAL_MS),
            seed: None,
        }
    }
}

/// Parses `raw`, or returns `default` when it is absent, empty or malformed.
pub fn parse_or<T>(flag: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr + fmt::Debug,
{
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(flag, value = raw, ?default, "malformed value, using default");
            default
        }
    }
}

/// Like [`parse_or`], but a zero value also falls back to `default`.
pub fn parse_nonzero_or(flag: &str, raw: Option<&str>, default: u64) -> u64 {
    match parse_or(flag, raw, default) {
        0 => {
            tracing::warn!(flag, ?default, "zero is not allowed, using default");
            default
        }
        value => value,
    }
}

/// Like [`parse_or`], but a precision above [`MAX_DECIMALS`] also falls back
/// to `default`.
pub fn parse_decimals_or(flag: &str, raw: Option<&str>, default: usize) -> usize {
    match parse_or(flag, raw, default) {
        value if value > MAX_DECIMALS => {
            tracing::warn!(flag, value, max = MAX_DECIMALS, ?default, "too many decimals, using default");
            default
        }
        value => value,
    }
}

/// A seed is optional; a malformed one is dropped rather than replaced.
pub fn parse_seed(raw: Option<&str>) -> Option<u64> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;

    match raw.trim().parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            tracing::warn!(value = raw, "malformed seed, seeding from the clock");
            None
        }
    }
}
