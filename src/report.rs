//! Sorting and rendering of the run summary and the three histograms.

use crate::config::{RunConfig, MAX_DECIMALS};
use crate::histogram::{CrownKey, Histogram, Tally};
use statrs::distribution::Binomial;
use statrs::statistics::Distribution;
use std::cmp::Ordering;
use std::fmt::{self, Display, Write as _};
use std::hash::Hash;
use std::io;

const SUMMARY_KEY_WIDTH: usize = 24;
const COUNT_WIDTH: usize = 6;

/// Evenness buckets ascend by numeric value, not by text.
#[allow(clippy::ptr_arg)]
pub fn evenness_order(a: &String, b: &String) -> Ordering {
    let parse = |s: &str| s.parse::<f64>().unwrap_or(f64::INFINITY);

    parse(a).total_cmp(&parse(b)).then_with(|| a.cmp(b))
}

pub fn passages_order(a: &u32, b: &u32) -> Ordering {
    a.cmp(b)
}

/// The sentinel sorts last; real crowns ascend by rank, then by count.
pub fn crown_order(a: &CrownKey, b: &CrownKey) -> Ordering {
    match (a, b) {
        (CrownKey::NoSymmetry, CrownKey::NoSymmetry) => Ordering::Equal,
        (CrownKey::NoSymmetry, _) => Ordering::Greater,
        (_, CrownKey::NoSymmetry) => Ordering::Less,
        (CrownKey::Rank { rank: ra, count: ca }, CrownKey::Rank { rank: rb, count: cb }) => {
            ra.cmp(rb).then(ca.cmp(cb))
        }
    }
}

/// `count / total * 100` with `decimals` places and a trailing ` %`.
pub fn percentage(count: u64, total: u64, decimals: usize) -> String {
    let p = if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    };
    let decimals = decimals.min(MAX_DECIMALS);

    format!("{p:.decimals$} %")
}

/// Renders `hist` as one aligned row per bucket, in `order`.
pub fn render_histogram<K>(
    hist: &Histogram<K>,
    order: fn(&K, &K) -> Ordering,
    key_width: usize,
    total: u64,
    pct_dec: usize,
) -> String
where
    K: Eq + Hash + Display,
{
    let mut rows: Vec<(&K, u64)> = hist.iter().collect();
    rows.sort_by(|a, b| order(a.0, b.0));

    let mut out = String::new();

    for (key, count) in rows {
        // NOTE: writing into a String cannot fail
        let _ = writeln!(
            out,
            "  {:>key_width$} : {:>COUNT_WIDTH$} ({})",
            key.to_string(),
            count,
            percentage(count, total, pct_dec)
        );
    }

    out
}

/// Everything printed to stdout after a run.
pub struct Report {
    samples: u64,
    bits: u32,
    rng: &'static str,
    even_dec: usize,
    ones_mean: Option<f64>,
    ones_std_dev: Option<f64>,
    expected_mean: Option<f64>,
    expected_std_dev: Option<f64>,
    evenness: String,
    passages: String,
    crown: String,
}

impl Report {
    pub fn new(config: &RunConfig, tally: &Tally) -> Self {
        let samples = tally.samples();
        let (ones_mean, ones_std_dev) = tally.ones_moments();

        // set bits of a uniform B-bit value follow Binomial(B, 1/2)
        let ideal = Binomial::new(0.5, u64::from(config.bits.bits())).ok();

        Self {
            samples,
            bits: config.bits.bits(),
            rng: config.rng.label(),
            even_dec: config.even_dec,
            ones_mean,
            ones_std_dev,
            expected_mean: ideal.as_ref().and_then(|b| b.mean()),
            expected_std_dev: ideal.as_ref().and_then(|b| b.std_dev()),
            evenness: render_histogram(&tally.evenness, evenness_order, 4, samples, config.pct_dec),
            passages: render_histogram(&tally.passages, passages_order, 2, samples, config.pct_dec),
            crown: render_histogram(&tally.crown, crown_order, 4, samples, config.pct_dec),
        }
    }

    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")?;
        out.flush()
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")
}

fn kv(f: &mut fmt::Formatter<'_>, key: &str, value: impl Display) -> fmt::Result {
    writeln!(f, "{key:<SUMMARY_KEY_WIDTH$}: {value}")
}

fn stat(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "n/a".to_owned())
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "Summary")?;
        kv(f, "Hashes analysed", self.samples)?;
        kv(f, "Bits", self.bits)?;
        kv(f, "RNG", self.rng)?;
        kv(f, "Evenness decimals", self.even_dec)?;
        kv(f, "Mean ones", stat(self.ones_mean))?;
        kv(f, "Ones std dev", stat(self.ones_std_dev))?;
        kv(f, "Expected mean ones", stat(self.expected_mean))?;
        kv(f, "Expected ones std dev", stat(self.expected_std_dev))?;

        section(f, "Evenness distribution:")?;
        f.write_str(&self.evenness)?;

        section(f, "Passages distribution:")?;
        f.write_str(&self.passages)?;

        section(f, "Crown distribution:")?;
        f.write_str(&self.crown)
    }
}
