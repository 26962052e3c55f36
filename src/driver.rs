//! The sampling loop.

use crate::config::RunConfig;
use crate::error::Result;
use crate::features::FeatureAnalyzer;
use crate::histogram::{evenness_bucket, CrownKey, Tally};
use crate::progress::{Clock, ProgressReporter, StatusLine};
use crate::source::BitSource;

/// Draws `config.samples` values and tallies their features.
///
/// The progress line is finalized before returning, on success and on error
/// alike, so whatever the caller prints next starts on a clean line.
pub fn run<B, A, S, C>(
    config: &RunConfig,
    source: &mut B,
    analyzer: &A,
    progress: &mut ProgressReporter<S, C>,
) -> Result<Tally>
where
    B: BitSource,
    A: FeatureAnalyzer,
    S: StatusLine,
    C: Clock,
{
    tracing::debug!(
        samples = config.samples,
        bits = config.bits.bits(),
        rng = config.rng.label(),
        progress = progress.is_enabled(),
        "sampling started"
    );

    progress.start(config.samples);

    let result = sample_all(config, source, analyzer, progress);

    match result {
        Ok(tally) => {
            progress.finish()?;
            tracing::debug!(samples = tally.samples(), "sampling finished");

            Ok(tally)
        }

        Err(err) => {
            // NOTE: the sampling error is the one worth reporting
            if let Err(io) = progress.finish() {
                tracing::warn!(error = %io, "could not finalize progress line");
            }

            Err(err)
        }
    }
}

fn sample_all<B, A, S, C>(
    config: &RunConfig,
    source: &mut B,
    analyzer: &A,
    progress: &mut ProgressReporter<S, C>,
) -> Result<Tally>
where
    B: BitSource,
    A: FeatureAnalyzer,
    S: StatusLine,
    C: Clock,
{
    let bits = config.bits;
    let mut tally = Tally::default();

    for i in 0..config.samples {
        let sample = source.next_sample()?;

        let ones = analyzer.ones(&sample);
        tally.record_ones(ones);
        tally.evenness.increment(evenness_bucket(ones, bits, config.even_dec));

        tally.passages.increment(analyzer.passages(&sample, bits));

        let ranks = analyzer.symmetry_ranks(&sample, bits);
        tally.crown.increment(CrownKey::from_ranks(&ranks));

        progress.tick(i + 1)?;
    }

    Ok(tally)
}
