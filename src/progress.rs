//! Single-line, time-throttled progress display.
//!
//! The reporter never spawns a timer: the driver ticks it once per sample and
//! it decides whether enough wall-clock time has passed to redraw. Output goes
//! through a [`StatusLine`] and time comes from a [`Clock`], so the throttle
//! and the ETA math can be exercised without a terminal.

use crate::config::MAX_DECIMALS;
use std::io::{self, Write};
use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 24;
const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';
const ETA_UNKNOWN: &str = "--:--";

/// A terminal line that can be redrawn in place.
pub trait StatusLine {
    /// Replaces whatever the line currently shows with `text`.
    fn render(&mut self, text: &str) -> io::Result<()>;

    /// Blanks the line and returns the cursor to column 0.
    fn clear(&mut self) -> io::Result<()>;

    /// Moves past the line so later output starts on a fresh one.
    fn newline(&mut self) -> io::Result<()>;
}

/// [`StatusLine`] over an ANSI terminal stream, usually stderr.
pub struct TerminalLine<W: Write> {
    out: W,
}

impl<W: Write> TerminalLine<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> StatusLine for TerminalLine<W> {
    fn render(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "\r\x1b[2K{text}")?;
        self.out.flush()
    }

    fn clear(&mut self) -> io::Result<()> {
        self.out.write_all(b"\r\x1b[2K")?;
        self.out.flush()
    }

    fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Active,
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressOptions {
    pub enabled: bool,
    pub interval: Duration,
    pub pct_dec: usize,
}

pub struct ProgressReporter<S: StatusLine, C: Clock> {
    sink: S,
    clock: C,
    opts: ProgressOptions,
    phase: Phase,
    total: u64,
    started: Option<Instant>,
    last_render: Option<Instant>,
    line_len: usize,
}

impl<S: StatusLine, C: Clock> ProgressReporter<S, C> {
    pub fn new(sink: S, clock: C, opts: ProgressOptions) -> Self {
        Self {
            sink,
            clock,
            opts,
            phase: Phase::Idle,
            total: 0,
            started: None,
            last_render: None,
            line_len: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.opts.enabled
    }

    /// Begins a run of `total` steps, resetting any previous run's state.
    pub fn start(&mut self, total: u64) {
        self.phase = Phase::Active;
        self.total = total;
        self.started = Some(self.clock.now());
        self.last_render = None;
        self.line_len = 0;
    }

    /// Reports `done` completed steps; redraws at most once per interval,
    /// except on completion which always redraws.
    pub fn tick(&mut self, done: u64) -> io::Result<()> {
        if !self.opts.enabled || self.phase != Phase::Active {
            return Ok(());
        }

        let now = self.clock.now();
        let complete = done >= self.total;

        if let Some(last) = self.last_render {
            if now.saturating_duration_since(last) < self.opts.interval && !complete {
                return Ok(());
            }
        }

        let elapsed = self
            .started
            .map(|s| now.saturating_duration_since(s))
            .unwrap_or_default();

        let line = render_line(done, self.total, elapsed, self.opts.pct_dec);

        self.sink.render(&line)?;
        self.line_len = line.chars().count();
        self.last_render = Some(now);

        Ok(())
    }

    /// Clears the status line and, if anything was drawn, ends it with a
    /// single line break. Only the first call after `start` has any effect.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.phase != Phase::Active {
            return Ok(());
        }

        self.phase = Phase::Finalized;

        if !self.opts.enabled {
            return Ok(());
        }

        self.sink.clear()?;

        if self.line_len > 0 {
            self.line_len = 0;
            self.sink.newline()?;
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }
}

/// Builds one status line: bar, percentage, throughput and ETA.
pub fn render_line(done: u64, total: u64, elapsed: Duration, pct_dec: usize) -> String {
    let frac = if total == 0 {
        1.0
    } else {
        (done as f64 / total as f64).clamp(0.0, 1.0)
    };

    let fill = (frac * BAR_WIDTH as f64).round() as usize;
    let bar: String = std::iter::repeat(BAR_FILLED)
        .take(fill)
        .chain(std::iter::repeat(BAR_EMPTY).take(BAR_WIDTH - fill))
        .collect();

    let secs = elapsed.as_secs_f64();
    let rate = if done > 0 && secs > 0.0 { done as f64 / secs } else { 0.0 };

    let eta = if rate > 0.0 {
        fmt_hms(total.saturating_sub(done) as f64 / rate)
    } else {
        ETA_UNKNOWN.to_owned()
    };

    let pct = format!("{:.*} %", pct_dec.min(MAX_DECIMALS), frac * 100.0);

    format!(" [{bar}] {pct:>6}  {:>5} it/s  ETA {eta}", rate.round() as u64)
}

/// `m:ss`, or `h:mm:ss` past the hour; the placeholder for anything not finite.
pub fn fmt_hms(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return ETA_UNKNOWN.to_owned();
    }

    let s = seconds.round() as u64;
    let (h, m, sec) = (s / 3600, (s % 3600) / 60, s % 60);

    if h > 0 {
        format!("{h}:{m:02}:{sec:02}")
    } else {
        format!("{m}:{sec:02}")
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Event, FakeClock, RecordingLine};
    use super::*;

    fn reporter(enabled: bool, interval_ms: u64) -> (ProgressReporter<RecordingLine, FakeClock>, FakeClock) {
        let clock = FakeClock::new();
        let opts = ProgressOptions {
            enabled,
            interval: Duration::from_millis(interval_ms),
            pct_dec: 2,
        };

        (ProgressReporter::new(RecordingLine::default(), clock.clone(), opts), clock)
    }

    #[test]
    fn test_disabled_reporter_never_touches_the_sink() {
        let (mut p, clock) = reporter(false, 200);

        p.start(10);
        for done in 1..=10 {
            clock.advance(Duration::from_secs(1));
            p.tick(done).unwrap();
        }
        p.finish().unwrap();

        assert!(p.sink().events.is_empty(), "disabled progress must stay silent");
    }

    #[test]
    fn test_renders_are_throttled_by_interval() {
        let (mut p, clock) = reporter(true, 200);

        p.start(1000);

        // first tick always renders
        p.tick(1).unwrap();
        assert_eq!(p.sink().renders(), 1);

        for done in 2..=10 {
            clock.advance(Duration::from_millis(50));
            p.tick(done).unwrap();
        }

        // 450ms of 50ms steps: renders at 200ms and 400ms
        assert_eq!(p.sink().renders(), 3);
    }

    #[test]
    fn test_completion_forces_render() {
        let (mut p, clock) = reporter(true, 10_000);

        p.start(3);
        p.tick(1).unwrap();
        clock.advance(Duration::from_millis(1));
        p.tick(2).unwrap();
        clock.advance(Duration::from_millis(1));
        p.tick(3).unwrap();

        assert_eq!(p.sink().renders(), 2, "first and final ticks render");

        match p.sink().events.last() {
            Some(Event::Render(line)) => assert!(line.contains("100.00 %"), "got {line}"),
            other => panic!("expected a final render, got {other:?}"),
        }
    }

    #[test]
    fn test_finish_emits_single_newline_and_is_idempotent() {
        let (mut p, _clock) = reporter(true, 200);

        p.start(2);
        p.tick(2).unwrap();
        p.finish().unwrap();
        p.finish().unwrap();

        assert_eq!(p.sink().newlines(), 1);
        assert_eq!(p.sink().events.last(), Some(&Event::Newline));

        // no ticks after finish
        p.tick(2).unwrap();
        assert_eq!(p.sink().renders(), 1);
    }

    #[test]
    fn test_finish_without_render_skips_newline() {
        let (mut p, _clock) = reporter(true, 200);

        p.start(5);
        p.finish().unwrap();

        assert_eq!(p.sink().events, vec![Event::Clear]);
    }

    #[test]
    fn test_restart_allows_a_second_run() {
        let (mut p, _clock) = reporter(true, 200);

        p.start(1);
        p.tick(1).unwrap();
        p.finish().unwrap();

        p.start(1);
        p.tick(1).unwrap();
        p.finish().unwrap();

        assert_eq!(p.sink().renders(), 2);
        assert_eq!(p.sink().newlines(), 2);
    }

    #[test]
    fn test_eta_is_placeholder_without_throughput() {
        let line = render_line(0, 100, Duration::ZERO, 2);

        assert!(line.ends_with("ETA --:--"), "got {line}");
        assert!(!line.contains("inf") && !line.contains("NaN"));
    }

    #[test]
    fn test_render_line_reports_rate_and_eta() {
        let line = render_line(50, 100, Duration::from_secs(10), 2);

        assert!(line.contains("50.00 %"), "got {line}");
        assert!(line.contains("    5 it/s"), "got {line}");
        assert!(line.ends_with("ETA 0:10"), "got {line}");
        assert_eq!(line.chars().filter(|&c| c == BAR_FILLED).count(), 12);
    }

    #[test]
    fn test_render_line_clamps_huge_precision() {
        let line = render_line(1, 2, Duration::from_secs(1), 70_000);
        let pct = line.split_whitespace().find(|w| w.starts_with("50.")).unwrap();

        assert_eq!(pct.len(), "50.".len() + MAX_DECIMALS, "got {pct}");
    }

    #[test]
    fn test_fmt_hms() {
        assert_eq!(fmt_hms(0.0), "0:00");
        assert_eq!(fmt_hms(65.4), "1:05");
        assert_eq!(fmt_hms(3725.0), "1:02:05");
        assert_eq!(fmt_hms(f64::INFINITY), ETA_UNKNOWN);
        assert_eq!(fmt_hms(f64::NAN), ETA_UNKNOWN);
    }

    #[test]
    fn test_terminal_line_overwrites_in_place() {
        let mut line = TerminalLine::new(Vec::new());

        line.render("abc").unwrap();
        line.clear().unwrap();
        line.newline().unwrap();

        assert_eq!(line.out, b"\r\x1b[2Kabc\r\x1b[2K\n".to_vec());
    }
}
