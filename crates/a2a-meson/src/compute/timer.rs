//! Named performance phases: wall time plus the work attributed to it.

use std::time::{Duration, Instant};

use tracing::info;

/// Kernel invocations.
pub const CONTRACTION: &str = "contraction";
/// Copies from the cache-block workspace into the outer block.
pub const CACHE_COPY: &str = "cache copy";
/// Sink calls.
pub const IO: &str = "I/O";
/// Phase-field generation in the channels.
pub const MOMENTUM_PHASES: &str = "momentum phases";

/// Accumulated totals of one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseStats {
    pub elapsed: Duration,
    pub flops: f64,
    pub bytes: f64,
    pub calls: usize,
}

impl PhaseStats {
    /// Achieved Gflop/s, zero before any time has been measured.
    pub fn gflops(&self) -> f64 {
        rate(self.flops, self.elapsed) / 1e9
    }

    /// Achieved GB/s, zero before any time has been measured.
    pub fn gbytes_per_sec(&self) -> f64 {
        rate(self.bytes, self.elapsed) / 1e9
    }
}

fn rate(amount: f64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { amount / secs } else { 0.0 }
}

/// Per-phase counters, kept in first-use order.
#[derive(Debug, Clone, Default)]
pub struct PerfCounters {
    phases: Vec<(&'static str, PhaseStats)>,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, phase: &'static str) -> &mut PhaseStats {
        let pos = match self.phases.iter().position(|(name, _)| *name == phase) {
            Some(pos) => pos,
            None => {
                self.phases.push((phase, PhaseStats::default()));
                self.phases.len() - 1
            }
        };
        &mut self.phases[pos].1
    }

    /// Run `f`, charging its wall time to `phase`.
    pub fn time<R>(&mut self, phase: &'static str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let out = f();
        let stats = self.entry(phase);
        stats.elapsed += start.elapsed();
        stats.calls += 1;
        out
    }

    /// Attribute estimated work to `phase`.
    pub fn add_work(&mut self, phase: &'static str, flops: f64, bytes: f64) {
        let stats = self.entry(phase);
        stats.flops += flops;
        stats.bytes += bytes;
    }

    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &PerfCounters) {
        for (name, stats) in &other.phases {
            let entry = self.entry(*name);
            entry.elapsed += stats.elapsed;
            entry.flops += stats.flops;
            entry.bytes += stats.bytes;
            entry.calls += stats.calls;
        }
    }

    pub fn phase(&self, phase: &str) -> Option<&PhaseStats> {
        self.phases
            .iter()
            .find(|(name, _)| *name == phase)
            .map(|(_, stats)| stats)
    }

    pub fn phases(&self) -> impl Iterator<Item = (&'static str, &PhaseStats)> + '_ {
        self.phases.iter().map(|(name, stats)| (*name, stats))
    }

    pub fn reset(&mut self) {
        self.phases.clear();
    }

    /// One `info` line per phase.
    pub fn log_summary(&self) {
        for (name, stats) in &self.phases {
            info!(
                phase = *name,
                elapsed_ms = stats.elapsed.as_secs_f64() * 1e3,
                calls = stats.calls,
                gflops = stats.gflops(),
                gbytes_per_sec = stats.gbytes_per_sec(),
                "performance"
            );
        }
    }
}
