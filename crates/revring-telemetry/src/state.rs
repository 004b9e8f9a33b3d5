//! The single authoritative telemetry state.
//!
//! Exactly one [`TelemetryState`] exists per running device. It is
//! owned by the scheduler loop, mutated only through [`ingest`] and
//! [`tick`], and read by downstream components through the immutable
//! [`TelemetryView`] snapshot.
//!
//! [`ingest`]: TelemetryState::ingest
//! [`tick`]: TelemetryState::tick

use std::time::{Duration, Instant};

use crate::sample::TelemetrySample;

/// Tunables for smoothing and staleness, read-only after load.
#[derive(Debug, Clone, PartialEq)]
pub struct StateConfig {
    /// Exponential-moving-average coefficient applied to RPM. Higher
    /// values track the wire more tightly; lower values damp jitter.
    pub smoothing_alpha: f32,
    /// How long without an accepted sample before the state reports
    /// idle instead of a frozen last value.
    pub staleness: Duration,
    /// Floor for the learned rev ceiling when the protocol reports
    /// none; also the value the ceiling resets to on idle.
    pub fallback_rpm_max: f32,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.35,
            staleness: Duration::from_millis(2000),
            fallback_rpm_max: 3000.0,
        }
    }
}

/// Read-only snapshot of the device state for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryView {
    /// True when no valid telemetry arrived within the staleness
    /// window. All numeric fields are zeroed/unknown while idle.
    pub idle: bool,
    /// Smoothed engine RPM; 0.0 while idle.
    pub rpm: f32,
    /// Effective rev ceiling: the reported one when present, otherwise
    /// the learned ceiling (never below the configured floor).
    pub rpm_max: f32,
    /// Game-supplied optimal shift point, when the last sample had one.
    pub optimal_shift_rpm: Option<f32>,
    /// Current gear; unknown while idle.
    pub gear: Option<i8>,
    /// Vehicle speed in m/s, when known.
    pub speed_ms: Option<f32>,
}

/// Last accepted sample plus derived, smoothed values and a staleness
/// clock. The caller supplies `now` so tests can drive time directly.
#[derive(Debug)]
pub struct TelemetryState {
    config: StateConfig,
    last: Option<TelemetrySample>,
    smoothed_rpm: f32,
    learned_rpm_max: f32,
    last_update: Option<Instant>,
    idle: bool,
}

impl TelemetryState {
    /// Create a state with the given tunables. The state starts idle.
    pub fn new(config: StateConfig) -> Self {
        let learned_rpm_max = config.fallback_rpm_max;
        Self {
            config,
            last: None,
            smoothed_rpm: 0.0,
            learned_rpm_max,
            last_update: None,
            idle: true,
        }
    }

    /// Create a state with default tunables.
    pub fn with_defaults() -> Self {
        Self::new(StateConfig::default())
    }

    /// Commit a decoded sample.
    ///
    /// Applies the ordering invariant first: a sample whose sequence or
    /// timestamp is not newer than the held one (within the same source
    /// protocol) is discarded, so out-of-order UDP delivery can never
    /// regress the visible state. Returns whether the sample was
    /// accepted.
    pub fn ingest(&mut self, sample: TelemetrySample, now: Instant) -> bool {
        if self.is_regression(&sample) {
            return false;
        }

        let rpm = sample.rpm.max(0.0);
        // Seed the average from the first live sample so a fresh state
        // reports the exact wire value.
        self.smoothed_rpm = if self.idle || self.last.is_none() {
            rpm
        } else {
            let alpha = self.config.smoothing_alpha.clamp(0.0, 1.0);
            alpha * rpm + (1.0 - alpha) * self.smoothed_rpm
        };

        self.learned_rpm_max = self.learned_rpm_max.max(rpm);
        self.idle = false;
        self.last = Some(sample);
        self.last_update = Some(now);
        true
    }

    /// Evaluate staleness. Called once per scheduler iteration whether
    /// or not a sample arrived.
    pub fn tick(&mut self, now: Instant) {
        if self.idle {
            return;
        }
        let Some(last_update) = self.last_update else {
            return;
        };
        let elapsed = now.checked_duration_since(last_update).unwrap_or(Duration::ZERO);
        if elapsed > self.config.staleness {
            self.enter_idle();
        }
    }

    /// Snapshot the current state for intent computation.
    pub fn view(&self) -> TelemetryView {
        if self.idle {
            return TelemetryView {
                idle: true,
                rpm: 0.0,
                rpm_max: self.learned_rpm_max,
                optimal_shift_rpm: None,
                gear: None,
                speed_ms: None,
            };
        }

        let reported_max = self.last.as_ref().map(|s| s.rpm_max).unwrap_or(0.0);
        TelemetryView {
            idle: false,
            rpm: self.smoothed_rpm,
            rpm_max: if reported_max > 0.0 {
                reported_max
            } else {
                self.learned_rpm_max
            },
            optimal_shift_rpm: self.last.as_ref().and_then(|s| s.optimal_shift_rpm),
            gear: self.last.as_ref().and_then(|s| s.gear),
            speed_ms: self.last.as_ref().and_then(|s| s.speed_ms),
        }
    }

    /// Whether the state is currently idle.
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    fn is_regression(&self, sample: &TelemetrySample) -> bool {
        let Some(last) = &self.last else {
            return false;
        };
        // Ordering values are only comparable within one protocol; a
        // protocol switch always wins.
        if last.source != sample.source {
            return false;
        }
        match (last.sequence, sample.sequence) {
            (Some(held), Some(new)) => new <= held,
            _ => false,
        }
    }

    fn enter_idle(&mut self) {
        self.idle = true;
        self.smoothed_rpm = 0.0;
        self.learned_rpm_max = self.config.fallback_rpm_max;
        // A restarted session restarts its counters; keeping the old
        // ordering value would reject every packet of the new session.
        if let Some(last) = &mut self.last {
            last.sequence = None;
        }
    }
}
